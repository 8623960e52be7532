use std::str::FromStr;
use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::{parse_float, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::DbError;
use crate::value::Value;
use crate::Error;

#[derive(Debug, PartialEq, strum_macros::EnumString)]
#[strum(ascii_case_insensitive)]
enum ZaddOption {
    Nx,
    Xx,
    Ch,
}

/// Adds all the specified members with the specified scores to the sorted set stored at key.
/// If a specified member is already a member of the sorted set, the score is updated and the
/// element reinserted at the right position to ensure the correct ordering.
///
/// * `NX`: only add new elements, never update existing ones.
/// * `XX`: only update existing elements, never add new ones.
/// * `CH`: reply with the number of changed elements instead of added ones.
///
/// Ref: <https://redis.io/docs/latest/commands/zadd/>
#[derive(Debug, PartialEq)]
pub struct Zadd {
    pub key: String,
    pub only_new: bool,
    pub only_existing: bool,
    pub changed: bool,
    pub members: Vec<(f64, String)>,
}

impl Executable for Zadd {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Zadd {
            key,
            only_new,
            only_existing,
            changed,
            members,
        } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            if slot.is_none() && only_existing {
                return Ok(0);
            }
            let value = slot.get_or_insert_with(|| Arc::new(Value::sorted_set()));
            let (count, now_empty) = {
                let mut zset = value.as_sorted_set()?.lock();
                let mut added = 0;
                let mut updated = 0;

                for (score, member) in members {
                    match zset.score(&member) {
                        Some(_) if only_new => {}
                        None if only_existing => {}
                        Some(current) => {
                            if current != score {
                                zset.insert(&member, score);
                                updated += 1;
                            }
                        }
                        None => {
                            zset.insert(&member, score);
                            added += 1;
                        }
                    }
                }

                let count = if changed { added + updated } else { added };
                (count, zset.is_empty())
            };

            if now_empty {
                *slot = None;
            }
            Ok(count)
        });

        match res {
            Ok(count) => Ok(Frame::Integer(count as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Zadd {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let args = parser.rest_strings()?;

        let mut only_new = false;
        let mut only_existing = false;
        let mut changed = false;

        let mut args = args.into_iter().peekable();
        while let Some(option) = args.peek().and_then(|arg| ZaddOption::from_str(arg).ok()) {
            match option {
                ZaddOption::Nx => only_new = true,
                ZaddOption::Xx => only_existing = true,
                ZaddOption::Ch => changed = true,
            }
            args.next();
        }

        if only_new && only_existing {
            return Err(CommandParserError::IncompatibleOptions(
                "XX and NX options at the same time are not compatible",
            )
            .into());
        }

        let rest: Vec<String> = args.collect();
        if rest.is_empty() || rest.len() % 2 != 0 {
            return Err(CommandParserError::Syntax.into());
        }

        let members = rest
            .chunks(2)
            .map(|pair| {
                parse_float(&pair[0])
                    .map(|score| (score, pair[1].clone()))
                    .ok_or(CommandParserError::NotFloat)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key,
            only_new,
            only_existing,
            changed,
            members,
        })
    }
}
