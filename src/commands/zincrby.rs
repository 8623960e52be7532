use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::value::Value;
use crate::Error;

/// Increments the score of member in the sorted set stored at key by increment. A missing member
/// is added with increment as its score, a missing key is created.
///
/// Ref: <https://redis.io/docs/latest/commands/zincrby/>
#[derive(Debug, PartialEq)]
pub struct ZIncrBy {
    pub key: String,
    pub increment: f64,
    pub member: String,
}

impl Executable for ZIncrBy {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let ZIncrBy {
            key,
            increment,
            member,
        } = self;

        let res = session.db().compute(&key, |slot| -> Result<f64, DbError> {
            let created = slot.is_none();
            let value = slot.get_or_insert_with(|| Arc::new(Value::sorted_set()));
            let score = value.as_sorted_set()?.lock().incr(&member, increment);

            match score {
                Some(score) => Ok(score),
                None => {
                    if created {
                        *slot = None;
                    }
                    Err(DbError::ScoreNaN)
                }
            }
        });

        match res {
            Ok(score) => Ok(Frame::from(score)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for ZIncrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let increment = parser.next_float()?;
        let member = parser.next_string()?;

        Ok(Self {
            key,
            increment,
            member,
        })
    }
}
