use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Removes and returns one or more random members from the set value store at key. A set left
/// without members is deleted.
///
/// Ref: <https://redis.io/docs/latest/commands/spop/>
#[derive(Debug, PartialEq)]
pub struct Spop {
    pub key: String,
    pub count: Option<usize>,
}

impl Executable for Spop {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Spop { key, count } = self;

        let res = session.db().compute(&key, |slot| -> Result<Vec<String>, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(vec![]);
            };
            let set = value.as_set()?;

            let mut popped = vec![];
            while popped.len() < count.unwrap_or(1) {
                let Some(member) = set.random_key() else {
                    break;
                };
                if set.remove(&member).is_some() {
                    popped.push(member);
                }
            }

            if set.is_empty() {
                *slot = None;
            }
            Ok(popped)
        });

        match (res, count) {
            (Ok(popped), Some(_)) => Ok(Frame::from(popped)),
            (Ok(popped), None) => Ok(Frame::from(popped.into_iter().next())),
            (Err(err), _) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Spop {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let count = if parser.has_next() {
            let count = parser.next_integer()?;
            Some(usize::try_from(count).map_err(|_| CommandParserError::NotPositive)?)
        } else {
            None
        };
        parser.finish()?;

        Ok(Self { key, count })
    }
}
