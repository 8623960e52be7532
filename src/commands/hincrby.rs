use bytes::Bytes;
use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::{parse, DbError};
use crate::value::Value;
use crate::Error;

/// Increments the number stored at field in the hash stored at key by increment. A missing key
/// or field starts from 0.
///
/// Ref: <https://redis.io/docs/latest/commands/hincrby/>
#[derive(Debug, PartialEq)]
pub struct HIncrBy {
    pub key: String,
    pub field: String,
    pub increment: i64,
}

impl Executable for HIncrBy {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let HIncrBy {
            key,
            field,
            increment,
        } = self;

        let res = session.db().compute(&key, |slot| -> Result<i64, DbError> {
            // A hash created for a failed increment is dropped again.
            let created = slot.is_none();
            let value = slot.get_or_insert_with(|| Arc::new(Value::hash()));
            let hash = value.as_hash()?;

            let res = hash.compute(field.as_str(), |current| -> Result<i64, DbError> {
                let number = match current.as_ref() {
                    Some(bytes) => parse::<i64>(bytes).ok_or(DbError::HashNotInteger)?,
                    None => 0,
                };
                let next = number.checked_add(increment).ok_or(DbError::Overflow)?;
                *current = Some(Bytes::from(next.to_string()));
                Ok(next)
            });

            if res.is_err() && created {
                *slot = None;
            }
            res
        });

        match res {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for HIncrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;
        let increment = parser.next_integer()?;

        Ok(Self {
            key,
            field,
            increment,
        })
    }
}
