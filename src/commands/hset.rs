use bytes::Bytes;
use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::DbError;
use crate::value::Value;
use crate::Error;

/// Sets the specified fields to their respective values in the hash stored at key. Values of
/// fields that already exist are overwritten. If key doesn't exist, a new key holding a hash is
/// created.
///
/// Replies with the number of fields that were added.
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct Hset {
    pub key: String,
    pub pairs: Vec<(String, Bytes)>,
}

impl Executable for Hset {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Hset { key, pairs } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let value = slot.get_or_insert_with(|| Arc::new(Value::hash()));
            let hash = value.as_hash()?;
            Ok(pairs
                .into_iter()
                .map(|(field, value)| hash.put(field, value))
                .filter(Option::is_none)
                .count())
        });

        match res {
            Ok(added) => Ok(Frame::Integer(added as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Hset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        if parser.remaining() % 2 != 0 {
            return Err(CommandParserError::WrongArity {
                command: "hset".to_string(),
            }
            .into());
        }

        let mut pairs = Vec::with_capacity(parser.remaining() / 2);
        while parser.has_next() {
            pairs.push((parser.next_string()?, parser.next_bytes()?));
        }

        Ok(Self { key, pairs })
    }
}
