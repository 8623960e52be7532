use bytes::Bytes;
use itertools::Itertools;

use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::value::Value;
use crate::Error;

/// Sets the given keys to their respective values. Replaces existing values with new values.
///
/// Ref: <https://redis.io/docs/latest/commands/mset/>
#[derive(Debug, PartialEq)]
pub struct Mset {
    pub pairs: Vec<(String, Bytes)>,
}

impl Executable for Mset {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        for (key, value) in self.pairs {
            db.set(key, Value::string(value));
        }

        Ok(Frame::ok())
    }
}

impl TryFrom<&mut CommandParser> for Mset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() % 2 != 0 {
            return Err(CommandParserError::WrongArity {
                command: "mset".to_string(),
            }
            .into());
        }

        let mut args = vec![];
        while parser.has_next() {
            args.push(parser.next_bytes()?);
        }

        let pairs = args
            .into_iter()
            .tuples()
            .map(|(key, value)| {
                std::str::from_utf8(&key)
                    .map(|key| (key.to_string(), value))
                    .map_err(CommandParserError::InvalidUTF8String)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { pairs })
    }
}
