use bytes::{Bytes, BytesMut};
use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::value::{Data, Value};
use crate::Error;

/// If key already exists and is a string, this command appends the value at the end of the string.
/// If key does not exist it is created and set as an empty string, so APPEND will be similar to
/// SET in this special case.
///
/// Ref: <https://redis.io/docs/latest/commands/append>
#[derive(Debug, PartialEq)]
pub struct Append {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Append {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let res = session.db().compute(&self.key, |slot| -> Result<usize, DbError> {
            let (new_value, expires_at) = match slot.as_ref() {
                Some(current) => {
                    let bytes = current.as_string()?;
                    let mut new_value = BytesMut::with_capacity(bytes.len() + self.value.len());
                    new_value.extend_from_slice(bytes);
                    new_value.extend_from_slice(&self.value);
                    (new_value.freeze(), current.expires_at())
                }
                None => (self.value, None),
            };

            let len = new_value.len();
            *slot = Some(Arc::new(Value::with_expiry(
                Data::String(new_value),
                expires_at,
            )));
            Ok(len)
        });

        match res {
            Ok(len) => Ok(Frame::Integer(len as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Append {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};
    use crate::commands::Command;

    #[test]
    fn existing_key() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("APPEND")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from(" World")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Append(Append {
                key: String::from("key1"),
                value: Bytes::from(" World"),
            })
        );

        let mut session = session();
        run(&mut session, &["SET", "key1", "Hello"]);

        let res = cmd.exec(&mut session).unwrap();

        assert_eq!(res, Frame::Integer(11));
        assert_eq!(
            run(&mut session, &["GET", "key1"]),
            Frame::Bulk(Bytes::from("Hello World"))
        );
    }

    #[test]
    fn missing_key() {
        let mut session = session();

        assert_eq!(run(&mut session, &["APPEND", "key1", "abc"]), Frame::Integer(3));
        assert_eq!(run(&mut session, &["GET", "key1"]), Frame::Bulk(Bytes::from("abc")));
    }

    #[test]
    fn wrong_type() {
        let mut session = session();
        run(&mut session, &["HSET", "key1", "f", "v"]);

        assert_eq!(
            run(&mut session, &["APPEND", "key1", "abc"]),
            Frame::Error(DbError::WrongType.to_string())
        );
    }
}
