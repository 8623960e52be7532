use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Get the value of key and delete the key. This command is similar to GET, except for the fact
/// that it also deletes the key on success (if and only if the key's value type is a string).
///
/// Ref: <https://redis.io/docs/latest/commands/getdel/>
#[derive(Debug, PartialEq)]
pub struct Getdel {
    pub key: String,
}

impl Executable for Getdel {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let res = session.db().compute(&self.key, |slot| -> Result<Frame, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(Frame::Null);
            };
            let bytes = value.as_string()?.clone();
            *slot = None;
            Ok(Frame::Bulk(bytes))
        });

        Ok(res.unwrap_or_else(Frame::from))
    }
}

impl TryFrom<&mut CommandParser> for Getdel {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn returns_and_deletes() {
        let mut session = session();
        run(&mut session, &["SET", "k", "v"]);

        assert_eq!(run(&mut session, &["GETDEL", "k"]), Frame::Bulk(Bytes::from("v")));
        assert_eq!(run(&mut session, &["EXISTS", "k"]), Frame::Integer(0));
        assert_eq!(run(&mut session, &["GETDEL", "k"]), Frame::Null);
    }

    #[test]
    fn wrong_type_is_kept() {
        let mut session = session();
        run(&mut session, &["SADD", "k", "m"]);

        assert_eq!(
            run(&mut session, &["GETDEL", "k"]),
            Frame::Error(DbError::WrongType.to_string())
        );
        assert_eq!(run(&mut session, &["EXISTS", "k"]), Frame::Integer(1));
    }
}
