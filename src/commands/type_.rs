use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the string representation of the type of the value stored at `key`.
///
/// The different types that can be returned are: `string`, `list`, `set`, `zset` and `hash`.
/// If the key does not exist, `none` is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/type/>
#[derive(Debug, PartialEq)]
pub struct Type {
    pub key: String,
}

impl Executable for Type {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let type_ = session
            .db()
            .get(&self.key)
            .map(|value| value.value_type().to_string())
            .unwrap_or_else(|| "none".to_string());

        Ok(Frame::Simple(type_))
    }
}

impl TryFrom<&mut CommandParser> for Type {
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
    use crate::commands::Command;

    #[test]
    fn existing_key() {
        let mut session = session();
        run(&mut session, &["SET", "key1", "value"]);

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("TYPE")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Type(Type {
                key: String::from("key1")
            })
        );

        let result = cmd.exec(&mut session).unwrap();

        assert_eq!(result, Frame::Simple("string".to_string()));
    }

    #[test]
    fn every_type() {
        let mut session = session();
        run(&mut session, &["RPUSH", "l", "a"]);
        run(&mut session, &["HSET", "h", "f", "v"]);
        run(&mut session, &["SADD", "s", "m"]);
        run(&mut session, &["ZADD", "z", "1", "m"]);

        for (key, expected) in [("l", "list"), ("h", "hash"), ("s", "set"), ("z", "zset")] {
            assert_eq!(
                run(&mut session, &["TYPE", key]),
                Frame::Simple(expected.to_string())
            );
        }
    }

    #[test]
    fn missing_key() {
        let res = run(&mut session(), &["TYPE", "key1"]);

        assert_eq!(res, Frame::Simple("none".to_string()));
    }
}
