use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

#[derive(Debug, PartialEq)]
pub enum Object {
    Encoding(Encoding),
}

/// Encoding returns the internal encoding for the Redis object stored at `<key>`.
///
/// Ref: <https://redis.io/docs/latest/commands/object-encoding>
#[derive(Debug, PartialEq)]
pub struct Encoding {
    pub key: String,
}

impl Executable for Object {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match self {
            Self::Encoding(encoding) => encoding.exec(session),
        }
    }
}

impl TryFrom<&mut CommandParser> for Object {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let sub_command = parser.next_keyword()?;

        match sub_command.as_str() {
            "encoding" => {
                let key = parser.next_string()?;
                parser.finish()?;
                Ok(Self::Encoding(Encoding { key }))
            }
            _ => Err(CommandParserError::UnknownSubcommand {
                command: "OBJECT".to_string(),
                subcommand: sub_command,
            }
            .into()),
        }
    }
}

impl Executable for Encoding {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let res = session
            .db()
            .get(&self.key)
            .map(|value| Frame::Bulk(value.encoding().into()));

        Ok(res.unwrap_or(Frame::Null))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::testing::{request, run, session};
    use crate::commands::Command;

    #[test]
    fn parse() {
        let cmd = Command::try_from(request(&["OBJECT", "ENCODING", "k"])).unwrap();

        assert_eq!(
            cmd,
            Command::Object(Object::Encoding(Encoding {
                key: "k".to_string()
            }))
        );
    }

    #[test]
    fn encodings_by_type() {
        let mut session = session();
        run(&mut session, &["SET", "n", "123"]);
        run(&mut session, &["SET", "s", "hello"]);
        run(&mut session, &["RPUSH", "l", "a"]);
        run(&mut session, &["ZADD", "z", "1", "a"]);

        assert_eq!(run(&mut session, &["OBJECT", "ENCODING", "n"]), Frame::Bulk(Bytes::from("int")));
        assert_eq!(
            run(&mut session, &["OBJECT", "ENCODING", "s"]),
            Frame::Bulk(Bytes::from("embstr"))
        );
        assert_eq!(
            run(&mut session, &["OBJECT", "ENCODING", "l"]),
            Frame::Bulk(Bytes::from("linkedlist"))
        );
        assert_eq!(
            run(&mut session, &["OBJECT", "ENCODING", "z"]),
            Frame::Bulk(Bytes::from("skiplist"))
        );
        assert_eq!(run(&mut session, &["OBJECT", "ENCODING", "missing"]), Frame::Null);
    }
}
