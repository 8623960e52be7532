use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Increments the number stored at key by increment.
///
/// Ref: <https://redis.io/docs/latest/commands/incrby/>
#[derive(Debug, PartialEq)]
pub struct IncrBy {
    pub key: String,
    pub increment: i64,
}

impl Executable for IncrBy {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match session.db().incr_by(&self.key, self.increment) {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for IncrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let increment = parser.next_integer()?;

        Ok(Self { key, increment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{request, run, session};
    use crate::commands::Command;

    #[test]
    fn parse() {
        let cmd = Command::try_from(request(&["INCRBY", "key1", "-5"])).unwrap();

        assert_eq!(
            cmd,
            Command::IncrBy(IncrBy {
                key: "key1".to_string(),
                increment: -5,
            })
        );
    }

    #[test]
    fn increments() {
        let mut session = session();
        run(&mut session, &["SET", "key1", "10"]);

        assert_eq!(run(&mut session, &["INCRBY", "key1", "5"]), Frame::Integer(15));
        assert_eq!(
            run(&mut session, &["INCRBY", "key1", "five"]),
            Frame::Error("ERR value is not an integer or out of range".to_string())
        );
    }
}
