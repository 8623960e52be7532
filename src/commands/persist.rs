use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Remove the existing timeout on `key`. Replies 1 if a timeout was removed, 0 otherwise.
///
/// Ref: <https://redis.io/docs/latest/commands/persist>
#[derive(Debug, PartialEq)]
pub struct Persist {
    pub key: String,
}

impl Executable for Persist {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        Ok(Frame::from(session.db().persist(&self.key)))
    }
}

impl TryFrom<&mut CommandParser> for Persist {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn removes_timeout() {
        let mut session = session();
        run(&mut session, &["SET", "k", "v", "PX", "100000"]);

        assert_eq!(run(&mut session, &["PERSIST", "k"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["TTL", "k"]), Frame::Integer(-1));
        assert_eq!(run(&mut session, &["PERSIST", "k"]), Frame::Integer(0));
        assert_eq!(run(&mut session, &["PERSIST", "missing"]), Frame::Integer(0));
    }
}
