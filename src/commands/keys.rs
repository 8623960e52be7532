use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns all keys matching a glob-style `pattern`.
///
/// Ref: <https://redis.io/docs/latest/commands/keys>
#[derive(Debug, PartialEq)]
pub struct Keys {
    pub pattern: String,
}

impl Executable for Keys {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let keys = session.db().keys(&self.pattern);
        Ok(Frame::from(keys))
    }
}

impl TryFrom<&mut CommandParser> for Keys {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let pattern = parser.next_string()?;
        Ok(Self { pattern })
    }
}
