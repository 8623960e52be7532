use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns if field is an existing field in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hexists/>
#[derive(Debug, PartialEq)]
pub struct Hexists {
    pub key: String,
    pub field: String,
}

impl Executable for Hexists {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Integer(0));
        };

        match value.as_hash() {
            Ok(hash) => Ok(Frame::from(hash.contains_key(&self.field))),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Hexists {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;

        Ok(Self { key, field })
    }
}
