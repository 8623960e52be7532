use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the length of the list stored at key. If key does not exist, it is interpreted as an
/// empty list and 0 is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/llen/>
#[derive(Debug, PartialEq)]
pub struct Llen {
    pub key: String,
}

impl Executable for Llen {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Integer(0));
        };

        match value.as_list() {
            Ok(list) => Ok(Frame::Integer(list.lock().len() as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Llen {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}
