use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the sorted set cardinality (number of elements) of the sorted set stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/zcard/>
#[derive(Debug, PartialEq)]
pub struct Zcard {
    pub key: String,
}

impl Executable for Zcard {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Integer(0));
        };

        match value.as_sorted_set() {
            Ok(zset) => Ok(Frame::Integer(zset.lock().len() as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Zcard {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}
