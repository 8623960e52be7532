use crate::commands::executable::{Executable, Session};
use crate::commands::zrangebyscore::parse_range;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::structures::skiplist::RangeSpec;
use crate::Error;

/// Returns the number of elements in the sorted set at key with a score between min and max.
///
/// Ref: <https://redis.io/docs/latest/commands/zcount/>
#[derive(Debug, PartialEq)]
pub struct Zcount {
    pub key: String,
    pub range: RangeSpec,
}

impl Executable for Zcount {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Integer(0));
        };

        match value.as_sorted_set() {
            Ok(zset) => Ok(Frame::Integer(zset.lock().count(&self.range) as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Zcount {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let range = parse_range(&parser.next_string()?, &parser.next_string()?)?;

        Ok(Self { key, range })
    }
}
