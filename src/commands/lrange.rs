use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::value::normalize_range;
use crate::Error;

/// Returns the specified elements of the list stored at key. The offsets start and stop are
/// zero-based indexes; negative offsets count from the end of the list. Out of range indexes
/// do not produce an error.
///
/// Ref: <https://redis.io/docs/latest/commands/lrange/>
#[derive(Debug, PartialEq)]
pub struct Lrange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for Lrange {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Array(vec![]));
        };
        let list = match value.as_list() {
            Ok(list) => list.lock(),
            Err(err) => return Ok(err.into()),
        };

        let Some((start, stop)) = normalize_range(self.start, self.stop, list.len()) else {
            return Ok(Frame::Array(vec![]));
        };

        let elements = list
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .map(|value| Frame::Bulk(value.clone()))
            .collect();

        Ok(Frame::Array(elements))
    }
}

impl TryFrom<&mut CommandParser> for Lrange {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        Ok(Self { key, start, stop })
    }
}
