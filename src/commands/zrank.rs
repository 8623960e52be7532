use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the rank of member in the sorted set stored at key, with the scores ordered from low
/// to high (`ZRANK`) or from high to low (`ZREVRANK`). The rank is 0-based.
///
/// Ref: <https://redis.io/docs/latest/commands/zrank/>
/// Ref: <https://redis.io/docs/latest/commands/zrevrank/>
#[derive(Debug, PartialEq)]
pub struct Zrank {
    pub key: String,
    pub member: String,
    pub reverse: bool,
}

impl Executable for Zrank {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Null);
        };

        match value.as_sorted_set() {
            Ok(zset) => Ok(Frame::from(zset.lock().rank(&self.member, self.reverse))),
            Err(err) => Ok(err.into()),
        }
    }
}

impl Zrank {
    pub(crate) fn parse(parser: &mut CommandParser, reverse: bool) -> Result<Self, Error> {
        let key = parser.next_string()?;
        let member = parser.next_string()?;

        Ok(Self {
            key,
            member,
            reverse,
        })
    }
}
