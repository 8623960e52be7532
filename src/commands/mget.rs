use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the values of all specified keys. For every key that does not hold a string value or
/// does not exist, the special value nil is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/mget/>
#[derive(Debug, PartialEq)]
pub struct Mget {
    pub keys: Vec<String>,
}

impl Executable for Mget {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let values = self
            .keys
            .iter()
            .map(|key| {
                db.get(key)
                    .and_then(|value| value.as_string().ok().cloned())
                    .map_or(Frame::Null, Frame::Bulk)
            })
            .collect();

        Ok(Frame::Array(values))
    }
}

impl TryFrom<&mut CommandParser> for Mget {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.rest_strings()?;
        Ok(Self { keys })
    }
}
