use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlUnit {
    Seconds,
    Milliseconds,
}

/// Returns the remaining time to live of a key that has a timeout: `-2` if the key does not
/// exist, `-1` if it exists but has no associated expire.
///
/// Covers `TTL` (seconds, rounded) and `PTTL` (milliseconds).
///
/// Ref: <https://redis.io/docs/latest/commands/ttl>
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: String,
    pub unit: TtlUnit,
}

impl Ttl {
    pub(crate) fn parse(parser: &mut CommandParser, unit: TtlUnit) -> Result<Self, Error> {
        let key = parser.next_string()?;
        Ok(Self { key, unit })
    }
}

impl Executable for Ttl {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let res = match session.db().ttl(&self.key) {
            store::Ttl::Missing => -2,
            store::Ttl::Persistent => -1,
            store::Ttl::ExpiresIn(ms) => match self.unit {
                TtlUnit::Seconds => ((ms + 500) / 1000) as i64,
                TtlUnit::Milliseconds => ms as i64,
            },
        };

        Ok(Frame::Integer(res))
    }
}
