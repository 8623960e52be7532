use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// What `HGETALL`, `HKEYS` and `HVALS` reply with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashPart {
    Both,
    Keys,
    Values,
}

/// Returns all fields and values (`HGETALL`), all field names (`HKEYS`) or all values (`HVALS`)
/// of the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hgetall/>
/// Ref: <https://redis.io/docs/latest/commands/hkeys/>
/// Ref: <https://redis.io/docs/latest/commands/hvals/>
#[derive(Debug, PartialEq)]
pub struct HFields {
    pub key: String,
    pub part: HashPart,
}

impl Executable for HFields {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Array(vec![]));
        };
        let hash = match value.as_hash() {
            Ok(hash) => hash,
            Err(err) => return Ok(err.into()),
        };

        let entries = hash.snapshot();
        let frame = match self.part {
            HashPart::Both => Frame::from_pairs(entries),
            HashPart::Keys => Frame::from(
                entries
                    .into_iter()
                    .map(|(field, _)| field)
                    .collect::<Vec<_>>(),
            ),
            HashPart::Values => Frame::from(
                entries
                    .into_iter()
                    .map(|(_, value)| value)
                    .collect::<Vec<_>>(),
            ),
        };

        Ok(frame)
    }
}

impl HFields {
    pub(crate) fn parse(parser: &mut CommandParser, part: HashPart) -> Result<Self, Error> {
        let key = parser.next_string()?;

        Ok(Self { key, part })
    }
}
