use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the number of fields contained in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hlen/>
#[derive(Debug, PartialEq)]
pub struct Hlen {
    pub key: String,
}

impl Executable for Hlen {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Integer(0));
        };

        match value.as_hash() {
            Ok(hash) => Ok(Frame::Integer(hash.len() as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Hlen {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn counts_fields() {
        let mut session = session();
        run(&mut session, &["HSET", "h", "a", "1", "b", "2"]);

        assert_eq!(run(&mut session, &["HLEN", "h"]), Frame::Integer(2));
        assert_eq!(run(&mut session, &["HLEN", "missing"]), Frame::Integer(0));
    }
}
