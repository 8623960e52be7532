use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns the value associated with field in the hash stored at key.
///
/// Ref: <https://redis.io/docs/latest/commands/hget/>
#[derive(Debug, PartialEq)]
pub struct Hget {
    pub key: String,
    pub field: String,
}

impl Executable for Hget {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Null);
        };

        match value.as_hash() {
            Ok(hash) => Ok(hash.get(&self.field).map_or(Frame::Null, Frame::Bulk)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Hget {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;

        Ok(Self { key, field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{bulk, run, session};

    #[test]
    fn fields() {
        let mut session = session();
        run(&mut session, &["HSET", "h", "field1", "foo"]);

        assert_eq!(run(&mut session, &["HGET", "h", "field1"]), bulk("foo"));
        assert_eq!(run(&mut session, &["HGET", "h", "field2"]), Frame::Null);
        assert_eq!(run(&mut session, &["HGET", "missing", "field1"]), Frame::Null);
    }
}
