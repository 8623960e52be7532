use bytes::Bytes;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::value::Value;
use crate::Error;

/// Set key to hold string value if key does not exist. When key already holds a value, no
/// operation is performed.
///
/// Ref: <https://redis.io/docs/latest/commands/setnx/>
#[derive(Debug, PartialEq)]
pub struct Setnx {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Setnx {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let stored = session
            .db()
            .set_if_absent(&self.key, Value::string(self.value));

        Ok(Frame::from(stored))
    }
}

impl TryFrom<&mut CommandParser> for Setnx {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn only_first_write_wins() {
        let mut session = session();

        assert_eq!(run(&mut session, &["SETNX", "k", "first"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["SETNX", "k", "second"]), Frame::Integer(0));
        assert_eq!(run(&mut session, &["GET", "k"]), Frame::Bulk(Bytes::from("first")));
    }
}
