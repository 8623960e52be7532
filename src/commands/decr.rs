use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Decrements the number stored at key by one. If the key does not exist, it is set to 0 before
/// performing the operation.
///
/// Ref: <https://redis.io/docs/latest/commands/decr/>
#[derive(Debug, PartialEq)]
pub struct Decr {
    pub key: String,
}

impl Executable for Decr {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match session.db().incr_by(&self.key, -1_i64) {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Decr {
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
    fn below_zero() {
        let mut session = session();

        assert_eq!(run(&mut session, &["DECR", "key1"]), Frame::Integer(-1));
        assert_eq!(run(&mut session, &["DECR", "key1"]), Frame::Integer(-2));
    }

    #[test]
    fn underflow() {
        let mut session = session();
        run(&mut session, &["SET", "key1", &i64::MIN.to_string()]);

        assert_eq!(
            run(&mut session, &["DECR", "key1"]),
            Frame::Error("ERR increment or decrement would overflow".to_string())
        );
    }
}
