use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Decrements the number stored at key by decrement.
///
/// Ref: <https://redis.io/docs/latest/commands/decrby/>
#[derive(Debug, PartialEq)]
pub struct DecrBy {
    pub key: String,
    pub decrement: i64,
}

impl Executable for DecrBy {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(delta) = self.decrement.checked_neg() else {
            return Ok(DbError::Overflow.into());
        };

        match session.db().incr_by(&self.key, delta) {
            Ok(value) => Ok(Frame::Integer(value)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for DecrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let decrement = parser.next_integer()?;

        Ok(Self { key, decrement })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn decrements() {
        let mut session = session();
        run(&mut session, &["SET", "key1", "10"]);

        assert_eq!(run(&mut session, &["DECRBY", "key1", "3"]), Frame::Integer(7));
        assert_eq!(run(&mut session, &["DECRBY", "key1", "-3"]), Frame::Integer(10));
    }

    #[test]
    fn min_decrement_overflows() {
        let mut session = session();

        assert_eq!(
            run(&mut session, &["DECRBY", "key1", &i64::MIN.to_string()]),
            Frame::Error("ERR increment or decrement would overflow".to_string())
        );
        assert_eq!(run(&mut session, &["EXISTS", "key1"]), Frame::Integer(0));
    }
}
