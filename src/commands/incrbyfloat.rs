use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::{format_float, Frame};
use crate::Error;

/// Increment the string representing a floating point number stored at key by the specified
/// increment. If the key does not exist, it is set to 0 before performing the operation.
///
/// Ref: <https://redis.io/docs/latest/commands/incrbyfloat/>
#[derive(Debug, PartialEq)]
pub struct IncrByFloat {
    pub key: String,
    pub increment: f64,
}

impl Executable for IncrByFloat {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match session.db().incr_by_float(&self.key, self.increment) {
            Ok(value) => Ok(Frame::Bulk(format_float(value).into())),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for IncrByFloat {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let increment = parser.next_float()?;

        Ok(Self { key, increment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{bulk, request, run, session};
    use crate::commands::Command;

    #[test]
    fn parse() {
        let cmd = Command::try_from(request(&["INCRBYFLOAT", "key1", "0.25"])).unwrap();

        assert_eq!(
            cmd,
            Command::IncrByFloat(IncrByFloat {
                key: "key1".to_string(),
                increment: 0.25,
            })
        );

        let err = Command::try_from(request(&["INCRBYFLOAT", "key1", "abc"])).unwrap_err();
        assert_eq!(err.to_string(), "ERR value is not a valid float");
    }

    #[test]
    fn increments() {
        let mut session = session();
        run(&mut session, &["SET", "key1", "10.5"]);

        assert_eq!(run(&mut session, &["INCRBYFLOAT", "key1", "0.25"]), bulk("10.75"));
        assert_eq!(run(&mut session, &["INCRBYFLOAT", "key1", "-0.75"]), bulk("10"));
        assert_eq!(run(&mut session, &["GET", "key1"]), bulk("10"));
    }

    #[test]
    fn infinite_result() {
        let mut session = session();

        assert_eq!(
            run(&mut session, &["INCRBYFLOAT", "key1", "inf"]),
            Frame::Error("ERR increment would produce NaN or Infinity".to_string())
        );
    }
}
