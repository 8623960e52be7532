use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Select the Redis logical database having the specified zero-based numeric index. New
/// connections always use the database 0.
///
/// Ref: <https://redis.io/docs/latest/commands/select>
#[derive(Debug, PartialEq)]
pub struct Select {
    pub index: usize,
}

impl Executable for Select {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match session.select(self.index) {
            Ok(()) => Ok(Frame::ok()),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Select {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let index = parser.next_integer()?;
        let index = usize::try_from(index).map_err(|_| CommandParserError::NotInteger)?;
        Ok(Self { index })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn switches_database() {
        let mut session = session();

        run(&mut session, &["SET", "k", "db0"]);
        assert_eq!(run(&mut session, &["SELECT", "3"]), Frame::ok());
        assert_eq!(session.db_index(), 3);
        assert_eq!(run(&mut session, &["GET", "k"]), Frame::Null);

        run(&mut session, &["SET", "k", "db3"]);
        run(&mut session, &["SELECT", "0"]);
        assert_eq!(run(&mut session, &["GET", "k"]), Frame::Bulk(Bytes::from("db0")));
    }

    #[test]
    fn out_of_range() {
        let mut session = session();

        assert_eq!(
            run(&mut session, &["SELECT", "16"]),
            Frame::Error("ERR DB index is out of range".to_string())
        );
        assert_eq!(
            run(&mut session, &["SELECT", "-1"]),
            Frame::Error("ERR value is not an integer or out of range".to_string())
        );
        assert_eq!(session.db_index(), 0);
    }
}
