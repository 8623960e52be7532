use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::Error;

/// Delete all the keys of the currently selected DB.
///
/// Ref: <https://redis.io/docs/latest/commands/flushdb>
#[derive(Debug, PartialEq)]
pub struct FlushDb;

/// Delete all the keys of all the existing databases.
///
/// Ref: <https://redis.io/docs/latest/commands/flushall>
#[derive(Debug, PartialEq)]
pub struct FlushAll;

impl Executable for FlushDb {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        session.db().flush();
        Ok(Frame::ok())
    }
}

impl Executable for FlushAll {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        session.store().flush_all();
        Ok(Frame::ok())
    }
}

/// Flushing always happens synchronously; the `ASYNC`/`SYNC` modifiers are accepted and ignored.
fn parse_mode(parser: &mut CommandParser) -> Result<(), CommandParserError> {
    if parser.has_next() {
        match parser.next_keyword()?.as_str() {
            "async" | "sync" => {}
            _ => return Err(CommandParserError::Syntax),
        }
    }
    parser.finish()
}

impl TryFrom<&mut CommandParser> for FlushDb {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parse_mode(parser)?;
        Ok(Self)
    }
}

impl TryFrom<&mut CommandParser> for FlushAll {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parse_mode(parser)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn flushdb_only_touches_selected_database() {
        let mut session = session();
        run(&mut session, &["SET", "a", "1"]);
        run(&mut session, &["SELECT", "1"]);
        run(&mut session, &["SET", "b", "1"]);

        assert_eq!(run(&mut session, &["FLUSHDB", "ASYNC"]), Frame::ok());
        assert_eq!(run(&mut session, &["DBSIZE"]), Frame::Integer(0));

        run(&mut session, &["SELECT", "0"]);
        assert_eq!(run(&mut session, &["DBSIZE"]), Frame::Integer(1));
    }

    #[test]
    fn flushall_empties_everything() {
        let mut session = session();
        run(&mut session, &["SET", "a", "1"]);
        run(&mut session, &["SELECT", "5"]);
        run(&mut session, &["SET", "b", "1"]);

        assert_eq!(run(&mut session, &["FLUSHALL"]), Frame::ok());
        assert_eq!(run(&mut session, &["DBSIZE"]), Frame::Integer(0));
        run(&mut session, &["SELECT", "0"]);
        assert_eq!(run(&mut session, &["DBSIZE"]), Frame::Integer(0));
    }

    #[test]
    fn unknown_modifier() {
        assert_eq!(
            run(&mut session(), &["FLUSHDB", "LATER"]),
            Frame::Error("ERR syntax error".to_string())
        );
    }
}
