use crate::commands::executable::{Executable, Session};
use crate::frame::Frame;
use crate::Error;

/// Return the number of keys in the currently-selected database.
///
/// Ref: <https://redis.io/docs/latest/commands/dbsize>
#[derive(Debug, PartialEq)]
pub struct DBSize;

impl Executable for DBSize {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        Ok(Frame::from(session.db().size()))
    }
}
