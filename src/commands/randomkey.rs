use crate::commands::executable::{Executable, Session};
use crate::frame::Frame;
use crate::Error;

/// Return a random key from the currently selected database, or nil when it is empty.
///
/// Ref: <https://redis.io/docs/latest/commands/randomkey>
#[derive(Debug, PartialEq)]
pub struct RandomKey;

impl Executable for RandomKey {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        Ok(Frame::from(session.db().random_key()))
    }
}
