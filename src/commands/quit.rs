use crate::commands::executable::{Executable, Session};
use crate::frame::Frame;
use crate::Error;

/// Asks the server to close the connection once the reply is written.
///
/// Ref: <https://redis.io/docs/latest/commands/quit>
#[derive(Debug, PartialEq)]
pub struct Quit;

impl Executable for Quit {
    fn exec(self, _session: &mut Session) -> Result<Frame, Error> {
        Ok(Frame::ok())
    }
}
