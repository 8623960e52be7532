use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Remove the specified members from the set stored at key. A set left without members is
/// deleted.
///
/// Ref: <https://redis.io/docs/latest/commands/srem/>
#[derive(Debug, PartialEq)]
pub struct Srem {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for Srem {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Srem { key, members } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(0);
            };
            let set = value.as_set()?;
            let removed = members
                .iter()
                .filter(|member| set.remove(member.as_str()).is_some())
                .count();
            if set.is_empty() {
                *slot = None;
            }
            Ok(removed)
        });

        match res {
            Ok(removed) => Ok(Frame::Integer(removed as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Srem {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.rest_strings()?;

        Ok(Self { key, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn removes_members() {
        let mut session = session();
        run(&mut session, &["SADD", "s", "a", "b"]);

        assert_eq!(run(&mut session, &["SREM", "s", "a", "x"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["SREM", "s", "b"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["EXISTS", "s"]), Frame::Integer(0));
        assert_eq!(run(&mut session, &["SREM", "s", "b"]), Frame::Integer(0));
    }
}
