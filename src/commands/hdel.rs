use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Removes the specified fields from the hash stored at key. A hash left without fields is
/// deleted.
///
/// Ref: <https://redis.io/docs/latest/commands/hdel/>
#[derive(Debug, PartialEq)]
pub struct Hdel {
    pub key: String,
    pub fields: Vec<String>,
}

impl Executable for Hdel {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Hdel { key, fields } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(0);
            };
            let hash = value.as_hash()?;
            let removed = fields
                .iter()
                .filter(|field| hash.remove(field.as_str()).is_some())
                .count();
            if hash.is_empty() {
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

impl TryFrom<&mut CommandParser> for Hdel {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let fields = parser.rest_strings()?;

        Ok(Self { key, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn removes_fields() {
        let mut session = session();
        run(&mut session, &["HSET", "h", "a", "1", "b", "2"]);

        assert_eq!(run(&mut session, &["HDEL", "h", "a", "zz"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["HLEN", "h"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["HDEL", "h", "b"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["EXISTS", "h"]), Frame::Integer(0));
    }
}
