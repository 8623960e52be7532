use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Removes the specified members from the sorted set stored at key. Non existing members are
/// ignored, and an emptied sorted set is deleted.
///
/// Ref: <https://redis.io/docs/latest/commands/zrem/>
#[derive(Debug, PartialEq)]
pub struct Zrem {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for Zrem {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Zrem { key, members } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(0);
            };
            let (removed, now_empty) = {
                let mut zset = value.as_sorted_set()?.lock();
                let removed = members.iter().filter(|member| zset.remove(member)).count();
                (removed, zset.is_empty())
            };
            if now_empty {
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

impl TryFrom<&mut CommandParser> for Zrem {
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
        run(&mut session, &["ZADD", "z", "1", "one", "2", "two"]);

        assert_eq!(run(&mut session, &["ZREM", "z", "one", "three"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["ZCARD", "z"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["ZREM", "z", "two"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["EXISTS", "z"]), Frame::Integer(0));
    }
}
