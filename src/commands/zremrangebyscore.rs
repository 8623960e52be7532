use crate::commands::executable::{Executable, Session};
use crate::commands::zrangebyscore::parse_range;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::structures::skiplist::RangeSpec;
use crate::Error;

/// Removes all elements in the sorted set stored at key with a score between min and max.
///
/// Ref: <https://redis.io/docs/latest/commands/zremrangebyscore/>
#[derive(Debug, PartialEq)]
pub struct ZRemRangeByScore {
    pub key: String,
    pub range: RangeSpec,
}

impl Executable for ZRemRangeByScore {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let ZRemRangeByScore { key, range } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(0);
            };
            let (removed, now_empty) = {
                let mut zset = value.as_sorted_set()?.lock();
                (zset.remove_range_by_score(&range), zset.is_empty())
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

impl TryFrom<&mut CommandParser> for ZRemRangeByScore {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let range = parse_range(&parser.next_string()?, &parser.next_string()?)?;

        Ok(Self { key, range })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{bulk, run, session};

    #[test]
    fn removes_by_score() {
        let mut session = session();
        run(&mut session, &["ZADD", "z", "1", "one", "2", "two", "3", "three"]);

        assert_eq!(
            run(&mut session, &["ZREMRANGEBYSCORE", "z", "-inf", "(2"]),
            Frame::Integer(1)
        );
        assert_eq!(
            run(&mut session, &["ZRANGE", "z", "0", "-1", "WITHSCORES"]),
            Frame::Array(vec![bulk("two"), bulk("2"), bulk("three"), bulk("3")])
        );
        assert_eq!(
            run(&mut session, &["ZREMRANGEBYSCORE", "z", "0", "10"]),
            Frame::Integer(2)
        );
        assert_eq!(run(&mut session, &["EXISTS", "z"]), Frame::Integer(0));
    }
}
