use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::value::normalize_range;
use crate::Error;

/// Removes all elements in the sorted set stored at key with rank between start and stop. Both
/// are 0-based indexes and may be negative to count from the highest score.
///
/// Ref: <https://redis.io/docs/latest/commands/zremrangebyrank/>
#[derive(Debug, PartialEq)]
pub struct ZRemRangeByRank {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for ZRemRangeByRank {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let ZRemRangeByRank { key, start, stop } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(0);
            };
            let (removed, now_empty) = {
                let mut zset = value.as_sorted_set()?.lock();
                let removed = match normalize_range(start, stop, zset.len()) {
                    Some((start, stop)) => zset.remove_range_by_rank(start, stop),
                    None => 0,
                };
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

impl TryFrom<&mut CommandParser> for ZRemRangeByRank {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        Ok(Self { key, start, stop })
    }
}
