use bytes::Bytes;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Removes the first count occurrences of elements equal to element from the list stored at key.
///
/// * `count > 0`: remove elements equal to element moving from head to tail.
/// * `count < 0`: remove elements equal to element moving from tail to head.
/// * `count = 0`: remove all elements equal to element.
///
/// Ref: <https://redis.io/docs/latest/commands/lrem/>
#[derive(Debug, PartialEq)]
pub struct Lrem {
    pub key: String,
    pub count: i64,
    pub element: Bytes,
}

impl Executable for Lrem {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Lrem {
            key,
            count,
            element,
        } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(0);
            };

            let (removed, now_empty) = {
                let mut list = value.as_list()?.lock();
                let limit = if count == 0 {
                    usize::MAX
                } else {
                    count.unsigned_abs() as usize
                };

                let mut removed = 0;
                let mut cursor = if count < 0 { list.tail() } else { list.head() };
                while let Some(id) = cursor {
                    if removed == limit {
                        break;
                    }
                    cursor = if count < 0 { list.prev(id) } else { list.next(id) };
                    if list.get(id).is_some_and(|value| *value == element) {
                        list.remove(id);
                        removed += 1;
                    }
                }
                (removed, list.is_empty())
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

impl TryFrom<&mut CommandParser> for Lrem {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let count = parser.next_integer()?;
        let element = parser.next_bytes()?;

        Ok(Self {
            key,
            count,
            element,
        })
    }
}
