use crate::commands::executable::{Executable, Session};
use crate::commands::push::ListEnd;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Removes and returns the first (`LPOP`) or last (`RPOP`) elements of the list stored at key.
///
/// Without `count` the reply is a single element, with it an array of at most `count`
/// elements. A list left empty is deleted.
///
/// Ref: <https://redis.io/docs/latest/commands/lpop/>
/// Ref: <https://redis.io/docs/latest/commands/rpop/>
#[derive(Debug, PartialEq)]
pub struct Pop {
    pub key: String,
    pub end: ListEnd,
    pub count: Option<usize>,
}

impl Executable for Pop {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Pop { key, end, count } = self;

        let res = session.db().compute(&key, |slot| -> Result<Frame, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(Frame::Null);
            };

            let (frame, now_empty) = {
                let mut list = value.as_list()?.lock();
                let frame = match count {
                    None => end.pop(&mut list).map_or(Frame::Null, Frame::Bulk),
                    Some(count) => Frame::Array(
                        std::iter::from_fn(|| end.pop(&mut list))
                            .take(count)
                            .map(Frame::Bulk)
                            .collect(),
                    ),
                };
                (frame, list.is_empty())
            };

            if now_empty {
                *slot = None;
            }
            Ok(frame)
        });

        Ok(res.unwrap_or_else(Frame::from))
    }
}

impl Pop {
    pub(crate) fn parse(parser: &mut CommandParser, end: ListEnd) -> Result<Self, Error> {
        let key = parser.next_string()?;
        let count = if parser.has_next() {
            let count = parser.next_integer()?;
            Some(usize::try_from(count).map_err(|_| CommandParserError::NotPositive)?)
        } else {
            None
        };
        parser.finish()?;

        Ok(Self { key, end, count })
    }
}
