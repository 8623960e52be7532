use bytes::Bytes;
use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::{Db, DbError};
use crate::value::Value;
use crate::Error;

/// Atomically returns and removes the last element (tail) of the list stored at source, and
/// pushes the element at the first element (head) of the list stored at destination.
///
/// When source and destination are the same key the list is rotated.
///
/// Ref: <https://redis.io/docs/latest/commands/rpoplpush/>
#[derive(Debug, PartialEq)]
pub struct RPopLPush {
    pub source: String,
    pub destination: String,
}

impl Executable for RPopLPush {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let db = session.db();
        let res = if self.source == self.destination {
            rotate(db, &self.source)
        } else {
            move_tail(db, &self.source, &self.destination)
        };

        match res {
            Ok(element) => Ok(element.map_or(Frame::Null, Frame::Bulk)),
            Err(err) => Ok(err.into()),
        }
    }
}

fn rotate(db: &Db, key: &str) -> Result<Option<Bytes>, DbError> {
    db.compute(key, |slot| -> Result<Option<Bytes>, DbError> {
        let Some(value) = slot.as_ref() else {
            return Ok(None);
        };
        let mut list = value.as_list()?.lock();
        list.rotate();
        Ok(list.head().and_then(|id| list.get(id)).cloned())
    })
}

fn move_tail(db: &Db, source: &str, destination: &str) -> Result<Option<Bytes>, DbError> {
    db.compute_pair(source, destination, |src, dst| -> Result<Option<Bytes>, DbError> {
        let Some(src_value) = src.as_ref() else {
            return Ok(None);
        };
        let src_list = src_value.as_list()?;
        if let Some(dst_value) = dst.as_ref() {
            dst_value.as_list()?;
        }

        let (element, now_empty) = {
            let mut list = src_list.lock();
            (list.pop_back(), list.is_empty())
        };
        if now_empty {
            *src = None;
        }
        let Some(element) = element else {
            return Ok(None);
        };

        let dst_value = dst.get_or_insert_with(|| Arc::new(Value::list()));
        dst_value.as_list()?.lock().push_front(element.clone());
        Ok(Some(element))
    })
}

impl TryFrom<&mut CommandParser> for RPopLPush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let source = parser.next_string()?;
        let destination = parser.next_string()?;

        Ok(Self {
            source,
            destination,
        })
    }
}
