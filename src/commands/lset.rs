use bytes::Bytes;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

/// Sets the list element at index to element. An error is returned for out of range indexes.
///
/// Ref: <https://redis.io/docs/latest/commands/lset/>
#[derive(Debug, PartialEq)]
pub struct Lset {
    pub key: String,
    pub index: i64,
    pub element: Bytes,
}

impl Executable for Lset {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Lset {
            key,
            index,
            element,
        } = self;

        let res = session.db().compute(&key, |slot| -> Result<(), DbError> {
            let value = slot.as_ref().ok_or(DbError::NoSuchKey)?;
            let mut list = value.as_list()?.lock();
            let id = list.index(index).ok_or(DbError::IndexOutOfRange)?;
            list.set(id, element);
            Ok(())
        });

        match res {
            Ok(()) => Ok(Frame::ok()),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Lset {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let index = parser.next_integer()?;
        let element = parser.next_bytes()?;

        Ok(Self {
            key,
            index,
            element,
        })
    }
}
