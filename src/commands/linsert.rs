use bytes::Bytes;
use std::str::FromStr;

use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::DbError;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Position {
    Before,
    After,
}

/// Inserts element in the list stored at key either before or after the reference value pivot.
///
/// Replies with the list length after the insert, `-1` when the pivot was not found and `0` when
/// the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/linsert/>
#[derive(Debug, PartialEq)]
pub struct Linsert {
    pub key: String,
    pub position: Position,
    pub pivot: Bytes,
    pub element: Bytes,
}

impl Executable for Linsert {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Linsert {
            key,
            position,
            pivot,
            element,
        } = self;

        let res = session.db().compute(&key, |slot| -> Result<i64, DbError> {
            let Some(value) = slot.as_ref() else {
                return Ok(0);
            };
            let mut list = value.as_list()?.lock();
            let Some(pivot) = list.find(&pivot) else {
                return Ok(-1);
            };

            match position {
                Position::Before => list.insert_before(pivot, element),
                Position::After => list.insert_after(pivot, element),
            };
            Ok(list.len() as i64)
        });

        match res {
            Ok(len) => Ok(Frame::Integer(len)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Linsert {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let position =
            Position::from_str(&parser.next_string()?).map_err(|_| CommandParserError::Syntax)?;
        let pivot = parser.next_bytes()?;
        let element = parser.next_bytes()?;

        Ok(Self {
            key,
            position,
            pivot,
            element,
        })
    }
}
