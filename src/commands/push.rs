use bytes::Bytes;
use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::structures::list::LinkedList;
use crate::value::Value;
use crate::Error;

/// Which end of a list a command works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEnd {
    Left,
    Right,
}

impl ListEnd {
    pub fn push(&self, list: &mut LinkedList, value: Bytes) {
        match self {
            ListEnd::Left => list.push_front(value),
            ListEnd::Right => list.push_back(value),
        };
    }

    pub fn pop(&self, list: &mut LinkedList) -> Option<Bytes> {
        match self {
            ListEnd::Left => list.pop_front(),
            ListEnd::Right => list.pop_back(),
        }
    }
}

/// Insert all the specified values at the head (`LPUSH`) or tail (`RPUSH`) of the list stored at
/// key. If key does not exist, it is created as empty list before performing the push operations.
/// Elements are inserted one after the other, so `LPUSH mylist a b c` leaves `c` first.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush/>
/// Ref: <https://redis.io/docs/latest/commands/rpush/>
#[derive(Debug, PartialEq)]
pub struct Push {
    pub key: String,
    pub values: Vec<Bytes>,
    pub end: ListEnd,
}

impl Executable for Push {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Push { key, values, end } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let value = slot.get_or_insert_with(|| Arc::new(Value::list()));
            let mut list = value.as_list()?.lock();
            for value in values {
                end.push(&mut list, value);
            }
            Ok(list.len())
        });

        match res {
            Ok(len) => Ok(Frame::Integer(len as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl Push {
    pub(crate) fn parse(parser: &mut CommandParser, end: ListEnd) -> Result<Self, Error> {
        let key = parser.next_string()?;
        let mut values = Vec::with_capacity(parser.remaining());
        while parser.has_next() {
            values.push(parser.next_bytes()?);
        }

        Ok(Self { key, values, end })
    }
}
