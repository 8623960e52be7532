use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::DbError;
use crate::value::Value;
use crate::Error;

/// Add the specified members to the set stored at key. Specified members that are already a
/// member of this set are ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/sadd/>
#[derive(Debug, PartialEq)]
pub struct Sadd {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for Sadd {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Sadd { key, members } = self;

        let res = session.db().compute(&key, |slot| -> Result<usize, DbError> {
            let value = slot.get_or_insert_with(|| Arc::new(Value::set()));
            let set = value.as_set()?;
            Ok(members
                .into_iter()
                .filter(|member| set.put_if_absent(member.clone(), ()))
                .count())
        });

        match res {
            Ok(added) => Ok(Frame::Integer(added as i64)),
            Err(err) => Ok(err.into()),
        }
    }
}

impl TryFrom<&mut CommandParser> for Sadd {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.rest_strings()?;

        Ok(Self { key, members })
    }
}
