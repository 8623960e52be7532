use rand::seq::SliceRandom;

use crate::commands::executable::{Executable, Session};
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::Error;

/// Returns random members of the set stored at key without removing them.
///
/// A positive `count` returns up to `count` distinct members, a negative one returns exactly
/// `-count` members that may repeat.
///
/// Ref: <https://redis.io/docs/latest/commands/srandmember/>
#[derive(Debug, PartialEq)]
pub struct Srandmember {
    pub key: String,
    pub count: Option<i64>,
}

impl Executable for Srandmember {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(match self.count {
                Some(_) => Frame::Array(vec![]),
                None => Frame::Null,
            });
        };
        let set = match value.as_set() {
            Ok(set) => set,
            Err(err) => return Ok(err.into()),
        };

        let Some(count) = self.count else {
            return Ok(Frame::from(set.random_key()));
        };

        let members = set.keys();
        let mut rng = rand::thread_rng();
        let chosen: Vec<String> = if count >= 0 {
            members
                .choose_multiple(&mut rng, count as usize)
                .cloned()
                .collect()
        } else {
            (0..count.unsigned_abs())
                .filter_map(|_| members.choose(&mut rng).cloned())
                .collect()
        };

        Ok(Frame::from(chosen))
    }
}

impl TryFrom<&mut CommandParser> for Srandmember {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let count = if parser.has_next() {
            Some(parser.next_integer()?)
        } else {
            None
        };
        parser.finish()?;

        Ok(Self { key, count })
    }
}
