use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::value::normalize_range;
use crate::Error;

/// Returns the specified range of elements in the sorted set stored at key, ordered from the
/// lowest to the highest score (`ZRANGE`) or the other way around (`ZREVRANGE`). Indexes are
/// 0-based and may be negative.
///
/// Ref: <https://redis.io/docs/latest/commands/zrange/>
/// Ref: <https://redis.io/docs/latest/commands/zrevrange/>
#[derive(Debug, PartialEq)]
pub struct Zrange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
    pub reverse: bool,
    pub with_scores: bool,
}

impl Executable for Zrange {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Array(vec![]));
        };
        let zset = match value.as_sorted_set() {
            Ok(zset) => zset.lock(),
            Err(err) => return Ok(err.into()),
        };

        let elements = match normalize_range(self.start, self.stop, zset.len()) {
            Some((start, stop)) => zset.range_by_rank(start, stop, self.reverse),
            None => vec![],
        };

        Ok(scored_reply(elements, self.with_scores))
    }
}

/// Members, each followed by its score when `with_scores` is set.
pub(crate) fn scored_reply(elements: Vec<(String, f64)>, with_scores: bool) -> Frame {
    if with_scores {
        Frame::from_pairs(elements)
    } else {
        Frame::from(
            elements
                .into_iter()
                .map(|(member, _)| member)
                .collect::<Vec<_>>(),
        )
    }
}

impl Zrange {
    pub(crate) fn parse(parser: &mut CommandParser, reverse: bool) -> Result<Self, Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;

        let with_scores = parser.has_next();
        if with_scores && parser.next_keyword()? != "withscores" {
            return Err(CommandParserError::Syntax.into());
        }
        parser.finish()?;

        Ok(Self {
            key,
            start,
            stop,
            reverse,
            with_scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{bulk, request, run, session};
    use crate::commands::Command;

    #[test]
    fn parse() {
        let cmd = Command::try_from(request(&["ZREVRANGE", "z", "0", "-1", "withscores"])).unwrap();
        assert_eq!(
            cmd,
            Command::Zrange(Zrange {
                key: "z".to_string(),
                start: 0,
                stop: -1,
                reverse: true,
                with_scores: true,
            })
        );

        let err = Command::try_from(request(&["ZRANGE", "z", "0", "-1", "LIMIT"])).unwrap_err();
        assert_eq!(err.to_string(), "ERR syntax error");
    }

    #[test]
    fn ranges() {
        let mut session = session();
        run(&mut session, &["ZADD", "z", "1", "one", "2", "two", "3", "three"]);

        assert_eq!(
            run(&mut session, &["ZRANGE", "z", "0", "-1"]),
            Frame::Array(vec![bulk("one"), bulk("two"), bulk("three")])
        );
        assert_eq!(
            run(&mut session, &["ZRANGE", "z", "2", "3"]),
            Frame::Array(vec![bulk("three")])
        );
        assert_eq!(
            run(&mut session, &["ZRANGE", "z", "-2", "-1", "WITHSCORES"]),
            Frame::Array(vec![bulk("two"), bulk("2"), bulk("three"), bulk("3")])
        );
        assert_eq!(
            run(&mut session, &["ZREVRANGE", "z", "0", "1"]),
            Frame::Array(vec![bulk("three"), bulk("two")])
        );
        assert_eq!(run(&mut session, &["ZRANGE", "z", "5", "10"]), Frame::Array(vec![]));
    }
}
