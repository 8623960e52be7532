use crate::commands::executable::{Executable, Session};
use crate::commands::zrange::scored_reply;
use crate::commands::{parse_float, CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::structures::skiplist::RangeSpec;
use crate::Error;

/// Returns all the elements in the sorted set at key with a score between min and max
/// (including elements with score equal to min or max), ordered from low to high scores.
///
/// A bound prefixed with `(` is exclusive, and `-inf`/`+inf` stand for unbounded ends.
///
/// Ref: <https://redis.io/docs/latest/commands/zrangebyscore/>
#[derive(Debug, PartialEq)]
pub struct ZRangeByScore {
    pub key: String,
    pub range: RangeSpec,
    pub with_scores: bool,
    pub limit: Option<(i64, i64)>,
}

impl Executable for ZRangeByScore {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(value) = session.db().get(&self.key) else {
            return Ok(Frame::Array(vec![]));
        };
        let zset = match value.as_sorted_set() {
            Ok(zset) => zset.lock(),
            Err(err) => return Ok(err.into()),
        };

        let mut elements = zset.range_by_score(&self.range);
        if let Some((offset, count)) = self.limit {
            let offset = usize::try_from(offset).unwrap_or(elements.len());
            let count = usize::try_from(count).unwrap_or(usize::MAX);
            elements = elements.into_iter().skip(offset).take(count).collect();
        }

        Ok(scored_reply(elements, self.with_scores))
    }
}

/// Parses a `min max` score interval such as `(1 +inf`.
pub(crate) fn parse_range(min: &str, max: &str) -> Result<RangeSpec, CommandParserError> {
    let parse_bound = |bound: &str| match bound.strip_prefix('(') {
        Some(bound) => parse_float(bound).map(|score| (score, true)),
        None => parse_float(bound).map(|score| (score, false)),
    };

    let (Some((min, min_exclusive)), Some((max, max_exclusive))) =
        (parse_bound(min), parse_bound(max))
    else {
        return Err(CommandParserError::InvalidScoreRange);
    };

    Ok(RangeSpec {
        min,
        max,
        min_exclusive,
        max_exclusive,
    })
}

impl TryFrom<&mut CommandParser> for ZRangeByScore {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let range = parse_range(&parser.next_string()?, &parser.next_string()?)?;

        let mut with_scores = false;
        let mut limit = None;
        while parser.has_next() {
            match parser.next_keyword()?.as_str() {
                "withscores" => with_scores = true,
                "limit" if parser.remaining() >= 2 => {
                    limit = Some((parser.next_integer()?, parser.next_integer()?));
                }
                _ => return Err(CommandParserError::Syntax.into()),
            }
        }

        Ok(Self {
            key,
            range,
            with_scores,
            limit,
        })
    }
}
