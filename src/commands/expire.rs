use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::value::now_ms;
use crate::Error;

/// How the amount given to an expire command is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireUnit {
    /// `EXPIRE`: seconds from now.
    Seconds,
    /// `PEXPIRE`: milliseconds from now.
    Milliseconds,
    /// `EXPIREAT`: unix time in seconds.
    UnixSeconds,
    /// `PEXPIREAT`: unix time in milliseconds.
    UnixMilliseconds,
}

impl ExpireUnit {
    pub fn command_name(&self) -> &'static str {
        match self {
            ExpireUnit::Seconds => "expire",
            ExpireUnit::Milliseconds => "pexpire",
            ExpireUnit::UnixSeconds => "expireat",
            ExpireUnit::UnixMilliseconds => "pexpireat",
        }
    }

    /// Absolute deadline in unix milliseconds, `None` on overflow.
    fn deadline(&self, amount: i64, now: i64) -> Option<i64> {
        match self {
            ExpireUnit::Seconds => amount.checked_mul(1000)?.checked_add(now),
            ExpireUnit::Milliseconds => amount.checked_add(now),
            ExpireUnit::UnixSeconds => amount.checked_mul(1000),
            ExpireUnit::UnixMilliseconds => Some(amount),
        }
    }
}

/// Set a timeout on `key`. After the timeout has expired, the key will automatically be deleted.
/// A deadline in the past deletes the key right away.
///
/// Covers `EXPIRE`, `PEXPIRE`, `EXPIREAT` and `PEXPIREAT`.
///
/// Ref: <https://redis.io/docs/latest/commands/expire>
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: String,
    pub amount: i64,
    pub unit: ExpireUnit,
}

impl Expire {
    pub(crate) fn parse(parser: &mut CommandParser, unit: ExpireUnit) -> Result<Self, Error> {
        let key = parser.next_string()?;
        let amount = parser.next_integer()?;
        Ok(Self { key, amount, unit })
    }
}

impl Executable for Expire {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let Some(at) = self.unit.deadline(self.amount, now_ms() as i64) else {
            let err = CommandParserError::InvalidExpireTime {
                command: self.unit.command_name().to_string(),
            };
            return Ok(Frame::Error(err.to_string()));
        };

        let existed = session.db().expire_at(&self.key, at.max(0) as u64);
        Ok(Frame::from(existed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{request, run, session};
    use crate::commands::Command;

    #[test]
    fn parse_variants() {
        let cmd = Command::try_from(request(&["PEXPIREAT", "k", "1700000000000"])).unwrap();

        assert_eq!(
            cmd,
            Command::Expire(Expire {
                key: "k".to_string(),
                amount: 1_700_000_000_000,
                unit: ExpireUnit::UnixMilliseconds,
            })
        );
    }

    #[test]
    fn sets_ttl() {
        let mut session = session();
        run(&mut session, &["SET", "k", "v"]);

        assert_eq!(run(&mut session, &["EXPIRE", "k", "100"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["TTL", "k"]), Frame::Integer(100));

        assert_eq!(run(&mut session, &["PEXPIRE", "k", "5000"]), Frame::Integer(1));
        let Frame::Integer(pttl) = run(&mut session, &["PTTL", "k"]) else {
            panic!("expected integer");
        };
        assert!(pttl > 4_000 && pttl <= 5_000);

        let at = (now_ms() / 1000 + 60).to_string();
        assert_eq!(run(&mut session, &["EXPIREAT", "k", &at]), Frame::Integer(1));
        let Frame::Integer(ttl) = run(&mut session, &["TTL", "k"]) else {
            panic!("expected integer");
        };
        assert!(ttl > 55 && ttl <= 60);
    }

    #[test]
    fn missing_key() {
        assert_eq!(run(&mut session(), &["EXPIRE", "nope", "10"]), Frame::Integer(0));
    }

    #[test]
    fn past_deadline_deletes() {
        let mut session = session();
        run(&mut session, &["SET", "k", "v"]);

        assert_eq!(run(&mut session, &["EXPIRE", "k", "-1"]), Frame::Integer(1));
        assert_eq!(run(&mut session, &["EXISTS", "k"]), Frame::Integer(0));
    }

    #[test]
    fn overflowing_amount() {
        let mut session = session();
        run(&mut session, &["SET", "k", "v"]);

        assert_eq!(
            run(&mut session, &["EXPIRE", "k", &i64::MAX.to_string()]),
            Frame::Error("ERR invalid expire time in 'expire' command".to_string())
        );
        assert_eq!(run(&mut session, &["TTL", "k"]), Frame::Integer(-1));
    }

    #[test]
    fn not_an_integer() {
        assert_eq!(
            run(&mut session(), &["EXPIRE", "k", "soon"]),
            Frame::Error("ERR value is not an integer or out of range".to_string())
        );
    }
}
