use bytes::Bytes;
use std::str::FromStr;
use std::sync::Arc;

use crate::commands::executable::{Executable, Session};
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::value::{now_ms, Data, Value};
use crate::Error;

#[derive(Debug, PartialEq, strum_macros::EnumString)]
#[strum(ascii_case_insensitive)]
enum SetOption {
    Ex,
    Px,
    Exat,
    Pxat,
    Nx,
    Xx,
}

/// Only write when the key is absent (`NX`) or present (`XX`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetCondition {
    Always,
    IfAbsent,
    IfPresent,
}

/// Deadline attached by `EX`, `PX`, `EXAT` or `PXAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetExpiry {
    Seconds(u64),
    Milliseconds(u64),
    UnixSeconds(u64),
    UnixMilliseconds(u64),
}

impl SetExpiry {
    /// Absolute deadline in unix milliseconds.
    pub fn deadline(&self, now: u64) -> Option<u64> {
        match *self {
            SetExpiry::Seconds(s) => s.checked_mul(1000)?.checked_add(now),
            SetExpiry::Milliseconds(ms) => ms.checked_add(now),
            SetExpiry::UnixSeconds(s) => s.checked_mul(1000),
            SetExpiry::UnixMilliseconds(ms) => Some(ms),
        }
    }
}

/// Set `key` to hold the string `value`. If key already holds a value, it is overwritten,
/// regardless of its type, and any previous time to live is discarded.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
    pub condition: SetCondition,
    pub expiry: Option<SetExpiry>,
}

impl Executable for Set {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        let expires_at = match self.expiry {
            Some(expiry) => match expiry.deadline(now_ms()) {
                Some(at) => Some(at),
                None => return Ok(Frame::Error(invalid_expire_time().to_string())),
            },
            None => None,
        };

        let condition = self.condition;
        let value = Value::with_expiry(Data::String(self.value), expires_at);

        let written = session.db().compute(&self.key, |slot| {
            let allowed = match condition {
                SetCondition::Always => true,
                SetCondition::IfAbsent => slot.is_none(),
                SetCondition::IfPresent => slot.is_some(),
            };
            if allowed {
                *slot = Some(Arc::new(value));
            }
            allowed
        });

        Ok(if written { Frame::ok() } else { Frame::Null })
    }
}

fn invalid_expire_time() -> CommandParserError {
    CommandParserError::InvalidExpireTime {
        command: "set".to_string(),
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_bytes()?;

        let mut condition = SetCondition::Always;
        let mut expiry = None;

        while parser.has_next() {
            let option = SetOption::from_str(&parser.next_string()?)
                .map_err(|_| CommandParserError::Syntax)?;

            match option {
                SetOption::Nx | SetOption::Xx => {
                    if condition != SetCondition::Always {
                        return Err(CommandParserError::Syntax.into());
                    }
                    condition = if option == SetOption::Nx {
                        SetCondition::IfAbsent
                    } else {
                        SetCondition::IfPresent
                    };
                }
                SetOption::Ex | SetOption::Px | SetOption::Exat | SetOption::Pxat => {
                    if expiry.is_some() || !parser.has_next() {
                        return Err(CommandParserError::Syntax.into());
                    }
                    let amount = parser.next_integer()?;
                    let amount = u64::try_from(amount)
                        .ok()
                        .filter(|amount| *amount > 0)
                        .ok_or_else(invalid_expire_time)?;

                    expiry = Some(match option {
                        SetOption::Ex => SetExpiry::Seconds(amount),
                        SetOption::Px => SetExpiry::Milliseconds(amount),
                        SetOption::Exat => SetExpiry::UnixSeconds(amount),
                        _ => SetExpiry::UnixMilliseconds(amount),
                    });
                }
            }
        }

        Ok(Self {
            key,
            value,
            condition,
            expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{request, run, session};
    use crate::commands::Command;

    #[test]
    fn parse_set_command() {
        let set_frame = Frame::Array(vec![
            Frame::Simple(String::from("SET")),
            Frame::Simple(String::from("foo")),
            Frame::Simple(String::from("baz")),
        ]);

        let set_command = Command::try_from(set_frame).unwrap();

        assert_eq!(
            set_command,
            Command::Set(Set {
                key: String::from("foo"),
                value: Bytes::from("baz"),
                condition: SetCondition::Always,
                expiry: None,
            })
        );

        let set_frame = Frame::Array(vec![
            Frame::Simple(String::from("SET")),
            Frame::Bulk(Bytes::from("foo")),
            Frame::Bulk(Bytes::from("baz")),
            Frame::Bulk(Bytes::from("px")),
            Frame::Bulk(Bytes::from("1500")),
            Frame::Bulk(Bytes::from("NX")),
        ]);

        let set_command = Command::try_from(set_frame).unwrap();

        assert_eq!(
            set_command,
            Command::Set(Set {
                key: String::from("foo"),
                value: Bytes::from("baz"),
                condition: SetCondition::IfAbsent,
                expiry: Some(SetExpiry::Milliseconds(1500)),
            })
        );
    }

    #[test]
    fn invalid_options() {
        for args in [
            &["SET", "k", "v", "EX"][..],
            &["SET", "k", "v", "NX", "XX"],
            &["SET", "k", "v", "EX", "1", "PX", "1"],
            &["SET", "k", "v", "SOMEDAY"],
        ] {
            let err = Command::try_from(request(args)).unwrap_err();
            assert_eq!(err.to_string(), "ERR syntax error", "{args:?}");
        }

        let err = Command::try_from(request(&["SET", "k", "v", "EX", "0"])).unwrap_err();
        assert_eq!(err.to_string(), "ERR invalid expire time in 'set' command");
    }

    #[test]
    fn overwrites_any_type_and_clears_ttl() {
        let mut session = session();
        run(&mut session, &["RPUSH", "k", "a"]);
        run(&mut session, &["EXPIRE", "k", "100"]);

        assert_eq!(run(&mut session, &["SET", "k", "v"]), Frame::ok());
        assert_eq!(run(&mut session, &["TYPE", "k"]), Frame::Simple("string".to_string()));
        assert_eq!(run(&mut session, &["TTL", "k"]), Frame::Integer(-1));
    }

    #[test]
    fn conditions() {
        let mut session = session();

        assert_eq!(run(&mut session, &["SET", "k", "1", "XX"]), Frame::Null);
        assert_eq!(run(&mut session, &["SET", "k", "1", "NX"]), Frame::ok());
        assert_eq!(run(&mut session, &["SET", "k", "2", "NX"]), Frame::Null);
        assert_eq!(run(&mut session, &["SET", "k", "3", "XX"]), Frame::ok());
        assert_eq!(run(&mut session, &["GET", "k"]), Frame::Bulk(Bytes::from("3")));
    }

    #[test]
    fn absolute_deadline_in_the_past_expires_immediately() {
        let mut session = session();

        assert_eq!(run(&mut session, &["SET", "k", "v", "PXAT", "1"]), Frame::ok());
        assert_eq!(run(&mut session, &["GET", "k"]), Frame::Null);
    }
}
