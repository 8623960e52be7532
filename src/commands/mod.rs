pub mod append;
pub mod command;
pub mod dbsize;
pub mod decr;
pub mod decrby;
pub mod del;
pub mod echo;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod flush;
pub mod get;
pub mod getdel;
pub mod hdel;
pub mod hexists;
pub mod hget;
pub mod hgetall;
pub mod hincrby;
pub mod hlen;
pub mod hset;
pub mod incr;
pub mod incrby;
pub mod incrbyfloat;
pub mod keys;
pub mod lindex;
pub mod linsert;
pub mod llen;
pub mod lrange;
pub mod lrem;
pub mod lset;
pub mod mget;
pub mod mset;
pub mod object;
pub mod persist;
pub mod ping;
pub mod pop;
pub mod push;
pub mod quit;
pub mod randomkey;
pub mod rpoplpush;
pub mod sadd;
pub mod scard;
pub mod select;
pub mod set;
pub mod setnx;
pub mod sismember;
pub mod smembers;
pub mod spop;
pub mod srandmember;
pub mod srem;
pub mod strlen;
pub mod ttl;
pub mod type_;
pub mod zadd;
pub mod zcard;
pub mod zcount;
pub mod zincrby;
pub mod zrange;
pub mod zrangebyscore;
pub mod zrank;
pub mod zrem;
pub mod zremrangebyrank;
pub mod zremrangebyscore;
pub mod zscore;

use bytes::Bytes;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::{Executable, Session};
use crate::frame::Frame;
use crate::Error;

use append::Append;
use command::Command as Command_;
use dbsize::DBSize;
use decr::Decr;
use decrby::DecrBy;
use del::Del;
use echo::Echo;
use exists::Exists;
use expire::{Expire, ExpireUnit};
use flush::{FlushAll, FlushDb};
use get::Get;
use getdel::Getdel;
use hdel::Hdel;
use hexists::Hexists;
use hget::Hget;
use hgetall::{HFields, HashPart};
use hincrby::HIncrBy;
use hlen::Hlen;
use hset::Hset;
use incr::Incr;
use incrby::IncrBy;
use incrbyfloat::IncrByFloat;
use keys::Keys;
use lindex::Lindex;
use linsert::Linsert;
use llen::Llen;
use lrange::Lrange;
use lrem::Lrem;
use lset::Lset;
use mget::Mget;
use mset::Mset;
use object::Object;
use persist::Persist;
use ping::Ping;
use pop::Pop;
use push::{ListEnd, Push};
use quit::Quit;
use randomkey::RandomKey;
use rpoplpush::RPopLPush;
use sadd::Sadd;
use scard::Scard;
use select::Select;
use set::Set;
use setnx::Setnx;
use sismember::Sismember;
use smembers::Smembers;
use spop::Spop;
use srandmember::Srandmember;
use srem::Srem;
use strlen::Strlen;
use ttl::{Ttl, TtlUnit};
use type_::Type;
use zadd::Zadd;
use zcard::Zcard;
use zcount::Zcount;
use zincrby::ZIncrBy;
use zrange::Zrange;
use zrangebyscore::ZRangeByScore;
use zrank::Zrank;
use zrem::Zrem;
use zremrangebyrank::ZRemRangeByRank;
use zremrangebyscore::ZRemRangeByScore;
use zscore::Zscore;

/// How many arguments a command takes, not counting its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, args: usize) -> bool {
        match *self {
            Arity::Exact(n) => args == n,
            Arity::AtLeast(n) => args >= n,
        }
    }

    /// Redis' signed arity notation, which counts the name: negative means "at least".
    pub fn as_redis(&self) -> i64 {
        match *self {
            Arity::Exact(n) => n as i64 + 1,
            Arity::AtLeast(n) => -(n as i64 + 1),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub arity: Arity,
    /// Whether the command may modify the keyspace. Write commands are appended to the AOF.
    pub write: bool,
}

const fn spec(name: &'static str, arity: Arity, write: bool) -> CommandSpec {
    CommandSpec { name, arity, write }
}

use Arity::{AtLeast, Exact};

pub static COMMAND_TABLE: &[CommandSpec] = &[
    // Connection and server
    spec("ping", AtLeast(0), false),
    spec("echo", Exact(1), false),
    spec("select", Exact(1), false),
    spec("quit", AtLeast(0), false),
    spec("dbsize", Exact(0), false),
    spec("flushdb", AtLeast(0), true),
    spec("flushall", AtLeast(0), true),
    spec("command", AtLeast(0), false),
    spec("object", AtLeast(1), false),
    // Keys
    spec("del", AtLeast(1), true),
    spec("exists", AtLeast(1), false),
    spec("type", Exact(1), false),
    spec("keys", Exact(1), false),
    spec("randomkey", Exact(0), false),
    spec("expire", Exact(2), true),
    spec("pexpire", Exact(2), true),
    spec("expireat", Exact(2), true),
    spec("pexpireat", Exact(2), true),
    spec("ttl", Exact(1), false),
    spec("pttl", Exact(1), false),
    spec("persist", Exact(1), true),
    // Strings
    spec("get", Exact(1), false),
    spec("set", AtLeast(2), true),
    spec("setnx", Exact(2), true),
    spec("getdel", Exact(1), true),
    spec("mget", AtLeast(1), false),
    spec("mset", AtLeast(2), true),
    spec("incr", Exact(1), true),
    spec("decr", Exact(1), true),
    spec("incrby", Exact(2), true),
    spec("decrby", Exact(2), true),
    spec("incrbyfloat", Exact(2), true),
    spec("append", Exact(2), true),
    spec("strlen", Exact(1), false),
    // Lists
    spec("lpush", AtLeast(2), true),
    spec("rpush", AtLeast(2), true),
    spec("lpop", AtLeast(1), true),
    spec("rpop", AtLeast(1), true),
    spec("llen", Exact(1), false),
    spec("lrange", Exact(3), false),
    spec("lindex", Exact(2), false),
    spec("lset", Exact(3), true),
    spec("linsert", Exact(4), true),
    spec("lrem", Exact(3), true),
    spec("rpoplpush", Exact(2), true),
    // Hashes
    spec("hset", AtLeast(3), true),
    spec("hget", Exact(2), false),
    spec("hdel", AtLeast(2), true),
    spec("hexists", Exact(2), false),
    spec("hlen", Exact(1), false),
    spec("hgetall", Exact(1), false),
    spec("hkeys", Exact(1), false),
    spec("hvals", Exact(1), false),
    spec("hincrby", Exact(3), true),
    // Sets
    spec("sadd", AtLeast(2), true),
    spec("srem", AtLeast(2), true),
    spec("sismember", Exact(2), false),
    spec("scard", Exact(1), false),
    spec("smembers", Exact(1), false),
    spec("spop", AtLeast(1), true),
    spec("srandmember", AtLeast(1), false),
    // Sorted sets
    spec("zadd", AtLeast(3), true),
    spec("zincrby", Exact(3), true),
    spec("zscore", Exact(2), false),
    spec("zrem", AtLeast(2), true),
    spec("zcard", Exact(1), false),
    spec("zrank", Exact(2), false),
    spec("zrevrank", Exact(2), false),
    spec("zrange", AtLeast(3), false),
    spec("zrevrange", AtLeast(3), false),
    spec("zrangebyscore", AtLeast(3), false),
    spec("zcount", Exact(3), false),
    spec("zremrangebyscore", Exact(3), true),
    spec("zremrangebyrank", Exact(3), true),
];

/// Looks up a command by its lowercase name.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMAND_TABLE.iter().find(|spec| spec.name == name)
}

/// Looks up the command a request frame names, without consuming it.
pub fn lookup_frame(frame: &Frame) -> Option<&'static CommandSpec> {
    let Frame::Array(parts) = frame else {
        return None;
    };
    let name = match parts.first()? {
        Frame::Simple(name) => name.to_lowercase(),
        Frame::Bulk(bytes) => str::from_utf8(bytes).ok()?.to_lowercase(),
        _ => return None,
    };
    lookup(&name)
}

#[derive(Debug, PartialEq)]
pub enum Command {
    // Connection and server
    Command(Command_),
    DBsize(DBSize),
    Echo(Echo),
    FlushAll(FlushAll),
    FlushDb(FlushDb),
    Object(Object),
    Ping(Ping),
    Quit(Quit),
    Select(Select),

    // Keys
    Del(Del),
    Exists(Exists),
    Expire(Expire),
    Keys(Keys),
    Persist(Persist),
    RandomKey(RandomKey),
    Ttl(Ttl),
    Type(Type),

    // Strings
    Append(Append),
    Decr(Decr),
    DecrBy(DecrBy),
    Get(Get),
    Getdel(Getdel),
    Incr(Incr),
    IncrBy(IncrBy),
    IncrByFloat(IncrByFloat),
    Mget(Mget),
    Mset(Mset),
    Set(Set),
    Setnx(Setnx),
    Strlen(Strlen),

    // Lists
    Lindex(Lindex),
    Linsert(Linsert),
    Llen(Llen),
    Lrange(Lrange),
    Lrem(Lrem),
    Lset(Lset),
    Pop(Pop),
    Push(Push),
    RPopLPush(RPopLPush),

    // Hashes
    Hdel(Hdel),
    Hexists(Hexists),
    HFields(HFields),
    Hget(Hget),
    HIncrBy(HIncrBy),
    Hlen(Hlen),
    Hset(Hset),

    // Sets
    Sadd(Sadd),
    Scard(Scard),
    Sismember(Sismember),
    Smembers(Smembers),
    Spop(Spop),
    Srandmember(Srandmember),
    Srem(Srem),

    // Sorted sets
    Zadd(Zadd),
    Zcard(Zcard),
    Zcount(Zcount),
    ZIncrBy(ZIncrBy),
    Zrange(Zrange),
    ZRangeByScore(ZRangeByScore),
    Zrank(Zrank),
    Zrem(Zrem),
    ZRemRangeByRank(ZRemRangeByRank),
    ZRemRangeByScore(ZRemRangeByScore),
    Zscore(Zscore),
}

impl Executable for Command {
    fn exec(self, session: &mut Session) -> Result<Frame, Error> {
        match self {
            Command::Command(cmd) => cmd.exec(session),
            Command::DBsize(cmd) => cmd.exec(session),
            Command::Echo(cmd) => cmd.exec(session),
            Command::FlushAll(cmd) => cmd.exec(session),
            Command::FlushDb(cmd) => cmd.exec(session),
            Command::Object(cmd) => cmd.exec(session),
            Command::Ping(cmd) => cmd.exec(session),
            Command::Quit(cmd) => cmd.exec(session),
            Command::Select(cmd) => cmd.exec(session),

            Command::Del(cmd) => cmd.exec(session),
            Command::Exists(cmd) => cmd.exec(session),
            Command::Expire(cmd) => cmd.exec(session),
            Command::Keys(cmd) => cmd.exec(session),
            Command::Persist(cmd) => cmd.exec(session),
            Command::RandomKey(cmd) => cmd.exec(session),
            Command::Ttl(cmd) => cmd.exec(session),
            Command::Type(cmd) => cmd.exec(session),

            Command::Append(cmd) => cmd.exec(session),
            Command::Decr(cmd) => cmd.exec(session),
            Command::DecrBy(cmd) => cmd.exec(session),
            Command::Get(cmd) => cmd.exec(session),
            Command::Getdel(cmd) => cmd.exec(session),
            Command::Incr(cmd) => cmd.exec(session),
            Command::IncrBy(cmd) => cmd.exec(session),
            Command::IncrByFloat(cmd) => cmd.exec(session),
            Command::Mget(cmd) => cmd.exec(session),
            Command::Mset(cmd) => cmd.exec(session),
            Command::Set(cmd) => cmd.exec(session),
            Command::Setnx(cmd) => cmd.exec(session),
            Command::Strlen(cmd) => cmd.exec(session),

            Command::Lindex(cmd) => cmd.exec(session),
            Command::Linsert(cmd) => cmd.exec(session),
            Command::Llen(cmd) => cmd.exec(session),
            Command::Lrange(cmd) => cmd.exec(session),
            Command::Lrem(cmd) => cmd.exec(session),
            Command::Lset(cmd) => cmd.exec(session),
            Command::Pop(cmd) => cmd.exec(session),
            Command::Push(cmd) => cmd.exec(session),
            Command::RPopLPush(cmd) => cmd.exec(session),

            Command::Hdel(cmd) => cmd.exec(session),
            Command::Hexists(cmd) => cmd.exec(session),
            Command::HFields(cmd) => cmd.exec(session),
            Command::Hget(cmd) => cmd.exec(session),
            Command::HIncrBy(cmd) => cmd.exec(session),
            Command::Hlen(cmd) => cmd.exec(session),
            Command::Hset(cmd) => cmd.exec(session),

            Command::Sadd(cmd) => cmd.exec(session),
            Command::Scard(cmd) => cmd.exec(session),
            Command::Sismember(cmd) => cmd.exec(session),
            Command::Smembers(cmd) => cmd.exec(session),
            Command::Spop(cmd) => cmd.exec(session),
            Command::Srandmember(cmd) => cmd.exec(session),
            Command::Srem(cmd) => cmd.exec(session),

            Command::Zadd(cmd) => cmd.exec(session),
            Command::Zcard(cmd) => cmd.exec(session),
            Command::Zcount(cmd) => cmd.exec(session),
            Command::ZIncrBy(cmd) => cmd.exec(session),
            Command::Zrange(cmd) => cmd.exec(session),
            Command::ZRangeByScore(cmd) => cmd.exec(session),
            Command::Zrank(cmd) => cmd.exec(session),
            Command::Zrem(cmd) => cmd.exec(session),
            Command::ZRemRangeByRank(cmd) => cmd.exec(session),
            Command::ZRemRangeByScore(cmd) => cmd.exec(session),
            Command::Zscore(cmd) => cmd.exec(session),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = Error;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the Redis server as RESP arrays.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                }
                .into())
            }
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command_name = parser.parse_command_name()?;
        let spec = lookup(&command_name).ok_or_else(|| CommandParserError::UnknownCommand {
            command: command_name.clone(),
        })?;
        if !spec.arity.accepts(parser.remaining()) {
            return Err(CommandParserError::WrongArity {
                command: command_name,
            }
            .into());
        }

        let command = match spec.name {
            "ping" => Ping::try_from(parser).map(Command::Ping),
            "echo" => Echo::try_from(parser).map(Command::Echo),
            "select" => Select::try_from(parser).map(Command::Select),
            "quit" => Ok(Command::Quit(Quit)),
            "dbsize" => Ok(Command::DBsize(DBSize)),
            "flushdb" => FlushDb::try_from(parser).map(Command::FlushDb),
            "flushall" => FlushAll::try_from(parser).map(Command::FlushAll),
            "command" => Command_::try_from(parser).map(Command::Command),
            "object" => Object::try_from(parser).map(Command::Object),

            "del" => Del::try_from(parser).map(Command::Del),
            "exists" => Exists::try_from(parser).map(Command::Exists),
            "type" => Type::try_from(parser).map(Command::Type),
            "keys" => Keys::try_from(parser).map(Command::Keys),
            "randomkey" => Ok(Command::RandomKey(RandomKey)),
            "expire" => Expire::parse(parser, ExpireUnit::Seconds).map(Command::Expire),
            "pexpire" => Expire::parse(parser, ExpireUnit::Milliseconds).map(Command::Expire),
            "expireat" => Expire::parse(parser, ExpireUnit::UnixSeconds).map(Command::Expire),
            "pexpireat" => {
                Expire::parse(parser, ExpireUnit::UnixMilliseconds).map(Command::Expire)
            }
            "ttl" => Ttl::parse(parser, TtlUnit::Seconds).map(Command::Ttl),
            "pttl" => Ttl::parse(parser, TtlUnit::Milliseconds).map(Command::Ttl),
            "persist" => Persist::try_from(parser).map(Command::Persist),

            "get" => Get::try_from(parser).map(Command::Get),
            "set" => Set::try_from(parser).map(Command::Set),
            "setnx" => Setnx::try_from(parser).map(Command::Setnx),
            "getdel" => Getdel::try_from(parser).map(Command::Getdel),
            "mget" => Mget::try_from(parser).map(Command::Mget),
            "mset" => Mset::try_from(parser).map(Command::Mset),
            "incr" => Incr::try_from(parser).map(Command::Incr),
            "decr" => Decr::try_from(parser).map(Command::Decr),
            "incrby" => IncrBy::try_from(parser).map(Command::IncrBy),
            "decrby" => DecrBy::try_from(parser).map(Command::DecrBy),
            "incrbyfloat" => IncrByFloat::try_from(parser).map(Command::IncrByFloat),
            "append" => Append::try_from(parser).map(Command::Append),
            "strlen" => Strlen::try_from(parser).map(Command::Strlen),

            "lpush" => Push::parse(parser, ListEnd::Left).map(Command::Push),
            "rpush" => Push::parse(parser, ListEnd::Right).map(Command::Push),
            "lpop" => Pop::parse(parser, ListEnd::Left).map(Command::Pop),
            "rpop" => Pop::parse(parser, ListEnd::Right).map(Command::Pop),
            "llen" => Llen::try_from(parser).map(Command::Llen),
            "lrange" => Lrange::try_from(parser).map(Command::Lrange),
            "lindex" => Lindex::try_from(parser).map(Command::Lindex),
            "lset" => Lset::try_from(parser).map(Command::Lset),
            "linsert" => Linsert::try_from(parser).map(Command::Linsert),
            "lrem" => Lrem::try_from(parser).map(Command::Lrem),
            "rpoplpush" => RPopLPush::try_from(parser).map(Command::RPopLPush),

            "hset" => Hset::try_from(parser).map(Command::Hset),
            "hget" => Hget::try_from(parser).map(Command::Hget),
            "hdel" => Hdel::try_from(parser).map(Command::Hdel),
            "hexists" => Hexists::try_from(parser).map(Command::Hexists),
            "hlen" => Hlen::try_from(parser).map(Command::Hlen),
            "hgetall" => HFields::parse(parser, HashPart::Both).map(Command::HFields),
            "hkeys" => HFields::parse(parser, HashPart::Keys).map(Command::HFields),
            "hvals" => HFields::parse(parser, HashPart::Values).map(Command::HFields),
            "hincrby" => HIncrBy::try_from(parser).map(Command::HIncrBy),

            "sadd" => Sadd::try_from(parser).map(Command::Sadd),
            "srem" => Srem::try_from(parser).map(Command::Srem),
            "sismember" => Sismember::try_from(parser).map(Command::Sismember),
            "scard" => Scard::try_from(parser).map(Command::Scard),
            "smembers" => Smembers::try_from(parser).map(Command::Smembers),
            "spop" => Spop::try_from(parser).map(Command::Spop),
            "srandmember" => Srandmember::try_from(parser).map(Command::Srandmember),

            "zadd" => Zadd::try_from(parser).map(Command::Zadd),
            "zincrby" => ZIncrBy::try_from(parser).map(Command::ZIncrBy),
            "zscore" => Zscore::try_from(parser).map(Command::Zscore),
            "zrem" => Zrem::try_from(parser).map(Command::Zrem),
            "zcard" => Zcard::try_from(parser).map(Command::Zcard),
            "zrank" => Zrank::parse(parser, false).map(Command::Zrank),
            "zrevrank" => Zrank::parse(parser, true).map(Command::Zrank),
            "zrange" => Zrange::parse(parser, false).map(Command::Zrange),
            "zrevrange" => Zrange::parse(parser, true).map(Command::Zrange),
            "zrangebyscore" => ZRangeByScore::try_from(parser).map(Command::ZRangeByScore),
            "zcount" => Zcount::try_from(parser).map(Command::Zcount),
            "zremrangebyscore" => {
                ZRemRangeByScore::try_from(parser).map(Command::ZRemRangeByScore)
            }
            "zremrangebyrank" => ZRemRangeByRank::try_from(parser).map(Command::ZRemRangeByRank),

            _ => Err(CommandParserError::UnknownCommand {
                command: command_name,
            }
            .into()),
        }?;

        Ok(command)
    }
}

struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match command_name {
            Frame::Simple(s) => Ok(s.to_lowercase()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Arguments not consumed yet.
    fn remaining(&self) -> usize {
        self.parts.len()
    }

    fn has_next(&self) -> bool {
        self.remaining() > 0
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Next argument as a lowercase keyword, for option names.
    fn next_keyword(&mut self) -> Result<String, CommandParserError> {
        self.next_string().map(|s| s.to_lowercase())
    }

    fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(string) => string
                .parse::<i64>()
                .map_err(|_| CommandParserError::NotInteger),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map_err(|_| CommandParserError::NotInteger)?
                .parse::<i64>()
                .map_err(|_| CommandParserError::NotInteger),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }

    /// Next argument as a float. `inf`/`-inf` are accepted, NaN is not.
    fn next_float(&mut self) -> Result<f64, CommandParserError> {
        let string = self
            .next_string()
            .map_err(|_| CommandParserError::NotFloat)?;
        parse_float(&string).ok_or(CommandParserError::NotFloat)
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self
            .parts
            .next()
            .ok_or_else(|| CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Every remaining argument as a string.
    fn rest_strings(&mut self) -> Result<Vec<String>, CommandParserError> {
        let mut strings = Vec::with_capacity(self.remaining());
        while self.has_next() {
            strings.push(self.next_string()?);
        }
        Ok(strings)
    }

    /// Fails when arguments are left over.
    fn finish(&self) -> Result<(), CommandParserError> {
        if self.has_next() {
            return Err(CommandParserError::Syntax);
        }
        Ok(())
    }
}

/// Parses a float the way Redis reads scores and increments.
pub(crate) fn parse_float(string: &str) -> Option<f64> {
    let value = match string.to_lowercase().as_str() {
        "inf" | "+inf" => f64::INFINITY,
        "-inf" => f64::NEG_INFINITY,
        other => other.parse::<f64>().ok()?,
    };
    (!value.is_nan()).then_some(value)
}

#[derive(Debug, ThisError, PartialEq)]
pub(crate) enum CommandParserError {
    #[error("ERR Protocol error: expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("ERR unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("ERR unknown subcommand '{subcommand}'. Try {command} HELP.")]
    UnknownSubcommand { command: String, subcommand: String },
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongArity { command: String },
    #[error("ERR syntax error")]
    Syntax,
    #[error("ERR value is not an integer or out of range")]
    NotInteger,
    #[error("ERR value is not a valid float")]
    NotFloat,
    #[error("ERR value is out of range, must be positive")]
    NotPositive,
    #[error("ERR min or max is not a float")]
    InvalidScoreRange,
    #[error("ERR invalid expire time in '{command}' command")]
    InvalidExpireTime { command: String },
    #[error("ERR {0}")]
    IncompatibleOptions(&'static str),
    #[error("ERR invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("ERR unexpected end of arguments")]
    EndOfStream,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::store::Store;

    pub fn session() -> Session {
        Session::new(Store::new(16))
    }

    pub fn request(args: &[&str]) -> Frame {
        Frame::Array(args.iter().map(|arg| bulk(arg)).collect())
    }

    pub fn bulk(arg: &str) -> Frame {
        Frame::Bulk(Bytes::copy_from_slice(arg.as_bytes()))
    }

    /// Parses and runs one request, turning a parse failure into the reply a client would see.
    pub fn run(session: &mut Session, args: &[&str]) -> Frame {
        match Command::try_from(request(args)) {
            Ok(cmd) => cmd.exec(session).unwrap(),
            Err(err) => Frame::Error(err.to_string()),
        }
    }
}
