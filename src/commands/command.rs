use crate::commands::executable::{Executable, Session};
use crate::commands::{lookup, CommandParser, CommandParserError, CommandSpec, COMMAND_TABLE};
use crate::frame::Frame;
use crate::Error;

/// Introspection of the command table.
///
/// `COMMAND` lists every command, `COMMAND COUNT` counts them, `COMMAND INFO name...` describes
/// the named ones and `COMMAND DOCS` answers with no documentation.
///
/// Ref: <https://redis.io/docs/latest/commands/command>
#[derive(Debug, PartialEq)]
pub enum Command {
    List,
    Count,
    Info(Vec<String>),
    Docs,
}

impl Executable for Command {
    fn exec(self, _session: &mut Session) -> Result<Frame, Error> {
        let res = match self {
            Command::List => Frame::Array(COMMAND_TABLE.iter().map(describe).collect()),
            Command::Count => Frame::from(COMMAND_TABLE.len()),
            Command::Info(names) => Frame::Array(
                names
                    .iter()
                    .map(|name| lookup(&name.to_lowercase()).map_or(Frame::Null, describe))
                    .collect(),
            ),
            Command::Docs => Frame::Array(vec![]),
        };

        Ok(res)
    }
}

/// `[name, arity, [flags], first key, last key, step]`, the layout Redis clients expect.
fn describe(spec: &CommandSpec) -> Frame {
    let flag = if spec.write { "write" } else { "readonly" };
    let takes_key = !matches!(
        spec.name,
        "ping" | "echo" | "select" | "quit" | "dbsize" | "flushdb" | "flushall" | "command"
            | "randomkey"
    );
    let (first, last) = if takes_key { (1, 1) } else { (0, 0) };

    Frame::Array(vec![
        Frame::Bulk(spec.name.into()),
        Frame::Integer(spec.arity.as_redis()),
        Frame::Array(vec![Frame::Simple(flag.to_string())]),
        Frame::Integer(first),
        Frame::Integer(last),
        Frame::Integer(first),
    ])
}

impl TryFrom<&mut CommandParser> for Command {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if !parser.has_next() {
            return Ok(Command::List);
        }

        let sub_command = parser.next_keyword()?;
        let cmd = match sub_command.as_str() {
            "count" => Command::Count,
            "docs" => {
                // Names are accepted but no documentation is kept.
                parser.rest_strings()?;
                Command::Docs
            }
            "info" => Command::Info(parser.rest_strings()?),
            _ => {
                return Err(CommandParserError::UnknownSubcommand {
                    command: "COMMAND".to_string(),
                    subcommand: sub_command,
                }
                .into())
            }
        };
        parser.finish()?;

        Ok(cmd)
    }
}
