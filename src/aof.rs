//! Append-only file.
//!
//! Every successful mutation is logged as the RESP multi-bulk request that reproduces it, so the
//! file is replayed through the same codec and command table clients use. Records whose effect
//! depends on the clock or on randomness are rewritten into deterministic equivalents first:
//!
//! * `EXPIRE`/`PEXPIRE`/`EXPIREAT`/`PEXPIREAT` become `PEXPIREAT key <unix ms>` (or `DEL` when
//!   the deadline had already passed).
//! * `SET ... EX|PX|EXAT|PXAT` becomes `SET key value PXAT <unix ms>`.
//! * `SPOP` becomes `SREM` of the members that were actually popped.

use bytes::{Bytes, BytesMut};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tokio_util::codec::Decoder;
use tracing::{info, warn};

use crate::codec::{FrameCodec, ProtocolError};
use crate::commands::executable::{Executable, Session};
use crate::commands::Command;
use crate::frame::{EmptyCollection, Frame};
use crate::store::{Db, Store};

#[derive(Debug, ThisError)]
pub enum AofError {
    #[error("append-only file io error: {0}")]
    Io(#[from] io::Error),
    #[error("append-only file is corrupt after {offset} bytes: {source}")]
    Corrupt {
        offset: usize,
        #[source]
        source: ProtocolError,
    },
    #[error("append-only file record {index} cannot be replayed: {message}")]
    Replay { index: usize, message: String },
}

/// When appended records are forced to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FsyncPolicy {
    /// fsync after every record.
    Always,
    /// fsync from a once-per-second background tick.
    #[default]
    #[value(name = "everysec")]
    EverySec,
    /// Leave it to the operating system.
    No,
}

/// Buffered writer appending records to the AOF.
#[derive(Debug)]
pub struct AofWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    policy: FsyncPolicy,
    // Database the last record was written against.
    db: Option<usize>,
    // Records handed to the OS but not fsynced yet.
    dirty: bool,
}

impl AofWriter {
    /// Opens (or creates) the AOF for appending.
    pub fn open(path: impl Into<PathBuf>, policy: FsyncPolicy) -> Result<Self, AofError> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            policy,
            db: None,
            dirty: false,
        })
    }

    /// Appends one request executed against database `db`.
    pub fn append(&mut self, db: usize, argv: &[Bytes]) -> Result<(), AofError> {
        let mut buf = BytesMut::new();
        if self.db != Some(db) {
            let select = vec![Bytes::from_static(b"SELECT"), Bytes::from(db.to_string())];
            encode(&select, &mut buf);
            self.db = Some(db);
        }
        encode(argv, &mut buf);

        self.writer.write_all(&buf)?;
        self.writer.flush()?;
        self.dirty = true;

        if self.policy == FsyncPolicy::Always {
            self.sync()?;
        }
        Ok(())
    }

    /// Flushes and fsyncs pending records.
    pub fn sync(&mut self) -> Result<(), AofError> {
        self.writer.flush()?;
        if self.dirty {
            self.writer.get_ref().sync_data()?;
            self.dirty = false;
        }
        Ok(())
    }

    pub fn policy(&self) -> FsyncPolicy {
        self.policy
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn encode(argv: &[Bytes], dst: &mut BytesMut) {
    let frame = Frame::Array(argv.iter().cloned().map(Frame::Bulk).collect());
    frame.write_to(dst, EmptyCollection::Array);
}

/// The arguments of a request frame, command name included.
pub fn argv(frame: &Frame) -> Option<Vec<Bytes>> {
    let Frame::Array(parts) = frame else {
        return None;
    };
    parts
        .iter()
        .map(|part| match part {
            Frame::Bulk(bytes) => Some(bytes.clone()),
            Frame::Simple(string) => Some(Bytes::from(string.clone())),
            _ => None,
        })
        .collect()
}

/// The records that reproduce a write request which answered `response`, as seen in `db` right
/// after it ran.
pub fn records(argv: Vec<Bytes>, response: &Frame, db: &Db) -> Vec<Vec<Bytes>> {
    if matches!(response, Frame::Error(_)) {
        return vec![];
    }
    let Some(name) = argv.first().map(|name| name.to_ascii_lowercase()) else {
        return vec![];
    };

    match name.as_slice() {
        b"expire" | b"pexpire" | b"expireat" | b"pexpireat" => {
            if *response != Frame::Integer(1) {
                return vec![];
            }
            vec![deadline_record(&argv[1], db)]
        }
        b"set" => {
            if *response == Frame::Null {
                return vec![];
            }
            let has_expiry = argv[3..].iter().any(|arg| {
                matches!(
                    arg.to_ascii_lowercase().as_slice(),
                    b"ex" | b"px" | b"exat" | b"pxat"
                )
            });
            if !has_expiry {
                return vec![argv];
            }
            let mut record = vec![Bytes::from_static(b"SET"), argv[1].clone(), argv[2].clone()];
            match expires_at(&argv[1], db) {
                Some(at) => {
                    record.push(Bytes::from_static(b"PXAT"));
                    record.push(Bytes::from(at.to_string()));
                    vec![record]
                }
                // Already expired: the write amounts to deleting the key.
                None => vec![vec![Bytes::from_static(b"DEL"), argv[1].clone()]],
            }
        }
        b"spop" => {
            let members = match response {
                Frame::Bulk(member) => vec![member.clone()],
                Frame::Array(members) => members
                    .iter()
                    .filter_map(|member| match member {
                        Frame::Bulk(member) => Some(member.clone()),
                        _ => None,
                    })
                    .collect(),
                _ => vec![],
            };
            if members.is_empty() {
                return vec![];
            }
            let mut record = vec![Bytes::from_static(b"SREM"), argv[1].clone()];
            record.extend(members);
            vec![record]
        }
        _ => vec![argv],
    }
}

fn expires_at(key: &Bytes, db: &Db) -> Option<u64> {
    let key = std::str::from_utf8(key).ok()?;
    db.get(key)?.expires_at()
}

fn deadline_record(key: &Bytes, db: &Db) -> Vec<Bytes> {
    match expires_at(key, db) {
        Some(at) => vec![
            Bytes::from_static(b"PEXPIREAT"),
            key.clone(),
            Bytes::from(at.to_string()),
        ],
        None => vec![Bytes::from_static(b"DEL"), key.clone()],
    }
}

/// Replays the AOF at `path` into `store`. A missing file replays nothing. A record cut short by
/// a crash is dropped, and the file is truncated back to the last complete record.
///
/// Returns the number of records replayed.
pub fn replay(path: &Path, store: &Store) -> Result<usize, AofError> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };
    let total = contents.len();

    let mut buf = BytesMut::from(&contents[..]);
    let mut codec = FrameCodec::default();
    let mut session = Session::new(store.clone());
    let mut replayed = 0;

    loop {
        let frame = match codec.decode(&mut buf) {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(source) => {
                return Err(AofError::Corrupt {
                    offset: total - buf.len(),
                    source,
                })
            }
        };

        let replay_error = |message: String| AofError::Replay {
            index: replayed,
            message,
        };
        let command = Command::try_from(frame).map_err(|err| replay_error(err.to_string()))?;
        let response = command
            .exec(&mut session)
            .map_err(|err| replay_error(err.to_string()))?;
        if let Frame::Error(message) = response {
            warn!("Replayed record {} answered an error: {}", replayed, message);
        }
        replayed += 1;
    }

    if !buf.is_empty() {
        let valid = total - buf.len();
        warn!(
            "Ignoring {} bytes of truncated data at the end of {}",
            buf.len(),
            path.display()
        );
        OpenOptions::new()
            .write(true)
            .open(path)?
            .set_len(valid as u64)?;
    }

    info!("Replayed {} records from {}", replayed, path.display());
    Ok(replayed)
}
