use bytes::{Bytes, BytesMut};
use std::io;
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{EmptyCollection, Frame, CRLF};

/// Longest inline request accepted before a line terminator shows up.
pub const MAX_INLINE_SIZE: usize = 64 * 1024;
/// Largest bulk string a client may send.
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;
/// Largest argument count a client may send in one multi-bulk request.
pub const MAX_MULTIBULK_LEN: usize = 1024 * 1024;

#[derive(Debug, ThisError)]
pub enum ProtocolError {
    #[error("ERR Protocol error: invalid multibulk length")]
    InvalidMultibulkLength,
    #[error("ERR Protocol error: invalid bulk length")]
    InvalidBulkLength,
    #[error("ERR Protocol error: expected '$', got '{0}'")]
    ExpectedBulk(char),
    #[error("ERR Protocol error: bulk string is not terminated by CRLF")]
    MissingCrlf,
    #[error("ERR Protocol error: too big inline request")]
    TooBigInline,
    #[error("ERR Protocol error: too big mbulk count string")]
    TooBigMultibulkCount,
    #[error("ERR Protocol error: too big bulk count string")]
    TooBigBulkCount,
    #[error("ERR Protocol error: unbalanced quotes in request")]
    UnbalancedQuotes,
    #[error("ERR Protocol error: request exceeds {0} bytes")]
    FrameTooLarge(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A multi-bulk request whose header has been read but whose arguments are not all buffered
/// yet. Offsets are relative to the start of the read buffer, which is left untouched until the
/// whole request is available.
#[derive(Debug)]
struct PendingRequest {
    expected: usize,
    // (start, len) of every bulk payload seen so far.
    args: Vec<(usize, usize)>,
    // Where the next `$<len>` header starts.
    offset: usize,
}

/// Frames client requests out of a byte stream and serializes replies into it.
///
/// Requests are either RESP multi-bulk arrays of bulk strings or inline commands. Both decode to
/// a `Frame::Array` of `Frame::Bulk` arguments; nothing is surfaced until a request is complete.
#[derive(Debug)]
pub struct FrameCodec {
    max_frame_size: usize,
    empty_collection: EmptyCollection,
    pending: Option<PendingRequest>,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize, empty_collection: EmptyCollection) -> FrameCodec {
        FrameCodec {
            max_frame_size,
            empty_collection,
            pending: None,
        }
    }

    fn decode_multibulk(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        let mut pending = match self.pending.take() {
            Some(pending) => pending,
            None => {
                let Some((line, next)) = peek_line(src, 0) else {
                    self.check_unterminated(src, 0, ProtocolError::TooBigMultibulkCount)?;
                    return Ok(None);
                };
                let expected = parse_length(&line[1..])
                    .filter(|len| *len <= MAX_MULTIBULK_LEN as i64)
                    .ok_or(ProtocolError::InvalidMultibulkLength)?;

                if expected <= 0 {
                    // `*0` and `*-1` carry no command, they are skipped like empty lines.
                    let _ = src.split_to(next);
                    return Ok(Some(Frame::Array(vec![])));
                }

                PendingRequest {
                    expected: expected as usize,
                    args: Vec::with_capacity((expected as usize).min(1024)),
                    offset: next,
                }
            }
        };

        while pending.args.len() < pending.expected {
            let Some((line, data_start)) = peek_line(src, pending.offset) else {
                self.check_unterminated(src, pending.offset, ProtocolError::TooBigBulkCount)?;
                return self.suspend(src, pending, 0);
            };
            match line.first() {
                Some(b'$') => {}
                other => return Err(ProtocolError::ExpectedBulk(other.map_or(' ', |b| *b as char))),
            }
            let len = parse_length(&line[1..])
                .filter(|len| (0..=MAX_BULK_SIZE as i64).contains(len))
                .ok_or(ProtocolError::InvalidBulkLength)? as usize;

            match peek_bytes(src, data_start + len, CRLF.len()) {
                None => return self.suspend(src, pending, data_start + len + CRLF.len()),
                Some(terminator) if terminator != CRLF => return Err(ProtocolError::MissingCrlf),
                Some(_) => {}
            }

            pending.args.push((data_start, len));
            pending.offset = data_start + len + CRLF.len();
        }

        let request = src.split_to(pending.offset).freeze();
        let args = pending
            .args
            .into_iter()
            .map(|(start, len)| Frame::Bulk(request.slice(start..start + len)))
            .collect();

        Ok(Some(Frame::Array(args)))
    }

    /// Rejects a length header starting at `offset` that has grown past any sane size without a
    /// line terminator.
    fn check_unterminated(
        &self,
        src: &BytesMut,
        offset: usize,
        too_big: ProtocolError,
    ) -> Result<(), ProtocolError> {
        if src.len() > self.max_frame_size {
            return Err(ProtocolError::FrameTooLarge(self.max_frame_size));
        }
        if src.len() - offset > MAX_INLINE_SIZE {
            return Err(too_big);
        }
        Ok(())
    }

    /// Parks a partially received request until more bytes arrive, making room for the bytes
    /// the next step is known to need.
    fn suspend(
        &mut self,
        src: &mut BytesMut,
        pending: PendingRequest,
        needed: usize,
    ) -> Result<Option<Frame>, ProtocolError> {
        if src.len() > self.max_frame_size {
            return Err(ProtocolError::FrameTooLarge(self.max_frame_size));
        }
        if needed > src.len() {
            src.reserve(needed - src.len());
        }
        self.pending = Some(pending);
        Ok(None)
    }

    fn decode_inline(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        let Some(newline) = src.iter().position(|b| *b == b'\n') else {
            if src.len() > MAX_INLINE_SIZE {
                return Err(ProtocolError::TooBigInline);
            }
            return Ok(None);
        };

        let line = src.split_to(newline + 1).freeze();
        let line = line.slice(..newline);
        let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);

        let args = split_inline(line)?
            .into_iter()
            .map(|arg| Frame::Bulk(Bytes::from(arg)))
            .collect();

        Ok(Some(Frame::Array(args)))
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        FrameCodec::new(MAX_BULK_SIZE, EmptyCollection::default())
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.is_empty() {
                return Ok(None);
            }

            let frame = if self.pending.is_some() || src[0] == b'*' {
                self.decode_multibulk(src)?
            } else {
                self.decode_inline(src)?
            };

            match frame {
                // Empty requests are not surfaced, keep going with whatever follows.
                Some(Frame::Array(args)) if args.is_empty() => continue,
                frame => return Ok(frame),
            }
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        frame.write_to(dst, self.empty_collection);
        Ok(())
    }
}

/// Returns the line starting at `offset` without its CRLF, plus the offset right after the CRLF.
/// `None` means the line is not fully buffered yet.
pub fn peek_line(src: &[u8], offset: usize) -> Option<(&[u8], usize)> {
    let rest = src.get(offset..)?;
    let end = rest.windows(2).position(|window| window == CRLF)?;
    Some((&rest[..end], offset + end + CRLF.len()))
}

/// Returns `n` bytes starting at `offset`, or `None` when they are not buffered yet.
pub fn peek_bytes(src: &[u8], offset: usize, n: usize) -> Option<&[u8]> {
    src.get(offset..offset.checked_add(n)?)
}

fn parse_length(digits: &[u8]) -> Option<i64> {
    std::str::from_utf8(digits).ok()?.parse::<i64>().ok()
}

/// Splits an inline request on whitespace, honoring double and single quoted arguments.
fn split_inline(line: &[u8]) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let mut args = vec![];
    let mut bytes = line.iter().copied().peekable();

    loop {
        while bytes.next_if(|b| b.is_ascii_whitespace()).is_some() {}
        let Some(first) = bytes.peek().copied() else {
            return Ok(args);
        };

        let mut arg = vec![];
        if first == b'"' || first == b'\'' {
            bytes.next();
            let mut closed = false;
            while let Some(b) = bytes.next() {
                match b {
                    b'\\' if first == b'"' => match bytes.next() {
                        Some(b'n') => arg.push(b'\n'),
                        Some(b'r') => arg.push(b'\r'),
                        Some(b't') => arg.push(b'\t'),
                        Some(other) => arg.push(other),
                        None => break,
                    },
                    b if b == first => {
                        closed = true;
                        break;
                    }
                    b => arg.push(b),
                }
            }
            if !closed || bytes.peek().is_some_and(|b| !b.is_ascii_whitespace()) {
                return Err(ProtocolError::UnbalancedQuotes);
            }
        } else {
            while let Some(b) = bytes.next_if(|b| !b.is_ascii_whitespace()) {
                arg.push(b);
            }
        }
        args.push(arg);
    }
}
