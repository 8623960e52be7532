// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

pub(crate) static CRLF: &[u8; 2] = b"\r\n";

// Pre-encoded replies for the two integers nearly every counting command returns.
static INTEGER_ZERO: &[u8] = b":0\r\n";
static INTEGER_ONE: &[u8] = b":1\r\n";
static NULL_BULK: &[u8] = b"$-1\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    /// Invalid message encoding.
    #[error("{0}")]
    Other(crate::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

/// How an empty array reply is put on the wire.
///
/// Redis answers an empty list or set with `*0\r\n`. Some deployments of the server this one
/// replaces reported an error instead, so the behavior is selectable at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EmptyCollection {
    #[default]
    Array,
    Error,
}

pub const EMPTY_COLLECTION_ERROR: &str = "ERR empty collection";

// Protocol specification: https://redis.io/docs/reference/protocol-spec/
impl Frame {
    pub fn ok() -> Frame {
        Frame::Simple("OK".to_string())
    }

    /// Builds an array out of alternating key/value elements.
    pub fn from_pairs<K, V, I>(pairs: I) -> Frame
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Frame>,
        V: Into<Frame>,
    {
        let mut frames = vec![];
        for (key, value) in pairs {
            frames.push(key.into());
            frames.push(value.into());
        }
        Frame::Array(frames)
    }

    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its type.
        // Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes)?;
                Ok(Frame::Simple(string))
            }
            DataType::SimpleError => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes)?;
                Ok(Frame::Error(string))
            }
            DataType::Integer => {
                let integer = get_decimal(src)?;
                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => {
                let length = get_decimal(src)?;
                if length == -1 {
                    return Ok(Frame::Null);
                }
                let length = usize::try_from(length)
                    .map_err(|_| Error::from("protocol error; invalid bulk length"))?;

                let data = get_exact(src, length)?;
                Ok(Frame::Bulk(Bytes::copy_from_slice(data)))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                let length = get_decimal(src)?;
                if length == -1 {
                    return Ok(Frame::Null);
                }
                let length = usize::try_from(length)
                    .map_err(|_| Error::from("protocol error; invalid multibulk length"))?;

                let mut frames = Vec::with_capacity(length.min(1024));
                for _ in 0..length {
                    let frame = Self::parse(src)?;
                    frames.push(frame);
                }

                Ok(Frame::Array(frames))
            }
        }
    }

    /// Appends the wire form of the frame to `dst`.
    pub fn write_to(&self, dst: &mut BytesMut, empty: EmptyCollection) {
        match self {
            Frame::Simple(s) => {
                dst.put_u8(u8::from(DataType::SimpleString));
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            Frame::Error(s) => {
                dst.put_u8(u8::from(DataType::SimpleError));
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            Frame::Integer(0) => dst.extend_from_slice(INTEGER_ZERO),
            Frame::Integer(1) => dst.extend_from_slice(INTEGER_ONE),
            Frame::Integer(i) => {
                dst.put_u8(u8::from(DataType::Integer));
                dst.extend_from_slice(i.to_string().as_bytes());
                dst.extend_from_slice(CRLF);
            }
            Frame::Bulk(bytes) => {
                dst.reserve(bytes.len() + 16);
                dst.put_u8(u8::from(DataType::BulkString));
                dst.extend_from_slice(bytes.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                dst.extend_from_slice(bytes);
                dst.extend_from_slice(CRLF);
            }
            Frame::Null => dst.extend_from_slice(NULL_BULK),
            Frame::Array(arr) if arr.is_empty() && empty == EmptyCollection::Error => {
                Frame::Error(EMPTY_COLLECTION_ERROR.to_string()).write_to(dst, empty);
            }
            Frame::Array(arr) => {
                dst.put_u8(u8::from(DataType::Array));
                dst.extend_from_slice(arr.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                for frame in arr {
                    frame.write_to(dst, empty);
                }
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut dst = BytesMut::new();
        self.write_to(&mut dst, EmptyCollection::default());
        dst.to_vec()
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl From<()> for Frame {
    fn from(_: ()) -> Self {
        Frame::Null
    }
}

impl From<bool> for Frame {
    fn from(value: bool) -> Self {
        Frame::Integer(i64::from(value))
    }
}

macro_rules! integer_frame {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Frame {
                fn from(value: $ty) -> Self {
                    // Values beyond i64 cannot be represented as a RESP integer.
                    match i64::try_from(value) {
                        Ok(i) => Frame::Integer(i),
                        Err(_) => Frame::Bulk(Bytes::from(value.to_string())),
                    }
                }
            }
        )*
    };
}

integer_frame!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Frame {
    fn from(value: f64) -> Self {
        Frame::Bulk(Bytes::from(format_float(value)))
    }
}

impl From<f32> for Frame {
    fn from(value: f32) -> Self {
        Frame::from(f64::from(value))
    }
}

impl From<String> for Frame {
    fn from(value: String) -> Self {
        Frame::Bulk(Bytes::from(value))
    }
}

impl From<&str> for Frame {
    fn from(value: &str) -> Self {
        Frame::Bulk(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<Bytes> for Frame {
    fn from(value: Bytes) -> Self {
        Frame::Bulk(value)
    }
}

impl From<&[u8]> for Frame {
    fn from(value: &[u8]) -> Self {
        Frame::Bulk(Bytes::copy_from_slice(value))
    }
}

impl<T: Into<Frame>> From<Option<T>> for Frame {
    fn from(value: Option<T>) -> Self {
        value.map_or(Frame::Null, Into::into)
    }
}

impl<T: Into<Frame>> From<Vec<T>> for Frame {
    fn from(values: Vec<T>) -> Self {
        Frame::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Formats a score the way Redis prints doubles: integral values without a fraction, infinities
/// as `inf`/`-inf`.
pub fn format_float(value: f64) -> String {
    if value.is_infinite() && value > 0.0 {
        "inf".to_string()
    } else if value.is_infinite() {
        "-inf".to_string()
    } else if value != 0.0 && !(1e-5..1e17).contains(&value.abs()) {
        // Exponent form like `1e+300` or `2.5e-07` instead of hundreds of digits.
        let formatted = format!("{:e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        }
    } else {
        value.to_string()
    }
}

// Human-readable form used in error messages. Bulk payloads are shown lossily as text.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}\r\n", arr.len())?;
                for frame in arr {
                    write!(f, "{}\r\n", frame)?;
                }
                Ok(())
            }
        }
    }
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = src.get_ref();

    let end = buf[start..]
        .windows(2)
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((end + CRLF.len()) as u64);

    Ok(&buf[start..end])
}

fn get_decimal(src: &mut Cursor<&[u8]>) -> Result<i64, Error> {
    let line = get_line(src)?;
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| "protocol error; invalid frame format".into())
}

fn get_exact<'a>(src: &mut Cursor<&'a [u8]>, len: usize) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = src.get_ref();

    if buf.len() < start + len + CRLF.len() {
        return Err(Error::Incomplete);
    }
    if &buf[start + len..start + len + CRLF.len()] != CRLF {
        return Err("protocol error; bulk string is not terminated by CRLF".into());
    }

    src.set_position((start + len + CRLF.len()) as u64);
    Ok(&buf[start..start + len])
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        "protocol error; invalid frame format".into()
    }
}

impl From<&str> for Error {
    fn from(src: &str) -> Error {
        src.to_string().into()
    }
}

impl From<String> for Error {
    fn from(src: String) -> Error {
        Error::Other(src.into())
    }
}
