//! TWS socket framing.
//!
//! After the `API\0` preamble every message is a 4-byte big-endian length
//! followed by NUL-terminated text fields.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Preamble written once before the version negotiation frame.
pub const API_PREAMBLE: &[u8] = b"API\0";

/// Lowest client protocol version offered during negotiation.
pub const MIN_CLIENT_VERSION: i32 = 100;

/// Highest client protocol version offered; message layouts in
/// [`super::messages`] are written against this version.
pub const MAX_CLIENT_VERSION: i32 = 151;

/// TWS refuses frames above this size.
pub const MAX_FRAME_LEN: usize = 0x00FF_FFFF;

/// Wire-level failure.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("gateway i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    #[error("message is missing field {index}")]
    MissingField { index: usize },

    #[error("field {index} ('{value}') is not a valid {expected}")]
    InvalidField {
        index: usize,
        value: String,
        expected: &'static str,
    },
}

/// Preamble plus the length-prefixed `v<min>..<max>` version range.
pub fn handshake_bytes() -> Vec<u8> {
    let range = format!("v{MIN_CLIENT_VERSION}..{MAX_CLIENT_VERSION}");
    let mut bytes = Vec::with_capacity(API_PREAMBLE.len() + 4 + range.len());
    bytes.extend_from_slice(API_PREAMBLE);
    bytes.extend_from_slice(&(range.len() as u32).to_be_bytes());
    bytes.extend_from_slice(range.as_bytes());
    bytes
}

/// Frame already-rendered fields.
pub fn frame_fields<I, S>(fields: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = FieldWriter::new();
    for field in fields {
        writer.push_str(field.as_ref());
    }
    writer.into_frame()
}

/// Builds the payload of one outbound message.
#[derive(Debug, Default)]
pub struct FieldWriter {
    payload: Vec<u8>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, value: &str) -> &mut Self {
        self.payload.extend_from_slice(value.as_bytes());
        self.payload.push(0);
        self
    }

    pub fn push_int(&mut self, value: i64) -> &mut Self {
        self.push_str(&value.to_string())
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.push_str(if value { "1" } else { "0" })
    }

    pub fn push_f64(&mut self, value: f64) -> &mut Self {
        self.push_str(&value.to_string())
    }

    /// Unset doubles travel as empty fields.
    pub fn push_opt_f64(&mut self, value: Option<f64>) -> &mut Self {
        match value {
            Some(value) => self.push_f64(value),
            None => self.push_str(""),
        }
    }

    pub fn push_empty(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.push_str("");
        }
        self
    }

    pub fn into_frame(self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.payload.len() + 4);
        frame.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(&self.payload);
        frame
    }
}

/// Read one frame payload. Returns `Ok(None)` when the peer closed the
/// connection cleanly between frames.
///
/// A stream that ends partway through the header or payload is an
/// `UnexpectedEof` I/O error, not a clean close.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0_u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let read = reader.read(&mut header[filled..]).await?;
        if read == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("connection closed after {filled} of 4 header bytes"),
            )
            .into());
        }
        filled += read;
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut payload = vec![0_u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

/// Split a payload into its text fields, dropping the terminator's empty tail.
pub fn split_fields(payload: &[u8]) -> Vec<String> {
    let body = payload.strip_suffix(&[0_u8]).unwrap_or(payload);
    if body.is_empty() {
        return Vec::new();
    }
    body.split(|byte| *byte == 0)
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Sequential typed access to decoded fields.
#[derive(Debug)]
pub struct FieldReader<'a> {
    fields: &'a [String],
    position: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a [String]) -> Self {
        Self {
            fields,
            position: 0,
        }
    }

    pub fn next_str(&mut self) -> Result<&'a str, WireError> {
        let index = self.position;
        let value = self
            .fields
            .get(index)
            .ok_or(WireError::MissingField { index })?;
        self.position += 1;
        Ok(value.as_str())
    }

    pub fn next_string(&mut self) -> Result<String, WireError> {
        self.next_str().map(str::to_owned)
    }

    pub fn next_i32(&mut self) -> Result<i32, WireError> {
        self.next_parsed("integer")
    }

    pub fn next_i64(&mut self) -> Result<i64, WireError> {
        self.next_parsed("integer")
    }

    /// Doubles and decimals; an empty field reads as zero.
    pub fn next_f64(&mut self) -> Result<f64, WireError> {
        let index = self.position;
        let raw = self.next_str()?;
        if raw.is_empty() {
            return Ok(0.0);
        }
        raw.parse::<f64>().map_err(|_| WireError::InvalidField {
            index,
            value: raw.to_owned(),
            expected: "number",
        })
    }

    pub fn next_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.next_i32()? != 0)
    }

    pub fn skip(&mut self, count: usize) -> Result<(), WireError> {
        for _ in 0..count {
            self.next_str()?;
        }
        Ok(())
    }

    fn next_parsed<T: std::str::FromStr + Default>(
        &mut self,
        expected: &'static str,
    ) -> Result<T, WireError> {
        let index = self.position;
        let raw = self.next_str()?;
        if raw.is_empty() {
            return Ok(T::default());
        }
        raw.parse::<T>().map_err(|_| WireError::InvalidField {
            index,
            value: raw.to_owned(),
            expected,
        })
    }
}
