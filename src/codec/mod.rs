// Byte codec: delta and run-length transforms plus the three methods that
// compose them.
//
// - `delta`: wrapping byte-difference transform (length preserving)
// - `rle`:   `[value, count]` run records, count in 1..=255
//
// Compressed streams carry no header or method tag. The method has to be
// supplied again when decompressing.

pub mod delta;
pub mod rle;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an RLE stream failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RleFault {
    /// The stream ended after a value byte, before its count.
    TruncatedRecord,
}

impl fmt::Display for RleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedRecord => f.write_str("truncated run record"),
        }
    }
}

/// Error returned when a method selector or a compressed stream is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Method selector was not one of `01`, `02`, `03`.
    #[error("invalid method {0:?}, use '01', '02', or '03'")]
    InvalidMethod(String),
    /// RLE input could not be split into valid `[value, count]` records.
    #[error("malformed RLE stream: {fault} at offset {offset}")]
    MalformedRleStream { offset: usize, fault: RleFault },
}

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// Which transforms a stream was compressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Delta, then RLE over the deltas. Selector `01`.
    #[default]
    DeltaRle,
    /// RLE only. Selector `02`.
    RleOnly,
    /// Delta only. Selector `03`.
    DeltaOnly,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::DeltaRle, Method::RleOnly, Method::DeltaOnly];

    /// Two-character selector used on the command line and in the shell.
    pub fn code(self) -> &'static str {
        match self {
            Self::DeltaRle => "01",
            Self::RleOnly => "02",
            Self::DeltaOnly => "03",
        }
    }

    /// Parse a selector. Only the exact strings `01`, `02` and `03` are
    /// accepted; callers trim input themselves.
    pub fn from_code(code: &str) -> Result<Self, CodecError> {
        match code {
            "01" => Ok(Self::DeltaRle),
            "02" => Ok(Self::RleOnly),
            "03" => Ok(Self::DeltaOnly),
            other => Err(CodecError::InvalidMethod(other.to_string())),
        }
    }

    /// Human-readable name for menus and reports.
    pub fn description(self) -> &'static str {
        match self {
            Self::DeltaRle => "Delta + RLE",
            Self::RleOnly => "RLE only",
            Self::DeltaOnly => "Delta only",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Method {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Compress `data` with `method`.
pub fn compress(data: &[u8], method: Method) -> Vec<u8> {
    let out = match method {
        Method::DeltaRle => rle::encode(&delta::encode(data)),
        Method::RleOnly => rle::encode(data),
        Method::DeltaOnly => delta::encode(data),
    };
    log::debug!(
        "compress: method {method}: {} -> {} bytes",
        data.len(),
        out.len()
    );
    if out.len() > data.len() {
        log::warn!(
            "compress: method {method} expanded input from {} to {} bytes",
            data.len(),
            out.len()
        );
    }
    out
}

/// Decompress `data` that was produced by [`compress`] with the same `method`.
///
/// Transforms are undone in reverse order: for `DeltaRle` the run records are
/// expanded first and the deltas summed afterwards.
pub fn decompress(data: &[u8], method: Method) -> Result<Vec<u8>, CodecError> {
    let out = match method {
        Method::DeltaRle => {
            let mut buf = rle::decode(data)?;
            delta::decode_in_place(&mut buf);
            buf
        }
        Method::RleOnly => rle::decode(data)?,
        Method::DeltaOnly => delta::decode(data),
    };
    log::debug!(
        "decompress: method {method}: {} -> {} bytes",
        data.len(),
        out.len()
    );
    Ok(out)
}

/// [`compress`] with a textual selector. Fails with
/// [`CodecError::InvalidMethod`] before touching `data` if `code` is unknown.
pub fn compress_by_code(data: &[u8], code: &str) -> Result<Vec<u8>, CodecError> {
    let method = Method::from_code(code)?;
    Ok(compress(data, method))
}

/// [`decompress`] with a textual selector.
pub fn decompress_by_code(data: &[u8], code: &str) -> Result<Vec<u8>, CodecError> {
    let method = Method::from_code(code)?;
    decompress(data, method)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
