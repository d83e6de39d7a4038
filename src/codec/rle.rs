// Run-length transform.
//
// Wire format: a flat sequence of `[value, count]` byte pairs, no header.
// The encoder writes counts in 1..=255 and splits longer runs into
// consecutive records for the same value. A zero count decodes to nothing.

use super::{CodecError, RleFault};

/// Longest run a single record can describe.
pub const MAX_RUN: usize = u8::MAX as usize;

/// Size of one `[value, count]` record on the wire.
pub const RECORD_SIZE: usize = 2;

/// One decoded `[value, count]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRecord {
    pub value: u8,
    pub len: u8,
}

/// Run-length encode `input`.
///
/// Incompressible input doubles in size; that is the cost of a format with
/// no literal escape.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() / 2 + RECORD_SIZE);
    let mut i = 0usize;
    while i < input.len() {
        let value = input[i];
        let run = run_length(&input[i..], value);
        out.push(value);
        out.push(run as u8);
        i += run;
    }
    log::trace!(
        "rle: {} bytes -> {} records",
        input.len(),
        out.len() / RECORD_SIZE
    );
    out
}

/// Reverse [`encode`].
///
/// Fails with [`CodecError::MalformedRleStream`] if the stream ends in the
/// middle of a record. Nothing is returned on failure.
///
/// Every record appends `count` copies of its value, so a `[value, 0]`
/// record contributes no bytes.
pub fn decode(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let total = decoded_len(input)?;
    let mut out = Vec::with_capacity(total);
    for rec in records(input) {
        let rec = rec?;
        out.resize(out.len() + rec.len as usize, rec.value);
    }
    debug_assert_eq!(out.len(), total);
    Ok(out)
}

/// Number of bytes `input` expands to, validating every record on the way.
pub fn decoded_len(input: &[u8]) -> Result<usize, CodecError> {
    records(input).try_fold(0usize, |acc, rec| Ok(acc + rec?.len as usize))
}

/// Iterate the records of an encoded stream.
///
/// A trailing lone value byte yields a `TruncatedRecord` error as the last
/// item.
pub fn records(input: &[u8]) -> Records<'_> {
    Records { input, pos: 0 }
}

/// Iterator returned by [`records`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Iterator for Records<'_> {
    type Item = Result<RunRecord, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.input[self.pos..];
        let offset = self.pos;
        match *rest {
            [] => None,
            [_] => {
                self.pos = self.input.len();
                Some(Err(CodecError::MalformedRleStream {
                    offset,
                    fault: RleFault::TruncatedRecord,
                }))
            }
            [value, len, ..] => {
                self.pos += RECORD_SIZE;
                Some(Ok(RunRecord { value, len }))
            }
        }
    }
}

/// Length of the run of `value` at the start of `data`, capped at [`MAX_RUN`].
fn run_length(data: &[u8], value: u8) -> usize {
    data.iter()
        .take(MAX_RUN)
        .take_while(|&&b| b == value)
        .count()
}
