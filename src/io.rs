// File-level helpers around the in-memory codec.
//
// Provides `compress_file()`, `decompress_file()` and `benchmark_file()`.
// Inputs are read fully into memory; outputs go through a `BufWriter`.
// Optionally computes SHA-256 digests (feature-gated behind `file-io`).

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::codec::{self, CodecError, Method};

/// Extension conventionally given to compressed files.
pub const CMP_EXTENSION: &str = "cmp";

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The codec rejected the data or method.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A decompression input that does not carry the `.cmp` extension.
    #[error("not a .cmp file: {}", .0.display())]
    NotCompressedFile(PathBuf),
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    pub method: Method,
    /// Original file size in bytes.
    pub original_size: u64,
    /// Compressed output size in bytes.
    pub compressed_size: u64,
    /// SHA-256 of the original data (if `file-io` feature is enabled).
    pub original_sha256: Option<[u8; 32]>,
}

impl CompressStats {
    /// `compressed / original`, or `None` for an empty original.
    pub fn ratio(&self) -> Option<f64> {
        ratio(self.original_size, self.compressed_size)
    }
}

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    pub method: Method,
    /// Compressed input size in bytes.
    pub compressed_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the reconstructed data (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

/// Result of compressing and decompressing a file without writing anything.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub method: Method,
    pub original_size: u64,
    pub compressed_size: u64,
    pub decompressed_size: u64,
    pub compress_time: Duration,
    pub decompress_time: Duration,
    /// Whether the decompressed bytes are identical to the original.
    pub roundtrip_ok: bool,
}

impl BenchReport {
    pub fn ratio(&self) -> Option<f64> {
        ratio(self.original_size, self.compressed_size)
    }
}

// ---------------------------------------------------------------------------
// compress_file / decompress_file
// ---------------------------------------------------------------------------

/// Compress `input_path` with `method`, writing the raw stream to `output_path`.
///
/// The output has no header; `method` must be supplied again to decompress it.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    method: Method,
) -> Result<CompressStats, IoError> {
    let original = std::fs::read(input_path)?;
    let compressed = codec::compress(&original, method);
    write_all_buffered(output_path, &compressed)?;

    log::debug!(
        "compressed {} -> {} ({} -> {} bytes)",
        input_path.display(),
        output_path.display(),
        original.len(),
        compressed.len()
    );

    Ok(CompressStats {
        method,
        original_size: original.len() as u64,
        compressed_size: compressed.len() as u64,
        original_sha256: sha256(&original),
    })
}

/// Decompress `input_path` with `method`, writing the result to `output_path`.
///
/// The output file is only created once decoding has succeeded, so a
/// malformed stream leaves nothing behind.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    method: Method,
) -> Result<DecompressStats, IoError> {
    let compressed = std::fs::read(input_path)?;
    let output = codec::decompress(&compressed, method)?;
    write_all_buffered(output_path, &output)?;

    log::debug!(
        "decompressed {} -> {} ({} -> {} bytes)",
        input_path.display(),
        output_path.display(),
        compressed.len(),
        output.len()
    );

    Ok(DecompressStats {
        method,
        compressed_size: compressed.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}

/// Compress and decompress `path` in memory, timing both directions.
pub fn benchmark_file(path: &Path, method: Method) -> Result<BenchReport, IoError> {
    let original = std::fs::read(path)?;

    let t0 = Instant::now();
    let compressed = codec::compress(&original, method);
    let compress_time = t0.elapsed();

    let t1 = Instant::now();
    let decompressed = codec::decompress(&compressed, method)?;
    let decompress_time = t1.elapsed();

    let roundtrip_ok = decompressed == original;
    if !roundtrip_ok {
        log::warn!(
            "benchmark: {} did not survive method {method} round trip",
            path.display()
        );
    }

    Ok(BenchReport {
        method,
        original_size: original.len() as u64,
        compressed_size: compressed.len() as u64,
        decompressed_size: decompressed.len() as u64,
        compress_time,
        decompress_time,
        roundtrip_ok,
    })
}

fn write_all_buffered(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
    writer.write_all(data)?;
    writer.flush()
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Path conventions
// ---------------------------------------------------------------------------

const CMP_SUFFIX: &str = ".cmp";

/// Plain suffix match on the path text, so a file named just `.cmp` counts.
fn has_cmp_extension(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .ends_with(CMP_SUFFIX.as_bytes())
}

/// Append `.cmp` to `path` unless it already ends with it.
pub fn with_cmp_extension(path: &Path) -> PathBuf {
    if has_cmp_extension(path) {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(CMP_SUFFIX);
    PathBuf::from(name)
}

/// Reject decompression inputs without the `.cmp` extension.
pub fn require_cmp_extension(path: &Path) -> Result<(), IoError> {
    if has_cmp_extension(path) {
        Ok(())
    } else {
        Err(IoError::NotCompressedFile(path.to_path_buf()))
    }
}

/// Default decompression output: the input with `.cmp` removed.
///
/// A file name that is nothing but `.cmp` is returned unchanged.
pub fn strip_cmp_extension(path: &Path) -> PathBuf {
    let stem = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(CMP_SUFFIX));
    match stem {
        Some(stem) if !stem.is_empty() => path.with_file_name(stem),
        _ => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `compressed / original`, undefined for an empty original.
pub fn ratio(original: u64, compressed: u64) -> Option<f64> {
    (original != 0).then(|| compressed as f64 / original as f64)
}

/// Ratio as a percentage with one decimal, or `n/a`.
pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "n/a".to_string(),
    }
}

/// Byte count with thousands separators, e.g. `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Lowercase hex rendering of a digest.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn compress_decompress_file_roundtrip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.bin");
        let packed = dir.path().join("input.bin.cmp");
        let output = dir.path().join("output.bin");

        let mut data = vec![0u8; 4000];
        data.extend(b"some text in the middle");
        data.extend(vec![0xEE; 600]);
        std::fs::write(&input, &data).unwrap();

        for method in Method::ALL {
            let c = compress_file(&input, &packed, method).unwrap();
            assert_eq!(c.method, method);
            assert_eq!(c.original_size, data.len() as u64);
            assert_eq!(
                c.compressed_size,
                std::fs::metadata(&packed).unwrap().len()
            );

            let d = decompress_file(&packed, &output, method).unwrap();
            assert_eq!(d.compressed_size, c.compressed_size);
            assert_eq!(d.output_size, data.len() as u64);
            assert_eq!(std::fs::read(&output).unwrap(), data);
        }
    }

    #[cfg(feature = "file-io")]
    #[test]
    fn sha256_matches_between_directions() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.txt");
        let packed = dir.path().join("a.txt.cmp");
        let output = dir.path().join("a.out");
        std::fs::write(&input, b"checksum me, checksum me").unwrap();

        let c = compress_file(&input, &packed, Method::DeltaRle).unwrap();
        let d = decompress_file(&packed, &output, Method::DeltaRle).unwrap();
        assert!(c.original_sha256.is_some());
        assert_eq!(c.original_sha256, d.output_sha256);
    }

    #[test]
    fn malformed_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let packed = dir.path().join("bad.cmp");
        let output = dir.path().join("bad.out");
        std::fs::write(&packed, [1u8, 2, 3]).unwrap();

        let err = decompress_file(&packed, &output, Method::RleOnly).unwrap_err();
        assert!(matches!(
            err,
            IoError::Codec(CodecError::MalformedRleStream { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempdir().unwrap();
        let err = compress_file(
            &dir.path().join("nope"),
            &dir.path().join("nope.cmp"),
            Method::RleOnly,
        )
        .unwrap_err();
        match err {
            IoError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn benchmark_reports_roundtrip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bench.bin");
        std::fs::write(&input, vec![3u8; 1000]).unwrap();

        let r = benchmark_file(&input, Method::RleOnly).unwrap();
        assert_eq!(r.original_size, 1000);
        // 1000 = 3 * 255 + 235 -> four records.
        assert_eq!(r.compressed_size, 8);
        assert_eq!(r.decompressed_size, 1000);
        assert!(r.roundtrip_ok);
        assert_eq!(format_ratio(r.ratio()), "0.8%");
    }

    #[test]
    fn empty_file_has_no_ratio() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty");
        let packed = dir.path().join("empty.cmp");
        std::fs::write(&input, b"").unwrap();

        let c = compress_file(&input, &packed, Method::DeltaRle).unwrap();
        assert_eq!(c.compressed_size, 0);
        assert_eq!(c.ratio(), None);
        assert_eq!(format_ratio(c.ratio()), "n/a");
    }

    #[test]
    fn cmp_extension_helpers() {
        assert_eq!(
            with_cmp_extension(Path::new("out")),
            PathBuf::from("out.cmp")
        );
        assert_eq!(
            with_cmp_extension(Path::new("data.bin")),
            PathBuf::from("data.bin.cmp")
        );
        assert_eq!(
            with_cmp_extension(Path::new("x.cmp")),
            PathBuf::from("x.cmp")
        );
        assert_eq!(
            strip_cmp_extension(Path::new("data.bin.cmp")),
            PathBuf::from("data.bin")
        );
        assert!(require_cmp_extension(Path::new("a.cmp")).is_ok());
        assert!(require_cmp_extension(Path::new("x.tar.cmp")).is_ok());
        assert!(matches!(
            require_cmp_extension(Path::new("a.bin")),
            Err(IoError::NotCompressedFile(_))
        ));
    }

    #[test]
    fn bare_cmp_name_is_compressed() {
        assert_eq!(
            with_cmp_extension(Path::new(".cmp")),
            PathBuf::from(".cmp")
        );
        assert_eq!(
            with_cmp_extension(Path::new("dir/.cmp")),
            PathBuf::from("dir/.cmp")
        );
        assert!(require_cmp_extension(Path::new(".cmp")).is_ok());
        assert_eq!(strip_cmp_extension(Path::new(".cmp")), PathBuf::from(".cmp"));
        assert!(matches!(
            require_cmp_extension(Path::new("archive.cmpx")),
            Err(IoError::NotCompressedFile(_))
        ));
    }

    #[test]
    fn count_formatting() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn ratio_formatting() {
        assert_eq!(format_ratio(ratio(4, 8)), "200.0%");
        assert_eq!(format_ratio(ratio(1000, 123)), "12.3%");
        assert_eq!(ratio(0, 5), None);
    }

    #[test]
    fn hex_digest() {
        assert_eq!(hex(&[0x00, 0xab, 0x10]), "00ab10");
    }
}
