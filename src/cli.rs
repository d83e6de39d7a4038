// Command-line front end for deltarle.
//
// Subcommands map one-to-one onto the file helpers in `crate::io`, plus the
// interactive menu and a build-info dump.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec::{Method, rle};
use crate::io::{self as fileio, IoError};
use crate::shell::Shell;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Delta + run-length byte codec.
#[derive(Parser, Debug)]
#[command(
    name = "deltarle",
    version,
    about = "Delta and run-length file compressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a file. Output defaults to INPUT.cmp.
    Compress(CompressArgs),
    /// Decompress a .cmp file. The method must match the one used to compress.
    Decompress(DecompressArgs),
    /// Compress and decompress a file in memory and report sizes and timings.
    Bench(BenchArgs),
    /// Run the interactive menu.
    Shell,
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Method selector: 01 = Delta + RLE, 02 = RLE only, 03 = Delta only.
    #[arg(short = 'm', long, default_value = "01", value_parser = parse_method)]
    method: Method,

    /// File to compress.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output path (`.cmp` is appended when missing).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Method the input was compressed with (01, 02 or 03).
    #[arg(short = 'm', long, value_parser = parse_method)]
    method: Method,

    /// Compressed file; must end in `.cmp`.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output path (defaults to INPUT without `.cmp`).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BenchArgs {
    /// Method selector (01, 02 or 03).
    #[arg(short = 'm', long, default_value = "01", value_parser = parse_method)]
    method: Method,

    /// File to benchmark.
    #[arg(value_hint = ValueHint::FilePath)]
    file: PathBuf,
}

fn parse_method(s: &str) -> Result<Method, String> {
    s.parse::<Method>().map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Bench,
    Shell,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    method: Method,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        method: Method::default(),
        input_file: None,
        output_file: None,
    };

    match cli.command {
        Cmd::Compress(args) => {
            let output = args.output.unwrap_or_else(|| args.input.clone());
            opts.command = Command::Compress;
            opts.method = args.method;
            opts.output_file = Some(fileio::with_cmp_extension(&output));
            opts.input_file = Some(args.input);
        }
        Cmd::Decompress(args) => {
            let output = args
                .output
                .unwrap_or_else(|| fileio::strip_cmp_extension(&args.input));
            opts.command = Command::Decompress;
            opts.method = args.method;
            opts.output_file = Some(output);
            opts.input_file = Some(args.input);
        }
        Cmd::Bench(args) => {
            opts.command = Command::Bench;
            opts.method = args.method;
            opts.input_file = Some(args.file);
        }
        Cmd::Shell => opts.command = Command::Shell,
        Cmd::Config => opts.command = Command::Config,
    }

    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("deltarle".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("deltarle version {version}");

    let file_io = cfg!(feature = "file-io") as u8;
    eprintln!("FILE_IO={file_io}");
    eprintln!("RLE_MAX_RUN={}", rle::MAX_RUN);
    eprintln!("RLE_RECORD_SIZE={}", rle::RECORD_SIZE);
    eprintln!("CMP_EXTENSION=.{}", fileio::CMP_EXTENSION);
    for m in Method::ALL {
        eprintln!("METHOD_{}={}", m.code(), m.description());
    }

    0
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

/// Returns false (after printing why) if writing `output` would clobber the
/// input or an existing file without `-f`.
fn check_overwrite(opts: &Options, input: &Path, output: &Path) -> bool {
    if input == output {
        eprintln!(
            "deltarle: output would overwrite input: {}",
            output.display()
        );
        return false;
    }
    if output.exists() && !opts.force {
        eprintln!(
            "deltarle: output file exists, use -f to overwrite: {}",
            output.display()
        );
        return false;
    }
    true
}

fn report_error(context: &str, e: &IoError) -> i32 {
    eprintln!("deltarle: {context}: {e}");
    1
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options) -> i32 {
    let (Some(input), Some(output)) = (&opts.input_file, &opts.output_file) else {
        eprintln!("deltarle: compress: missing input or output path");
        return 1;
    };
    if !check_overwrite(opts, input, output) {
        return 1;
    }

    let stats = match fileio::compress_file(input, output, opts.method) {
        Ok(s) => s,
        Err(e) => return report_error(&format!("compress {}", input.display()), &e),
    };

    if !opts.quiet {
        eprintln!(
            "Compressed {} → {} bytes ({})",
            fileio::format_count(stats.original_size),
            fileio::format_count(stats.compressed_size),
            fileio::format_ratio(stats.ratio())
        );
    }
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "deltarle: compress: method {} ({}), output {}",
            stats.method,
            stats.method.description(),
            output.display()
        );
        if let Some(digest) = stats.original_sha256 {
            eprintln!("deltarle: original sha256: {}", fileio::hex(&digest));
        }
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "compress",
            "method": stats.method.code(),
            "original_size": stats.original_size,
            "compressed_size": stats.compressed_size,
            "ratio": stats.ratio(),
            "original_sha256": stats.original_sha256.map(|d| fileio::hex(&d)),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(opts: &Options) -> i32 {
    let (Some(input), Some(output)) = (&opts.input_file, &opts.output_file) else {
        eprintln!("deltarle: decompress: missing input or output path");
        return 1;
    };
    if let Err(e) = fileio::require_cmp_extension(input) {
        return report_error("decompress", &e);
    }
    if !check_overwrite(opts, input, output) {
        return 1;
    }

    let stats = match fileio::decompress_file(input, output, opts.method) {
        Ok(s) => s,
        Err(e) => return report_error(&format!("decompress {}", input.display()), &e),
    };

    if !opts.quiet {
        eprintln!(
            "Successfully decompressed {} → {} bytes",
            fileio::format_count(stats.compressed_size),
            fileio::format_count(stats.output_size)
        );
    }
    if opts.verbose > 0 && !opts.quiet {
        if let Some(digest) = stats.output_sha256 {
            eprintln!("deltarle: output sha256: {}", fileio::hex(&digest));
        }
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decompress",
            "method": stats.method.code(),
            "compressed_size": stats.compressed_size,
            "output_size": stats.output_size,
            "output_sha256": stats.output_sha256.map(|d| fileio::hex(&d)),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Bench command
// ---------------------------------------------------------------------------

fn cmd_bench(opts: &Options) -> i32 {
    let Some(path) = &opts.input_file else {
        eprintln!("deltarle: bench: missing file");
        return 1;
    };

    let report = match fileio::benchmark_file(path, opts.method) {
        Ok(r) => r,
        Err(e) => return report_error(&format!("bench {}", path.display()), &e),
    };

    if !opts.quiet {
        eprintln!(
            "Testing {} ({} bytes)",
            path.display(),
            fileio::format_count(report.original_size)
        );
        eprintln!(
            "Compressed: {} bytes ({})",
            fileio::format_count(report.compressed_size),
            fileio::format_ratio(report.ratio())
        );
        eprintln!(
            "Decompressed: {} bytes",
            fileio::format_count(report.decompressed_size)
        );
        eprintln!(
            "Time: compress {:.3} ms, decompress {:.3} ms",
            report.compress_time.as_secs_f64() * 1e3,
            report.decompress_time.as_secs_f64() * 1e3
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "bench",
            "method": report.method.code(),
            "original_size": report.original_size,
            "compressed_size": report.compressed_size,
            "decompressed_size": report.decompressed_size,
            "ratio": report.ratio(),
            "compress_us": report.compress_time.as_micros() as u64,
            "decompress_us": report.decompress_time.as_micros() as u64,
            "roundtrip_ok": report.roundtrip_ok,
        });
        eprintln!("{json:#}");
    }

    if !report.roundtrip_ok {
        eprintln!("deltarle: bench: round trip mismatch");
        return 1;
    }
    0
}

// ---------------------------------------------------------------------------
// Shell command
// ---------------------------------------------------------------------------

fn cmd_shell() -> i32 {
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    match Shell::new(stdin, stdout).run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("deltarle: shell: {e}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(opts.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::Bench => cmd_bench(&opts),
        Command::Shell => cmd_shell(),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
