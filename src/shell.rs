// Interactive menu shell.
//
// Reads choices and paths line by line from any `BufRead` and writes prompts
// and reports to any `Write`, so the loop can be driven by stdin/stdout or by
// a scripted buffer in tests. Errors from an action are printed and the loop
// carries on; only a failure to write the prompt itself ends the session.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::codec::Method;
use crate::io::{self as fileio, IoError};

/// Interactive compress/decompress/benchmark loop.
pub struct Shell<R: BufRead, W: Write> {
    input: R,
    output: W,
}

/// Outcome of a single menu action.
enum Step {
    Continue,
    Exit,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Run until the user picks "Exit" or input is exhausted.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Simple Compression System")?;
        writeln!(self.output, "Supports RLE and Delta Encoding")?;

        loop {
            writeln!(self.output)?;
            writeln!(self.output, "Menu:")?;
            writeln!(self.output, "1. Compress file")?;
            writeln!(self.output, "2. Decompress file")?;
            writeln!(self.output, "3. Benchmark file")?;
            writeln!(self.output, "4. Exit")?;

            let step = match self.prompt("Select: ") {
                Ok(None) => break,
                Ok(Some(choice)) => match choice.as_str() {
                    "1" => self.compress_action(),
                    "2" => self.decompress_action(),
                    "3" => self.benchmark_action(),
                    "4" => Ok(Step::Exit),
                    _ => Ok(Step::Continue),
                },
                Err(e) => Err(e),
            };
            match step {
                Ok(Step::Continue) => {}
                Ok(Step::Exit) | Err(ActionError::Eof) => break,
                Err(ActionError::Io(e)) => return Err(e),
                Err(ActionError::File(e)) => {
                    log::debug!("shell action failed: {e}");
                    writeln!(self.output, "Error: {e}")?;
                }
                Err(ActionError::Input(msg)) => {
                    log::debug!("shell input rejected: {msg}");
                    writeln!(self.output, "Error: {msg}")?;
                }
            }
        }
        Ok(())
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    ///
    /// A line that is not valid UTF-8 is consumed and reported as a
    /// recoverable input error.
    fn prompt(&mut self, label: &str) -> Result<Option<String>, ActionError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8(line)
            .map_err(|_| ActionError::Input("input line is not valid UTF-8"))?;
        Ok(Some(line.trim().to_string()))
    }

    /// Like `prompt`, but end of input exits the shell.
    fn ask(&mut self, label: &str) -> Result<String, ActionError> {
        self.prompt(label)?.ok_or(ActionError::Eof)
    }

    fn ask_method(&mut self, verb: &str) -> Result<Option<Method>, ActionError> {
        writeln!(self.output, "Select {verb} method:")?;
        for m in Method::ALL {
            writeln!(self.output, "{} - {}", m.code(), m.description())?;
        }
        let code = self.ask("Choose method (01/02/03): ")?;
        match code.parse::<Method>() {
            Ok(m) => Ok(Some(m)),
            Err(_) => {
                writeln!(self.output, "Invalid method selected.")?;
                Ok(None)
            }
        }
    }

    fn compress_action(&mut self) -> Result<Step, ActionError> {
        let input = PathBuf::from(self.ask("Input file: ")?);
        if !input.exists() {
            writeln!(self.output, "File not found!")?;
            return Ok(Step::Continue);
        }
        let output = fileio::with_cmp_extension(Path::new(&self.ask("Output file (.cmp): ")?));
        let Some(method) = self.ask_method("compression")? else {
            return Ok(Step::Continue);
        };

        let stats = fileio::compress_file(&input, &output, method)?;
        writeln!(
            self.output,
            "Compressed {} → {} bytes ({})",
            fileio::format_count(stats.original_size),
            fileio::format_count(stats.compressed_size),
            fileio::format_ratio(stats.ratio())
        )?;
        Ok(Step::Continue)
    }

    fn decompress_action(&mut self) -> Result<Step, ActionError> {
        let input = PathBuf::from(self.ask("Input file (.cmp): ")?);
        if fileio::require_cmp_extension(&input).is_err() {
            writeln!(self.output, "Must be a .cmp file!")?;
            return Ok(Step::Continue);
        }
        let output = PathBuf::from(self.ask("Output file: ")?);
        let Some(method) = self.ask_method("decompression")? else {
            return Ok(Step::Continue);
        };

        let stats = fileio::decompress_file(&input, &output, method)?;
        writeln!(
            self.output,
            "Successfully decompressed {} → {} bytes",
            fileio::format_count(stats.compressed_size),
            fileio::format_count(stats.output_size)
        )?;
        Ok(Step::Continue)
    }

    fn benchmark_action(&mut self) -> Result<Step, ActionError> {
        let path = PathBuf::from(self.ask("File to benchmark: ")?);
        if !path.exists() {
            writeln!(self.output, "File not found!")?;
            return Ok(Step::Continue);
        }
        let Some(method) = self.ask_method("compression")? else {
            return Ok(Step::Continue);
        };

        let report = fileio::benchmark_file(&path, method)?;
        writeln!(
            self.output,
            "\nTesting {} ({} bytes)",
            path.display(),
            fileio::format_count(report.original_size)
        )?;
        writeln!(
            self.output,
            "Compressed: {} bytes ({})",
            fileio::format_count(report.compressed_size),
            fileio::format_ratio(report.ratio())
        )?;
        writeln!(
            self.output,
            "Decompressed: {} bytes",
            fileio::format_count(report.decompressed_size)
        )?;
        Ok(Step::Continue)
    }
}

/// Internal error for menu actions: terminal I/O on the shell's own streams,
/// end of input mid-dialog, an unreadable input line, or a recoverable
/// file/codec failure.
enum ActionError {
    Io(io::Error),
    Eof,
    Input(&'static str),
    File(IoError),
}

impl From<io::Error> for ActionError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<IoError> for ActionError {
    fn from(e: IoError) -> Self {
        Self::File(e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn run_bytes(script: &[u8]) -> String {
        let mut out = Vec::new();
        Shell::new(Cursor::new(script.to_vec()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn run_script(script: &str) -> String {
        run_bytes(script.as_bytes())
    }

    #[test]
    fn exit_immediately() {
        let out = run_script("4\n");
        assert!(out.starts_with("Simple Compression System\n"));
        assert_eq!(out.matches("Menu:").count(), 1);
    }

    #[test]
    fn eof_ends_session() {
        let out = run_script("");
        assert!(out.contains("Select: "));
    }

    #[test]
    fn non_utf8_line_keeps_loop_alive() {
        let out = run_bytes(b"1\n\xff\xfe.bin\n4\n");
        assert!(out.contains("Error: input line is not valid UTF-8"), "{out}");
        assert_eq!(out.matches("Menu:").count(), 2);

        let out = run_bytes(b"\xff\n4\n");
        assert!(out.contains("Error: input line is not valid UTF-8"), "{out}");
        assert_eq!(out.matches("Menu:").count(), 2);
    }

    #[test]
    fn unknown_choice_redisplays_menu() {
        let out = run_script("7\n\n4\n");
        assert_eq!(out.matches("Menu:").count(), 3);
    }

    #[test]
    fn compress_then_decompress() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.bin");
        let packed = dir.path().join("packed");
        let restored = dir.path().join("restored.bin");
        let data: Vec<u8> = std::iter::repeat_n(b'a', 2000).chain(*b"bc").collect();
        std::fs::write(&input, &data).unwrap();

        let script = format!(
            "1\n{}\n{}\n01\n2\n{}.cmp\n{}\n01\n4\n",
            input.display(),
            packed.display(),
            packed.display(),
            restored.display()
        );
        let out = run_script(&script);

        // Deltas: [a,1] [0,255]x7 [0,214] [1,2] -> ten records.
        assert!(out.contains("Compressed 2,002 → 20 bytes (1.0%)"), "{out}");
        assert!(out.contains("Successfully decompressed 20 → 2,002 bytes"), "{out}");
        assert_eq!(std::fs::read(&restored).unwrap(), data);
    }

    #[test]
    fn missing_input_file() {
        let out = run_script("1\n/definitely/not/here\n4\n");
        assert!(out.contains("File not found!"));
        assert_eq!(out.matches("Menu:").count(), 2);
    }

    #[test]
    fn invalid_method_is_reported() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.bin");
        std::fs::write(&input, b"abc").unwrap();
        let script = format!("1\n{}\nout\n99\n4\n", input.display());
        let out = run_script(&script);
        assert!(out.contains("Invalid method selected."));
        assert!(!dir.path().join("out.cmp").exists());
    }

    #[test]
    fn decompress_requires_cmp() {
        let out = run_script("2\nfile.bin\n4\n");
        assert!(out.contains("Must be a .cmp file!"));
    }

    #[test]
    fn codec_error_keeps_loop_alive() {
        let dir = tempdir().unwrap();
        let packed = dir.path().join("bad.cmp");
        std::fs::write(&packed, [5u8]).unwrap();
        let script = format!(
            "2\n{}\n{}\n02\n4\n",
            packed.display(),
            dir.path().join("bad.out").display()
        );
        let out = run_script(&script);
        assert!(
            out.contains("Error: malformed RLE stream: truncated run record at offset 0"),
            "{out}"
        );
        assert_eq!(out.matches("Menu:").count(), 2);
    }

    #[test]
    fn benchmark_prints_report() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("b.bin");
        std::fs::write(&input, [1u8, 2, 3, 4]).unwrap();
        let script = format!("3\n{}\n02\n4\n", input.display());
        let out = run_script(&script);
        assert!(out.contains("(4 bytes)"));
        assert!(out.contains("Compressed: 8 bytes (200.0%)"));
        assert!(out.contains("Decompressed: 4 bytes"));
    }
}
