//! Diagnostics printed on the parent's standard error.

use std::io::{self, Write};

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticPrinter {
    pub color: bool,
}

impl DiagnosticPrinter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// `Error: <message>` on its own line.
    pub fn error<W: Write + ?Sized>(&self, w: &mut W, message: &str) -> io::Result<()> {
        if self.color {
            writeln!(w, "{} {}", "Error:".red().bold(), message)
        } else {
            writeln!(w, "Error: {}", message)
        }
    }

    /// Relay a failed run's captured stderr verbatim, behind a single prefix.
    pub fn execution_error<W: Write + ?Sized>(&self, w: &mut W, stderr: &[u8]) -> io::Result<()> {
        if self.color {
            write!(w, "{} ", "Execution error:".red())?;
        } else {
            write!(w, "Execution error: ")?;
        }
        w.write_all(stderr)?;
        if !stderr.ends_with(b"\n") {
            writeln!(w)?;
        }
        w.flush()
    }
}
