//! File-run mode: execute one program file with buffered output.

use std::{io::Write, path::Path};

use tracing::debug;

use crate::{
    config::InterpreterConfig, error::DispatchError, printer::DiagnosticPrinter, process::Launcher,
};

/// On success the captured stdout goes to `out`; on failure only the captured
/// stderr goes to `err`. The returned code is 0 either way unless
/// `propagate_run_exit` is set.
pub async fn run<L, O, E>(
    launcher: &L,
    config: &InterpreterConfig,
    file: Option<&Path>,
    printer: DiagnosticPrinter,
    out: &mut O,
    err: &mut E,
) -> Result<i32, DispatchError>
where
    L: Launcher + ?Sized,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let file = file.ok_or(DispatchError::MissingFilePath)?;
    let output = launcher.run_to_completion(&config.interpreter, file).await;

    if output.success() {
        out.write_all(&output.stdout)?;
        out.flush()?;
        return Ok(0);
    }

    debug!(
        code = ?output.exit_code,
        discarded_stdout = output.stdout.len(),
        "file run failed"
    );
    printer.execution_error(err, &output.stderr)?;

    if config.propagate_run_exit {
        Ok(output.exit_code.filter(|c| *c != 0).unwrap_or(1))
    } else {
        Ok(0)
    }
}
