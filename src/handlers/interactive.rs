//! Interactive mode: the interpreter's own read loop on our terminal.

use tracing::debug;

use crate::{config::InterpreterConfig, error::DispatchError, process::Launcher};

/// Run until the interpreter exits and hand back its exact exit code.
pub async fn run<L: Launcher + ?Sized>(
    launcher: &L,
    config: &InterpreterConfig,
) -> Result<i32, DispatchError> {
    debug!(program = %config.interpreter.program, "starting interactive session");
    launcher.interactive(&config.interpreter).await
}
