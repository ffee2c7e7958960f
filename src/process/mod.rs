//! Interpreter process management (command line, launch, exit status).

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::ExitStatus,
};

use async_trait::async_trait;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use crate::{error::DispatchError, execution::RunOutput};

pub mod relay;
pub mod system;

pub use system::SystemLauncher;

/// How to start the external interpreter: `program [script] [file]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterCommand {
    pub program: String,
    pub script: Option<PathBuf>,
}

impl InterpreterCommand {
    pub fn args(&self, file: Option<&Path>) -> Vec<OsString> {
        self.script
            .iter()
            .map(|s| s.as_os_str().to_os_string())
            .chain(file.map(|f| f.as_os_str().to_os_string()))
            .collect()
    }

    pub fn command(&self, file: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(file))
            // Prompts must reach the terminal through the pipes
            .env("PYTHONUNBUFFERED", "1");
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> DispatchError {
        DispatchError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

pub struct ProcessHandle {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// Spawn with all three standard streams piped.
pub fn spawn_piped(interpreter: &InterpreterCommand) -> Result<ProcessHandle, DispatchError> {
    let mut cmd = interpreter.command(None);
    cmd.stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| interpreter.spawn_error(e))?;
    let missing = |what: &str| {
        interpreter.spawn_error(std::io::Error::other(format!("no {what} pipe")))
    };
    let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
    let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

    Ok(ProcessHandle {
        child,
        stdin,
        stdout,
        stderr,
    })
}

/// Shell convention: a child killed by signal N reports 128 + N.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Seam between the dispatcher and real child processes.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Run with the parent's standard streams relayed live; returns the child's exit code.
    async fn interactive(&self, interpreter: &InterpreterCommand) -> Result<i32, DispatchError>;

    /// Run `file` to completion with output captured. Spawn failures are reported in the output.
    async fn run_to_completion(&self, interpreter: &InterpreterCommand, file: &Path) -> RunOutput;
}
