//! Launcher backed by real child processes.

use std::{path::Path, process::Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use super::{exit_code, relay::relay, spawn_piped, InterpreterCommand, Launcher, ProcessHandle};
use crate::{error::DispatchError, execution::RunOutput};

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

#[async_trait]
impl Launcher for SystemLauncher {
    async fn interactive(&self, interpreter: &InterpreterCommand) -> Result<i32, DispatchError> {
        run_interactive(
            interpreter,
            tokio::io::stdin(),
            tokio::io::stdout(),
            tokio::io::stderr(),
        )
        .await
    }

    async fn run_to_completion(&self, interpreter: &InterpreterCommand, file: &Path) -> RunOutput {
        let mut cmd = interpreter.command(Some(file));
        // stdin stays attached so `writeinput` prompts can still be answered
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %interpreter.program, file = %file.display(), "running file");
        match cmd.output().await {
            Ok(output) => {
                let code = exit_code(output.status);
                debug!(code, stdout = output.stdout.len(), stderr = output.stderr.len(), "file run finished");
                RunOutput {
                    exit_code: Some(code),
                    stdout: output.stdout,
                    stderr: output.stderr,
                }
            }
            Err(source) => {
                let err = DispatchError::Spawn {
                    program: interpreter.program.clone(),
                    source,
                };
                debug!(error = %err, "file run could not start");
                RunOutput::spawn_failure(err.to_string())
            }
        }
    }
}

/// Pipe the child's streams to/from the given parent streams until it exits.
///
/// The child's stdout and stderr are relayed independently, so each keeps its
/// own order but nothing is promised about interleaving between them. The
/// stdin relay is abandoned once the child is gone.
pub async fn run_interactive<I, O, E>(
    interpreter: &InterpreterCommand,
    parent_stdin: I,
    parent_stdout: O,
    parent_stderr: E,
) -> Result<i32, DispatchError>
where
    I: AsyncRead + Unpin + Send + 'static,
    O: AsyncWrite + Unpin + Send + 'static,
    E: AsyncWrite + Unpin + Send + 'static,
{
    let ProcessHandle {
        mut child,
        stdin,
        stdout,
        stderr,
    } = spawn_piped(interpreter)?;
    debug!(program = %interpreter.program, pid = ?child.id(), "interactive interpreter started");

    let stdout_task = tokio::spawn(relay(stdout, parent_stdout));
    let stderr_task = tokio::spawn(relay(stderr, parent_stderr));
    let stdin_task = tokio::spawn(async move {
        // dropping the child's stdin at parent EOF lets the interpreter see EOF too
        match relay(parent_stdin, stdin).await {
            Ok(n) => debug!(bytes = n, "parent stdin closed"),
            Err(e) => debug!(error = %e, "stdin relay ended"),
        }
    });

    let status = loop {
        tokio::select! {
            status = child.wait() => break status?,
            interrupt = tokio::signal::ctrl_c() => {
                if let Err(e) = interrupt {
                    warn!(error = %e, "could not listen for interrupts");
                    break child.wait().await?;
                }
                // The child shares our process group and got the same signal.
                debug!("interrupt received, waiting for interpreter");
            }
        }
    };
    stdin_task.abort();

    for (name, task) in [("stdout", stdout_task), ("stderr", stderr_task)] {
        match task.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(stream = name, error = %e, "relay failed"),
            Err(e) => warn!(stream = name, error = %e, "relay task panicked"),
        }
    }

    let code = exit_code(status);
    debug!(code, "interactive interpreter exited");
    Ok(code)
}

#[cfg(all(test, unix))]
mod tests {
    use std::{io::Write, path::PathBuf};

    use tokio::io::AsyncReadExt;

    use super::*;

    fn sh_script(body: &str) -> (tempfile::TempDir, InterpreterCommand) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interp.sh");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "{body}").unwrap();
        let cmd = InterpreterCommand {
            program: "sh".into(),
            script: Some(path),
        };
        (dir, cmd)
    }

    async fn drain(mut reader: tokio::io::DuplexStream) -> String {
        let mut s = String::new();
        reader.read_to_string(&mut s).await.unwrap();
        s
    }

    #[tokio::test]
    async fn interactive_relays_output_and_exit_code() {
        for code in [0, 1, 137] {
            let (_dir, cmd) = sh_script(&format!(
                "printf 'hello\\n'; printf 'world\\n'; printf 'oops' >&2; exit {code}"
            ));
            let (out_w, out_r) = tokio::io::duplex(4096);
            let (err_w, err_r) = tokio::io::duplex(4096);

            let got = run_interactive(&cmd, tokio::io::empty(), out_w, err_w)
                .await
                .unwrap();

            assert_eq!(got, code);
            assert_eq!(drain(out_r).await, "hello\nworld\n");
            assert_eq!(drain(err_r).await, "oops");
        }
    }

    #[tokio::test]
    async fn interactive_feeds_parent_stdin_to_child() {
        let (_dir, cmd) = sh_script("while read line; do echo \"got $line\"; done");
        let (out_w, out_r) = tokio::io::duplex(4096);

        let code = run_interactive(&cmd, &b"a\nb\n"[..], out_w, tokio::io::sink())
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(drain(out_r).await, "got a\ngot b\n");
    }

    #[tokio::test]
    async fn run_to_completion_captures_both_streams() {
        let (dir, cmd) = sh_script("cat \"$1\"; printf 'warn' >&2; exit 3");
        let file = dir.path().join("prog.s3");
        std::fs::write(&file, "42\n").unwrap();

        let output = SystemLauncher.run_to_completion(&cmd, &file).await;

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, b"42\n");
        assert_eq!(output.stderr, b"warn");
    }

    #[tokio::test]
    async fn run_to_completion_reports_spawn_failure_as_stderr() {
        let cmd = InterpreterCommand {
            program: "s3-interpreter-that-does-not-exist".into(),
            script: None,
        };

        let output = SystemLauncher
            .run_to_completion(&cmd, &PathBuf::from("prog.s3"))
            .await;

        assert_eq!(output.exit_code, None);
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).contains("s3-interpreter-that-does-not-exist"));
    }
}
