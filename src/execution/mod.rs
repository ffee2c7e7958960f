//! Batch execution result.

/// What a file run left behind: exit code (if the child started) and captured output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunOutput {
    /// The interpreter never ran; `message` stands in for its stderr.
    pub fn spawn_failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            stdout: Vec::new(),
            stderr: message.into().into_bytes(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
