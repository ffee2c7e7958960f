//! Dispatcher error taxonomy.

use std::io;

use thiserror::Error;

/// Exit code for every dispatcher-level failure, usage or spawn alike.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Command not recognized. Use '{interactive}' or '{run}'.")]
    UnrecognizedCommand {
        interactive: String,
        run: String,
    },

    #[error("No file path provided.")]
    MissingFilePath,

    #[error("failed to start interpreter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("stream relay failed: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_message_names_both_aliases() {
        let err = DispatchError::UnrecognizedCommand {
            interactive: "s3interpret".into(),
            run: "s3run".into(),
        };
        assert_eq!(
            err.to_string(),
            "Command not recognized. Use 's3interpret' or 's3run'."
        );
    }

    #[test]
    fn spawn_error_names_program_and_cause() {
        let err = DispatchError::Spawn {
            program: "python".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "failed to start interpreter `python`: not found"
        );
    }
}
