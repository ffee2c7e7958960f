use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use clap::Parser;

use crate::config::Aliases;

/// Which mode this run was invoked in, decided once from the program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Interactive,
    FileRun,
    Unrecognized(String),
}

impl Invocation {
    pub fn resolve(name: &str, aliases: &Aliases) -> Self {
        if name == aliases.interactive {
            Self::Interactive
        } else if name == aliases.run {
            Self::FileRun
        } else {
            Self::Unrecognized(name.to_string())
        }
    }
}

/// Name the binary was launched as: the basename of argv[0], without `.exe`.
pub fn invoked_name(argv0: &OsString) -> String {
    let name = Path::new(argv0)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match std::env::consts::EXE_SUFFIX {
        "" => name,
        suffix => name.strip_suffix(suffix).map(str::to_string).unwrap_or(name),
    }
}

/// Start the interpreter's interactive read loop.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "Start the S3 interpreter interactively", version)]
pub struct InterpretArgs {}

/// Run an S3 program file and print its output.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(about = "Run an S3 program file", version)]
pub struct RunArgs {
    /// Program file handed to the interpreter as-is, even if it starts with `-`.
    #[arg(value_name = "FILE", allow_hyphen_values = true)]
    pub file: Option<PathBuf>,
}

/// A fully parsed command line, ready for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Interactive(InterpretArgs),
    Run(RunArgs),
    Unrecognized(String),
}

impl Request {
    /// Parse the command line for the resolved mode. Exits on `--help` or bad flags.
    pub fn parse(invocation: Invocation, args: Vec<OsString>) -> Self {
        match invocation {
            Invocation::Interactive => Self::Interactive(InterpretArgs::parse_from(args)),
            Invocation::FileRun => Self::Run(RunArgs::parse_from(args)),
            Invocation::Unrecognized(name) => Self::Unrecognized(name),
        }
    }
}
