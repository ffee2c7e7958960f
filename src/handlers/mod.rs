//! Invocation dispatcher: routes a parsed request to its mode handler.

use std::io::Write;

use tracing::{debug, warn};

use crate::{
    cli::Request,
    config::InterpreterConfig,
    error::{DispatchError, EXIT_FAILURE},
    printer::DiagnosticPrinter,
    process::Launcher,
};

pub mod interactive;
pub mod run;

pub struct Dispatcher<L> {
    config: InterpreterConfig,
    launcher: L,
    printer: DiagnosticPrinter,
}

impl<L: Launcher> Dispatcher<L> {
    pub fn new(config: InterpreterConfig, launcher: L) -> Self {
        Self {
            config,
            launcher,
            printer: DiagnosticPrinter::default(),
        }
    }

    pub fn with_printer(mut self, printer: DiagnosticPrinter) -> Self {
        self.printer = printer;
        self
    }

    /// Handle one request and return the exit code for this process.
    ///
    /// Usage errors are reported before anything is spawned.
    pub async fn dispatch<O, E>(&self, request: Request, out: &mut O, err: &mut E) -> i32
    where
        O: Write + ?Sized,
        E: Write + ?Sized,
    {
        let result = match request {
            Request::Interactive(_) => interactive::run(&self.launcher, &self.config).await,
            Request::Run(args) => {
                run::run(
                    &self.launcher,
                    &self.config,
                    args.file.as_deref(),
                    self.printer,
                    &mut *out,
                    &mut *err,
                )
                .await
            }
            Request::Unrecognized(name) => {
                debug!(name = %name, "unrecognized invocation name");
                Err(DispatchError::UnrecognizedCommand {
                    interactive: self.config.aliases.interactive.clone(),
                    run: self.config.aliases.run.clone(),
                })
            }
        };

        match result {
            Ok(code) => code,
            Err(e) => {
                debug!(error = %e, "dispatch failed");
                if let Err(write_err) = self.printer.error(err, &e.to_string()) {
                    warn!(error = %e, write_error = %write_err, "could not report error");
                }
                EXIT_FAILURE
            }
        }
    }
}
