mod cli;
mod config;
mod error;
mod execution;
mod handlers;
mod printer;
mod process;

use std::io;

use anyhow::{Context, Result};
use cli::{Invocation, Request};
use config::{Config, InterpreterConfig};
use handlers::Dispatcher;
use is_terminal::IsTerminal;
use printer::DiagnosticPrinter;
use process::SystemLauncher;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cfg = Config::load();
    // An unparsable S3_LOG degrades to the default filter.
    let (filter, bad_filter) = match log_filter(&cfg) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
    };
    init_logging(filter);
    if let Some(e) = bad_filter {
        tracing::warn!("{e:#}; falling back to `{DEFAULT_LOG_FILTER}`");
    }

    let args: Vec<_> = std::env::args_os().collect();
    let name = args.first().map(cli::invoked_name).unwrap_or_default();

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()));
    let interpreter = InterpreterConfig::resolve(&cfg, exe_dir.as_deref());

    let invocation = Invocation::resolve(&name, &interpreter.aliases);
    tracing::debug!(
        name = %name,
        ?invocation,
        config = %cfg.config_path.display(),
        "invocation resolved"
    );
    let request = Request::parse(invocation, args);

    let dispatcher = Dispatcher::new(interpreter, SystemLauncher)
        .with_printer(DiagnosticPrinter::new(io::stderr().is_terminal()));
    let code = dispatcher
        .dispatch(request, &mut io::stdout(), &mut io::stderr())
        .await;

    // Exit here rather than returning: the runtime would otherwise wait on the
    // blocking stdin reader left behind by an interactive session.
    std::process::exit(code);
}

const DEFAULT_LOG_FILTER: &str = "warn";

fn log_filter(cfg: &Config) -> Result<EnvFilter> {
    let directive = cfg.log_filter();
    EnvFilter::try_new(&directive).with_context(|| format!("invalid S3_LOG filter: {directive}"))
}

fn init_logging(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}
