//! Binary entry point for the resfilter CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Decode a filter, print its canonical text and polarity
//! resfilter check "and{PrimaryType(+'^nt:file$'),MimeType(+'^image/')}"
//!
//! # Evaluate a named filter from a configuration file
//! resfilter --config filters.json eval @images --resources resources.json
//! ```
//!
//! All output is JSON on stdout; logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use resfilter::cli::{run_check, run_eval};
use resfilter::config::FilterConfig;
use resfilter::error::{CliError, OutputErrorCode};
use resfilter::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Check and evaluate resource filter expressions.
#[derive(Parser, Debug)]
#[command(
    name = "resfilter",
    version,
    about = "Check and evaluate resource filter expressions"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Filter configuration file (JSON) defining named filters.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output (RUST_LOG takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a filter and print its canonical text and restriction polarity.
    Check {
        /// Filter text, or `@name` for a configured filter (default: the
        /// configuration's default filter).
        filter: Option<String>,
    },
    /// Evaluate a filter against the resources listed in a JSON file.
    Eval {
        /// Filter text, or `@name` for a configured filter (default: the
        /// configuration's default filter).
        filter: Option<String>,

        /// JSON file holding one resource or an array of resources.
        #[arg(long)]
        resources: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), CliError> {
    let config = cli
        .global
        .config
        .as_deref()
        .map(FilterConfig::load)
        .transpose()?;

    let mut stdout = io::stdout();
    match cli.command {
        Command::Check { filter } => {
            let response = run_check(filter.as_deref(), config.as_ref())?;
            emit_response(&response, &mut stdout)?;
        }
        Command::Eval { filter, resources } => {
            let response = run_eval(filter.as_deref(), &resources, config.as_ref())?;
            emit_response(&response, &mut stdout)?;
        }
    }
    stdout.flush()?;
    Ok(())
}
