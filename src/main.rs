//! Binary entry point for the typefilter CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Report what would be removed (dry run)
//! typefilter filter --model desc.json --skip float64
//!
//! # Filter per class and write the result
//! typefilter filter --model desc.json --skip-for 'classA=((int32, const), &)' --output filtered.json
//!
//! # Use skip types from typefilter.toml and overwrite the model
//! typefilter filter --model desc.json --in-place
//!
//! # Check how a pattern treats a type
//! typefilter match --pattern float64 --type '((vector, float64, const), &)'
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use typefilter::cli::{run_filter, run_match, FilterOptions, WriteTarget};
use typefilter::config::CliOverrides;
use typefilter::error::{OutputErrorCode, TypefilterError};
use typefilter::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Remove attributes and methods with unwanted types from a description model.
///
/// All output is JSON on stdout; logs go to stderr.
#[derive(Parser)]
#[command(name = "typefilter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter a description model.
    Filter {
        /// Description model (JSON).
        #[arg(long)]
        model: PathBuf,

        /// Config file with `skiptypes` (default: $TYPEFILTER_CONFIG or ./typefilter.toml).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip type applied to every class, in tuple notation. Repeatable.
        #[arg(long, conflicts_with = "skip_for")]
        skip: Vec<String>,

        /// Skip type for one class as `<Class>=<pattern>`. Repeatable.
        #[arg(long)]
        skip_for: Vec<String>,

        /// Write the filtered model to this path.
        #[arg(long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the model file with the filtered result.
        #[arg(long)]
        in_place: bool,
    },

    /// Show how a pattern matches a type.
    Match {
        /// Pattern in tuple notation.
        #[arg(long)]
        pattern: String,

        /// Candidate type in tuple notation.
        #[arg(long = "type")]
        ty: String,
    },
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
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

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level, cli.log_format);

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            tracing::error!("{}", err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&ErrorResponse::from_error(&err), &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(command: Command) -> Result<(), TypefilterError> {
    let mut stdout = io::stdout();
    let written = match command {
        Command::Filter {
            model,
            config,
            skip,
            skip_for,
            output,
            in_place,
        } => {
            let cwd = std::env::current_dir().map_err(|e| {
                TypefilterError::internal(format!("cannot determine working directory: {}", e))
            })?;
            let target = match (output, in_place) {
                (Some(path), _) => WriteTarget::Path(path),
                (None, true) => WriteTarget::InPlace,
                (None, false) => WriteTarget::DryRun,
            };
            let options = FilterOptions {
                cwd,
                model,
                target,
                overrides: CliOverrides {
                    config,
                    skip,
                    skip_for,
                },
            };
            let response = run_filter(&options)?;
            emit_response(&response, &mut stdout)
        }
        Command::Match { pattern, ty } => {
            let response = run_match(&pattern, &ty)?;
            emit_response(&response, &mut stdout)
        }
    };
    written.map_err(|e| TypefilterError::internal(format!("cannot write response: {}", e)))
}
