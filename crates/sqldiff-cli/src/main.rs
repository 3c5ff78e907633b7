// sqldiff-cli/src/main.rs
// ============================================================================
// Module: sqldiff CLI Entry Point
// Description: Command dispatcher for differential SQL runs.
// Purpose: Parse arguments, merge them over the config, and run the harness.
// Dependencies: clap, sqldiff-cli, sqldiff-config, sqldiff-core
// ============================================================================

//! ## Overview
//! `sqldiff exec` runs one differential comparison between two endpoints.
//! `sqldiff config validate` checks a config file without connecting to
//! anything. Every fatal condition becomes one stderr line and a failure exit
//! code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use sqldiff_cli::execute;
use sqldiff_cli::t;
use sqldiff_config::ConfigOverrides;
use sqldiff_config::HarnessConfig;
use sqldiff_core::DiffStyle;
use sqldiff_core::StopReason;
use thiserror::Error;


// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sqldiff",
    about = "Differential SQL testing between two database endpoints",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print the CLI version and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run statements against two endpoints and record divergences.
    Exec(ExecCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (falls back to `SQLDIFF_CONFIG`).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Arguments for `exec`.
#[derive(Args, Debug)]
struct ExecCommand {
    /// Config file path (falls back to `SQLDIFF_CONFIG`).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Descriptor of endpoint 1 (system under test).
    #[arg(long, value_name = "DSN")]
    dsn1: Option<String>,
    /// Descriptor of endpoint 2 (reference).
    #[arg(long, value_name = "DSN")]
    dsn2: Option<String>,
    /// Compare rows in order instead of as multisets.
    #[arg(long, action = ArgAction::SetTrue)]
    order: bool,
    /// Dump directory; must not exist.
    #[arg(long, value_name = "DIR")]
    dump: Option<PathBuf>,
    /// Statement budget; zero or negative runs until the source is exhausted.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    queries: Option<i64>,
    /// Skip data generation and read keys from endpoint 1.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_generation: bool,
    /// DDL script applied to both endpoints.
    #[arg(long, value_name = "FILE")]
    ddl: Option<PathBuf>,
    /// Finite statement script.
    #[arg(long, value_name = "FILE", conflicts_with = "templates")]
    statements: Option<PathBuf>,
    /// Template file expanded into an unbounded statement stream.
    #[arg(long, value_name = "FILE")]
    templates: Option<PathBuf>,
    /// Template expansion seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Diff marker style in reports.
    #[arg(long, value_enum)]
    style: Option<StyleArg>,
    /// JSON-lines run event log.
    #[arg(long, value_name = "FILE")]
    event_log: Option<PathBuf>,
    /// Additional connect attempts per endpoint.
    #[arg(long, value_name = "N")]
    connect_retries: Option<u32>,
    /// Deadline for computing one report diff (ms).
    #[arg(long, value_name = "MS")]
    diff_timeout_ms: Option<u64>,
}

impl ExecCommand {
    /// Splits the flags into a config path and overrides.
    fn into_overrides(self) -> (Option<PathBuf>, ConfigOverrides) {
        let overrides = ConfigOverrides {
            dsn1: self.dsn1,
            dsn2: self.dsn2,
            order: self.order,
            dump: self.dump,
            queries: self.queries,
            skip_generation: self.skip_generation,
            ddl: self.ddl,
            statements: self.statements,
            templates: self.templates,
            seed: self.seed,
            style: self.style.map(DiffStyle::from),
            event_log: self.event_log,
            connect_retries: self.connect_retries,
            diff_timeout_ms: self.diff_timeout_ms,
        };
        (self.config, overrides)
    }
}

/// Diff marker style flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    /// No annotation.
    Plain,
    /// ANSI red/green.
    Ansi,
}

impl From<StyleArg> for DiffStyle {
    fn from(value: StyleArg) -> Self {
        match value {
            StyleArg::Plain => Self::Plain,
            StyleArg::Ansi => Self::Ansi,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for consistent error reporting.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Rendered error message.
    message: String,
}

impl CliError {
    /// Creates a new CLI error with the provided message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Exec(command) => command_exec(command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Validates a config file.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    HarnessConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Runs one differential comparison.
fn command_exec(command: ExecCommand) -> CliResult<ExitCode> {
    let config = resolve_exec_config(command)?;
    let summary =
        execute(&config).map_err(|err| CliError::new(t!("exec.failed", error = err)))?;

    let reason = match summary.stop_reason {
        StopReason::SourceExhausted => t!("exec.stop.source_exhausted"),
        StopReason::BudgetReached => t!("exec.stop.budget_reached"),
    };
    write_stdout_line(&t!(
        "exec.summary",
        statements = summary.statements,
        divergences = summary.divergences,
        dir = config.dump.dir.display(),
        reason = reason
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&t!("exec.dump_ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads the config file and applies command-line overrides.
fn resolve_exec_config(command: ExecCommand) -> CliResult<HarnessConfig> {
    let (path, overrides) = command.into_overrides();
    let mut config = HarnessConfig::load(path.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    config.apply_overrides(overrides);
    config.validate().map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    Ok(config)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.stdout"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
