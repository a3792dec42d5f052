mod logging;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use datadecl_config::{
    ConfigError, DeclarativeColumns, DocumentSource, RecordingBuilder, RegistrationError,
    ValidationIssue, ValidationReport, document_json_schema,
};
use logging::{LoggingError, init_logging};
use serde_json::json;
use settings::{CliSettings, LogFormat, SettingsError, load_settings};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document has {0} validation error(s)")]
    Invalid(usize),
}

#[derive(Parser, Debug)]
#[command(name = "datadecl", version, about = "Declarative column configuration CLI")]
struct Cli {
    #[command(flatten)]
    logging: LoggingArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct LoggingArgs {
    /// TOML settings file (log_format, log_level, log_file).
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    /// Log filter directive.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl LoggingArgs {
    fn resolve(self) -> Result<CliSettings, SettingsError> {
        let base = match &self.settings {
            Some(path) => load_settings(path)?,
            None => CliSettings::default(),
        };
        Ok(base.with_overrides(self.log_format, self.log_level, self.log_file))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a document and report every reference problem.
    Validate(ValidateArgs),
    /// List the declared columns and tool configs.
    Inspect(InspectArgs),
    /// Show the registration calls a builder would receive.
    Plan(SourceArgs),
    /// Print the JSON Schema of a columns document.
    Schema,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Validate(_) => "validate",
            Command::Inspect(_) => "inspect",
            Command::Plan(_) => "plan",
            Command::Schema => "schema",
        }
    }
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Path to a YAML columns document.
    #[arg(long, value_name = "PATH", conflicts_with = "yaml")]
    file: Option<PathBuf>,
    /// Inline YAML columns document.
    #[arg(long, value_name = "YAML")]
    yaml: Option<String>,
}

impl SourceArgs {
    fn into_source(self) -> Result<DocumentSource, CliError> {
        DocumentSource::from_parts(self.file, self.yaml)
            .map_err(|err| CliError::Config(err.into()))
    }
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Dump the normalized columns as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = cli.logging.resolve()?;
    init_logging(&settings)?;

    let command = cli.command.name();
    tracing::info!(event = "command_started", command);
    let timer = Instant::now();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Plan(args) => run_plan(args),
        Command::Schema => run_schema(),
    };

    let duration_ms = timer.elapsed().as_millis();
    match &result {
        Ok(()) => tracing::info!(
            event = "command_finished",
            command,
            status = "success",
            duration_ms = duration_ms
        ),
        Err(err) => tracing::error!(
            event = "command_finished",
            command,
            status = "failed",
            error = %err,
            duration_ms = duration_ms
        ),
    }
    result
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let report = DeclarativeColumns::check(args.source.into_source()?)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(CliError::Invalid(report.errors.len()))
    }
}

fn print_report(report: &ValidationReport) {
    for issue in &report.errors {
        print_issue("error", issue);
    }
    for issue in &report.warnings {
        print_issue("warning", issue);
    }
    if report.is_ok() {
        println!("document is valid ({} warning(s))", report.warnings.len());
    }
}

fn print_issue(label: &str, issue: &ValidationIssue) {
    println!("{label}[{}] {}: {}", issue.code, issue.path, issue.message);
    if let Some(hint) = &issue.hint {
        println!("  hint: {hint}");
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), CliError> {
    let config = DeclarativeColumns::load(args.source.into_source()?)?;

    if args.json {
        let document = json!({
            "origin": config.origin(),
            "columns": config.raw_columns()?,
            "tool_configs": config.tool_configs(),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("{}: {} column(s)", config.origin(), config.len());
    for column in config.columns() {
        let dropped = if column.drop { " [dropped]" } else { "" };
        println!("  {} ({}){dropped}", column.name, column.kind());
    }
    if config.has_tool_configs() {
        println!("tool configs:");
        for tool_config in config.tool_configs() {
            println!(
                "  {} -> {}",
                tool_config.tool_alias,
                tool_config.providers.join(", ")
            );
        }
    }
    for issue in &config.warnings().warnings {
        print_issue("warning", issue);
    }
    Ok(())
}

fn run_plan(args: SourceArgs) -> Result<(), CliError> {
    let config = DeclarativeColumns::load(args.into_source()?)?;
    let mut builder = RecordingBuilder::new();
    config.register(&mut builder)?;
    println!("{}", serde_json::to_string_pretty(builder.calls())?);
    Ok(())
}

fn run_schema() -> Result<(), CliError> {
    let schema = document_json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
