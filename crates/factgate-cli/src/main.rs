//! `factgate`: run data-quality assertion suites from a scheduler task.
//!
//! Exit codes:
//! - 0: every error-severity assertion passed
//! - 1: at least one assertion failed or could not be evaluated
//! - 2: usage, suite, or configuration error

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use factgate_core::config::DEFAULT_MAX_ROWS_SHOWN;
use factgate_core::{compile_sql, AssertionRunner, DirectorySource, RunConfig, Suite};

const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "factgate", version, about = "Evaluate data-quality assertions against materialized datasets")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a suite and exit non-zero if it fails
    Run(RunArgs),

    /// Parse and validate a suite without evaluating it
    Validate {
        /// Suite file (YAML, or JSON by .json extension)
        #[arg(long)]
        suite: PathBuf,
    },

    /// Print the SQL each assertion corresponds to
    Compile {
        #[arg(long)]
        suite: PathBuf,

        /// Schema that datasets are materialized into
        #[arg(long, env = "FACTGATE_SCHEMA")]
        schema: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(long)]
    suite: PathBuf,

    /// Directory holding materialized datasets (<name>.json or <name>.jsonl)
    #[arg(long, env = "FACTGATE_DATA_DIR")]
    data_dir: PathBuf,

    /// Schema that datasets are materialized into
    #[arg(long, env = "FACTGATE_SCHEMA")]
    schema: Option<String>,

    /// Evaluate `current_date` as this date (YYYY-MM-DD) instead of today (UTC)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Offending rows listed per assertion in text output
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS_SHOWN)]
    max_rows: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct CompiledAssertion<'a> {
    name: &'a str,
    dataset: &'a str,
    location: String,
    sql: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(command: Command) -> Result<ExitCode> {
    match command {
        Command::Run(args) => run(args),
        Command::Validate { suite } => {
            let suite = load_suite(&suite)?;
            println!(
                "Suite \"{}\" is valid: {} assertion(s) over {} dataset(s)",
                suite.name,
                suite.assertions.len(),
                suite.datasets().len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Compile {
            suite,
            schema,
            format,
        } => {
            let suite = load_suite(&suite)?;
            compile(&suite, schema.as_deref(), format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_suite(path: &Path) -> Result<Suite> {
    Suite::from_path(path).with_context(|| format!("Failed to load suite {}", path.display()))
}

fn run(args: RunArgs) -> Result<ExitCode> {
    let suite = load_suite(&args.suite)?;

    if !args.data_dir.is_dir() {
        anyhow::bail!("Data directory {} does not exist", args.data_dir.display());
    }

    let mut source = DirectorySource::new(&args.data_dir);
    if let Some(schema) = &args.schema {
        source = source.with_schema(schema);
    }

    let mut config = RunConfig::default().with_max_rows_shown(args.max_rows);
    if let Some(date) = args.as_of {
        config = config.with_as_of(date);
    }

    tracing::debug!(
        data_dir = %args.data_dir.display(),
        schema = args.schema.as_deref().unwrap_or("-"),
        as_of = ?config.as_of,
        "Run configured"
    );

    let clock = config.clock();
    let report = AssertionRunner::new(&source, clock.as_ref()).run(&suite);

    match args.format {
        OutputFormat::Text => print!("{}", report.render_text(config.max_rows_shown)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_FAILED))
    }
}

fn compile(suite: &Suite, schema: Option<&str>, format: OutputFormat) -> Result<()> {
    let compiled: Vec<CompiledAssertion<'_>> = suite
        .assertions
        .iter()
        .map(|assertion| {
            let location = match schema {
                Some(schema) => format!("{}.{}", schema, assertion.dataset.name()),
                None => assertion.dataset.name().to_string(),
            };
            CompiledAssertion {
                name: &assertion.name,
                dataset: assertion.dataset.name(),
                sql: compile_sql(assertion, &location),
                location,
            }
        })
        .collect();

    match format {
        OutputFormat::Text => {
            for item in &compiled {
                println!("-- {}\n{};\n", item.name, item.sql);
            }
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&compiled).context("Failed to serialize queries")?
        ),
    }

    Ok(())
}
