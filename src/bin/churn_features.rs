//! churn-features CLI - build the per-member churn feature table
//!
//! With no flags, reads the four default sources under `data/` and prints the
//! first five rows of the merged table.

use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use churn_features::table::DEFAULT_HEAD_ROWS;
use churn_features::{FeatureError, FeatureMerger, FeatureTable, PipelineConfig, SourcePaths, VERSION};

/// Build the per-member churn feature table from raw source files
#[derive(Parser)]
#[command(name = "churn-features")]
#[command(version = VERSION)]
#[command(about = "Build the per-member churn feature table", long_about = None)]
struct Cli {
    /// Web visits CSV (member_id, title)
    #[arg(long, default_value = "data/web_visits.csv")]
    web: PathBuf,

    /// App usage CSV (member_id, event_type, timestamp)
    #[arg(long, default_value = "data/app_usage.csv")]
    app: PathBuf,

    /// Claims CSV (member_id, icd_code)
    #[arg(long, default_value = "data/claims.csv")]
    claims: PathBuf,

    /// Churn labels CSV (member_id, signup_date, churn_label)
    #[arg(long, default_value = "data/churn_labels.csv")]
    labels: PathBuf,

    /// Output format
    #[arg(long, default_value = "head")]
    format: OutputFormat,

    /// Rows shown by the head format
    #[arg(long, default_value_t = DEFAULT_HEAD_ROWS)]
    rows: usize,

    /// Output file path (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// First rows as a plain-text grid
    Head,
    /// Full table as CSV
    Csv,
    /// Full table as a JSON array
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliFailure> {
    let sources = SourcePaths {
        web_visits: cli.web,
        app_usage: cli.app,
        claims: cli.claims,
        churn_labels: cli.labels,
    };
    let merger = FeatureMerger::new(PipelineConfig::new().with_sources(sources));
    tracing::info!(
        reference_date = %merger.config().reference_date,
        "building churn feature table"
    );
    let table = merger.run()?;

    if cli.output.to_string_lossy() == "-" {
        let stdout = io::stdout();
        write_table(&table, &cli.format, cli.rows, stdout.lock())
    } else {
        let file = File::create(&cli.output)?;
        write_table(&table, &cli.format, cli.rows, BufWriter::new(file))
    }
}

fn write_table<W: Write>(
    table: &FeatureTable,
    format: &OutputFormat,
    rows: usize,
    mut out: W,
) -> Result<(), CliFailure> {
    match format {
        OutputFormat::Head => writeln!(out, "{}", table.head(rows))?,
        OutputFormat::Csv => table.write_csv(&mut out)?,
        OutputFormat::Json => writeln!(out, "{}", table.to_json()?)?,
        OutputFormat::JsonPretty => writeln!(out, "{}", table.to_json_pretty()?)?,
    }
    out.flush()?;
    Ok(())
}

#[derive(Debug)]
enum CliFailure {
    Io(io::Error),
    Feature(FeatureError),
}

impl From<io::Error> for CliFailure {
    fn from(e: io::Error) -> Self {
        CliFailure::Io(e)
    }
}

impl From<FeatureError> for CliFailure {
    fn from(e: FeatureError) -> Self {
        CliFailure::Feature(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliFailure> for CliError {
    fn from(e: CliFailure) -> Self {
        match e {
            CliFailure::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the output path and permissions".to_string()),
            },
            CliFailure::Feature(e) => {
                let (code, hint) = match &e {
                    FeatureError::Io { .. } => {
                        ("SOURCE_NOT_FOUND", "Check the input file paths")
                    }
                    FeatureError::MissingColumn { .. } => {
                        ("SCHEMA_ERROR", "Ensure the source has all required columns")
                    }
                    FeatureError::MissingValue { .. }
                    | FeatureError::TimestampParse { .. }
                    | FeatureError::DateParse { .. } => {
                        ("PARSE_ERROR", "Fix the offending row and rerun")
                    }
                    FeatureError::DuplicateMember { .. } => {
                        ("DUPLICATE_MEMBER", "Churn labels must have one row per member")
                    }
                    FeatureError::Csv(_) => ("CSV_ERROR", "Check CSV syntax"),
                    FeatureError::Json(_) => ("JSON_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
        }
    }
}
