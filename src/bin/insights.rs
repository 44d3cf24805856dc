//! Insights CLI - Command-line interface for Emotion Insights
//!
//! Commands:
//! - analyze: Full analysis report over a date range
//! - predict: Mood prediction with recommendations and insights
//! - recommend: Recommendations for a current emotion state
//! - validate: Validate emotion records
//! - config: Print the analysis configuration

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use emotion_insights::adapter::{RawRecord, RecordAdapter};
use emotion_insights::encoder::{Presentable, ReportEncoder};
use emotion_insights::types::{EmotionRecord, EmotionVector};
use emotion_insights::{AnalyticsConfig, ComputeError, EmotionAnalyzer, INSIGHTS_VERSION};

/// Insights - Emotion analytics and scoring engine
#[derive(Parser)]
#[command(name = "insights")]
#[command(version = INSIGHTS_VERSION)]
#[command(about = "Turn emotion detections into patterns, scores and recommendations", long_about = None)]
struct Cli {
    /// Analysis configuration file (JSON); defaults apply to omitted fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis report over an inclusive date range
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// First day of the range (YYYY-MM-DD); defaults to the earliest record
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day of the range (YYYY-MM-DD); defaults to the latest record
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Mood prediction with recommendations and insights
    Predict {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Recommendations for a current emotion state
    Recommend {
        /// Current emotions as a JSON object with all seven emotions
        #[arg(long)]
        current: String,

        /// History file path (use - for stdin); no history when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Validate emotion records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the analysis configuration in effect
    Config,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), InsightsCliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            input_format,
            start,
            end,
            output_format,
        } => cmd_analyze(&config, &input, input_format, start, end, output_format),

        Commands::Predict {
            input,
            input_format,
            output_format,
        } => cmd_predict(&config, &input, input_format, output_format),

        Commands::Recommend {
            current,
            input,
            input_format,
            output_format,
        } => cmd_recommend(&config, &current, input.as_deref(), input_format, output_format),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig, InsightsCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(AnalyticsConfig::from_json(&json)?)
        }
        None => Ok(AnalyticsConfig::default()),
    }
}

fn cmd_analyze(
    config: &AnalyticsConfig,
    input: &Path,
    input_format: InputFormat,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output_format: OutputFormat,
) -> Result<(), InsightsCliError> {
    let records = read_records(input, &input_format)?;

    let first = records.first().map(|r| r.timestamp.date_naive());
    let last = records.last().map(|r| r.timestamp.date_naive());
    let (start, end) = match (start.or(first), end.or(last)) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(InsightsCliError::NoRecords),
    };

    let report = EmotionAnalyzer::new(*config).analyze(&records, start, end)?;
    write_report(&report, &output_format)
}

fn cmd_predict(
    config: &AnalyticsConfig,
    input: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), InsightsCliError> {
    let records = read_records(input, &input_format)?;
    let report = EmotionAnalyzer::new(*config).predict_mood(&records);
    write_report(&report, &output_format)
}

fn cmd_recommend(
    config: &AnalyticsConfig,
    current: &str,
    input: Option<&Path>,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), InsightsCliError> {
    let current: EmotionVector = serde_json::from_str(current)?;
    let history = match input {
        Some(path) => read_records(path, &input_format)?,
        None => Vec::new(),
    };

    let report = EmotionAnalyzer::new(*config).recommend_for_current(&current, &history);
    write_report(&report, &output_format)
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), InsightsCliError> {
    let raw = read_raw(input, &input_format)?;
    let issues = RecordAdapter::validate_batch(&raw);

    let report = ValidationReport {
        total_records: raw.len(),
        valid_records: raw.len() - issues.len(),
        invalid_records: issues.len(),
        errors: issues
            .into_iter()
            .map(|issue| ValidationErrorDetail {
                index: issue.index,
                session_id: issue.session_id,
                error: issue.error,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} (session {}): {}",
                    err.index, err.session_id, err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(InsightsCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn read_input(input: &Path) -> Result<String, InsightsCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            tracing::warn!("reading records from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_raw(input: &Path, input_format: &InputFormat) -> Result<Vec<RawRecord>, InsightsCliError> {
    let data = read_input(input)?;
    let raw = match input_format {
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(&data)?,
        InputFormat::Json => RecordAdapter::parse_array(&data)?,
    };
    Ok(raw)
}

fn read_records(
    input: &Path,
    input_format: &InputFormat,
) -> Result<Vec<EmotionRecord>, InsightsCliError> {
    let raw = read_raw(input, input_format)?;
    let mut records = RecordAdapter::to_records(&raw)?;
    RecordAdapter::sort_chronologically(&mut records);
    tracing::debug!(records = records.len(), "loaded records");
    Ok(records)
}

fn write_report<T: Presentable + Serialize>(
    report: &T,
    format: &OutputFormat,
) -> Result<(), InsightsCliError> {
    let payload = ReportEncoder::new().encode(report);
    let output = match format {
        OutputFormat::Json => serde_json::to_string(&payload)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&payload)?,
    };
    println!("{}", output);
    Ok(())
}

// Error types

#[derive(Debug)]
enum InsightsCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
}

impl From<io::Error> for InsightsCliError {
    fn from(e: io::Error) -> Self {
        InsightsCliError::Io(e)
    }
}

impl From<ComputeError> for InsightsCliError {
    fn from(e: ComputeError) -> Self {
        InsightsCliError::Compute(e)
    }
}

impl From<serde_json::Error> for InsightsCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightsCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightsCliError> for CliError {
    fn from(e: InsightsCliError) -> Self {
        match e {
            InsightsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightsCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::Validation(_) => {
                        ("VALIDATION_ERROR", "Run 'insights validate' for details")
                    }
                    ComputeError::InvalidDateRange(_) => {
                        ("DATE_RANGE_ERROR", "The end date must not precede the start date")
                    }
                    ComputeError::ConfigError(_) => {
                        ("CONFIG_ERROR", "Run 'insights config' to see valid settings")
                    }
                    _ => ("PARSE_ERROR", "Ensure each record has timestamp, emotions and session_id"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            InsightsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightsCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Pass --start and --end, or provide at least one record".to_string()),
            },
            InsightsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    session_id: String,
    error: String,
}
