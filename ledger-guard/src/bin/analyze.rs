//! Command-line entry point: analyze one dataset file and print the report.
//!
//! ```text
//! analyze transactions.csv --format human
//! analyze transactions.csv --format ci --max-failures 5
//! ```
//!
//! Reads `.env` when present, so `GOOGLE_API_KEY` can live there. Exits with
//! status 2 when the file cannot be loaded and 1 on any other failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use ledger_guard::advisory::{advisor_from_config, AdvisoryConfig};
use ledger_guard::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, ReportFormatter};
use ledger_guard::logging::setup::{init_logging, LoggingConfig};
use ledger_guard::logging::LogConfig;
use ledger_guard::pipeline::HealthPipeline;
use tracing::{error, warn, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full response as JSON
    Json,
    /// Readable report with dimensions, failures and advice
    Human,
    /// Overall score only
    Summary,
    /// Readable report without advice, capped at ten failures
    Ci,
}

impl OutputFormat {
    fn formatter_config(self) -> Option<FormatterConfig> {
        match self {
            OutputFormat::Json => None,
            OutputFormat::Human => Some(FormatterConfig::default()),
            OutputFormat::Summary => Some(FormatterConfig::minimal()),
            OutputFormat::Ci => Some(FormatterConfig::ci()),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "analyze", version, about = "Score a financial dataset for compliance and data health")]
struct Cli {
    /// Dataset to analyze (.csv, .tsv, .txt, .json, .jsonl, .ndjson, .parquet)
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Maximum failed rules listed in readable output
    #[arg(long)]
    max_failures: Option<usize>,

    /// Disable colors in readable output
    #[arg(long)]
    no_color: bool,

    /// Skip the advisory narrative even when an API key is configured
    #[arg(long)]
    no_advice: bool,

    /// Log level for ledger-guard events
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log the details of every failed rule
    #[arg(long)]
    verbose_rules: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let logging = LoggingConfig::default()
        .with_crate_level(cli.log_level)
        .with_json_format(cli.json_logs);
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let advisor = if cli.no_advice {
        None
    } else {
        match advisor_from_config(AdvisoryConfig::from_env()) {
            Ok(advisor) => advisor,
            Err(e) => {
                warn!(error = %e, "Could not build advisor");
                None
            }
        }
    };

    let log_config = if cli.verbose_rules {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let pipeline = HealthPipeline::new().with_log_config(log_config);

    let response = match pipeline.analyze_file(&cli.file, advisor.as_deref()).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, file = %cli.file.display(), "Analysis failed");
            eprintln!("{e}");
            return if e.is_input_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            };
        }
    };

    let rendered = match cli.format.formatter_config() {
        None => JsonFormatter::new().format(&response),
        Some(mut config) => {
            if let Some(max) = cli.max_failures {
                config = config.with_max_failures(max);
            }
            if cli.no_color {
                config = config.with_colors(false);
            }
            HumanFormatter::with_config(config).format(&response)
        }
    };

    match rendered {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
