// scorebridge - enrich credit applications with batch risk scores
// and write the dashboard data file

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use scorebridge_cli::exit_codes::{EXIT_ERROR, EXIT_REMOTE_SCORING, EXIT_SUCCESS, EXIT_USAGE};
use scorebridge_cli::{run_pipeline, PipelineError, RunReport};
use scorebridge_config::{ConfigError, Overrides, Settings};
use scorebridge_io::{file_source, MySqlSource, RecordSource};
use scorebridge_scoring_client::ScoringClient;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scorebridge")]
#[command(about = "Score credit applications in batches and write the dashboard data file")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract applications, score them, reconcile and write the output file
    #[command(after_help = "\
Examples:
  scorebridge run
  scorebridge run --config scorebridge.toml --batch-size 200
  scorebridge run --input solicitudes.csv --output docs/data.json
  scorebridge run --endpoint http://localhost:8000/predict_batch --json")]
    Run {
        /// TOML settings file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read applications from a .json or .csv file instead of MySQL
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output file (default: docs/data.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Scoring endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Records per scoring request
        #[arg(long)]
        batch_size: Option<usize>,

        /// Maximum number of applications extracted from MySQL
        #[arg(long)]
        limit: Option<usize>,

        /// Scoring request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the run report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Only log warnings and errors
        #[arg(long, short = 'q', conflicts_with = "verbose")]
        quiet: bool,

        /// Log debug detail
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Print the effective settings (password redacted) and validate them
    Config {
        /// TOML settings file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("SCOREBRIDGE_COMMIT"), ")",
        "\ntarget:  ", env!("SCOREBRIDGE_TARGET"),
        "\nrequest: {\"clientes\": [...]}",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            input,
            output,
            endpoint,
            batch_size,
            limit,
            timeout,
            json,
            quiet,
            verbose,
        } => {
            init_logging(quiet, verbose);
            let overrides = Overrides {
                endpoint,
                batch_size,
                extract_limit: limit,
                timeout_secs: timeout,
                output,
            };
            cmd_run(config, input, overrides, json)
        }
        Commands::Config { config, json } => cmd_config(config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Env { var, .. } => Some(format!("unset {var} or fix its value")),
            ConfigError::Invalid(_) => Some("run `scorebridge config` to see the effective settings".to_string()),
            _ => None,
        };
        Self { code: EXIT_USAGE, message: err.to_string(), hint }
    }

    pub fn pipeline(err: PipelineError) -> Self {
        let hint = match &err {
            PipelineError::Source(scorebridge_io::SourceError::Connect(_)) => {
                Some("check BT_DB_HOST, BT_DB_PORT, BT_DB_USER and BT_DB_PASS".to_string())
            }
            PipelineError::Scoring { error, .. } if !error.is_remote() => {
                Some("the scoring service changed its response format".to_string())
            }
            _ => None,
        };
        Self { code: err.exit_code(), message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// `-q`/`-v` win over `RUST_LOG`; otherwise `RUST_LOG`, defaulting to `info`.
fn init_logging(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(config: Option<PathBuf>, overrides: &Overrides) -> Result<Settings, CliError> {
    let settings = Settings::load(config.as_deref())
        .map_err(CliError::config)?
        .apply_overrides(overrides);
    settings.validate().map_err(CliError::config)?;
    Ok(settings)
}

fn cmd_run(
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    overrides: Overrides,
    json_output: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config, &overrides)?;
    log::debug!("settings: {:?}", settings.redacted());

    let source: Box<dyn RecordSource> = match input {
        Some(path) => file_source(&path).map_err(|e| {
            CliError { code: EXIT_USAGE, message: e.to_string(), hint: None }
        })?,
        None => Box::new(MySqlSource::new(
            settings.database.clone(),
            settings.pipeline.extract_limit,
        )),
    };

    let scorer = ScoringClient::with_timeout(
        settings.scoring.endpoint.clone(),
        Duration::from_secs(settings.scoring.timeout_secs),
    )
    .map_err(|e| CliError { code: EXIT_REMOTE_SCORING, message: e.to_string(), hint: None })?;

    let report = run_pipeline(&settings, source.as_ref(), &scorer).map_err(CliError::pipeline)?;

    if json_output {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &RunReport) {
    eprintln!(
        "scored {} application(s) in {} chunk(s): {} result(s) merged by {}, {} unmatched",
        report.extracted, report.chunks, report.results, report.strategy, report.unmatched,
    );
    if report.mismatched_chunks > 0 {
        eprintln!(
            "warning: {} chunk(s) returned a different number of results than requested",
            report.mismatched_chunks
        );
    }
    eprintln!("wrote {} record(s) to {}", report.written, report.output.display());
}

fn cmd_config(config: Option<PathBuf>, json_output: bool) -> Result<(), CliError> {
    let settings = Settings::load(config.as_deref()).map_err(CliError::config)?;
    let shown = settings.redacted();

    let rendered = if json_output {
        serde_json::to_string_pretty(&shown)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?
    } else {
        toml::to_string_pretty(&shown)
            .map_err(|e| CliError::general(format!("TOML serialization error: {e}")))?
    };
    println!("{rendered}");

    settings
        .validate()
        .map_err(|e| CliError::config(e).with_hint("fix the settings above and retry"))
}
