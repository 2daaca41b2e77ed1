//! CLI entry point for the Cyclistic trip analysis tool.
//!
//! Provides subcommands for running the full analysis over synthetic or
//! loaded trip data, and for writing a synthetic dataset to CSV.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use cyclistic_eda::analyzers::analyzer::{Analysis, run, run_raw};
use cyclistic_eda::analyzers::writetos3::upload_artifacts;
use cyclistic_eda::{
    config::{AnalysisConfig, DEFAULT_RECORDS, DEFAULT_SEED, DEFAULT_YEAR, SourceConfig},
    features::Locale,
    loader::load_raw_trips,
    model::UserClass,
    output::{print_json, print_pretty, write_artifacts, write_trips},
    synthetic::generate,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cyclistic_eda")]
#[command(about = "Exploratory analysis of bike-share trips by rider type", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, aggregate and report on trip data
    Analyze {
        /// Trip CSV (path or URL) to analyze instead of synthetic data
        #[arg(short, long, value_name = "FILE_OR_URL")]
        input: Option<String>,

        /// Number of synthetic trips to generate
        #[arg(short = 'n', long, default_value_t = DEFAULT_RECORDS)]
        records: usize,

        /// Random seed for synthetic data
        #[arg(short, long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Calendar year synthetic trips are spread over
        #[arg(short, long, default_value_t = DEFAULT_YEAR)]
        year: i32,

        /// Directory to write charts, summary and processed CSV to
        #[arg(short, long, default_value = "cyclistic_output")]
        output_dir: String,

        /// Language for weekday and month labels (en, pt-br)
        #[arg(short, long, default_value_t = Locale::En)]
        locale: Locale,

        /// Gzip the processed CSV export
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Optional: S3 bucket name to upload artifacts to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,
    },
    /// Write a synthetic trip dataset in the Divvy CSV layout
    Generate {
        /// Number of trips to generate
        #[arg(short = 'n', long, default_value_t = DEFAULT_RECORDS)]
        records: usize,

        /// Random seed
        #[arg(short, long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Calendar year trips are spread over
        #[arg(short, long, default_value_t = DEFAULT_YEAR)]
        year: i32,

        /// CSV file to write
        #[arg(short, long, default_value = "trips.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/cyclistic_eda.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cyclistic_eda.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            records,
            seed,
            year,
            output_dir,
            locale,
            gzip,
            s3_bucket,
        } => {
            let config = AnalysisConfig {
                source: SourceConfig::default()
                    .with_records(records)
                    .with_seed(seed)
                    .with_year(year),
                locale,
                ..Default::default()
            };

            let analysis = match input {
                Some(source) => {
                    let token = std::env::var("TRIPS_SOURCE_TOKEN").ok();
                    let rows = load_raw_trips(&source, token.as_deref()).await?;
                    run_raw(rows, &config)?
                }
                None => {
                    warn!("No input given, using synthetic trip data");
                    run(generate(&config.source)?, &config)
                }
            };

            log_insights(&analysis);
            print_pretty(&analysis.report);
            print_json(&analysis.report)?;

            let paths = write_artifacts(Path::new(&output_dir), &analysis, gzip)?;

            match s3_bucket {
                Some(bucket) if !bucket.is_empty() => {
                    let aws = aws_config::load_from_env().await;
                    let s3 = aws_sdk_s3::Client::new(&aws);
                    let prefix = format!("runs/{}", Utc::now().format("%Y-%m-%dT%H%M%S"));

                    let uploaded = upload_artifacts(&s3, &bucket, &prefix, &paths).await?;
                    info!(bucket = %bucket, prefix = %prefix, uploaded, "S3 upload complete");
                }
                _ => info!("S3 bucket not specified, skipping upload"),
            }

            info!(output_dir = %output_dir, artifacts = paths.len(), "Analysis finished");
        }
        Commands::Generate {
            records,
            seed,
            year,
            output,
        } => {
            let source = SourceConfig::default()
                .with_records(records)
                .with_seed(seed)
                .with_year(year);
            let trips = generate(&source)?;
            write_trips(Path::new(&output), &trips)?;
        }
    }

    Ok(())
}

/// Logs the headline findings of a run.
fn log_insights(analysis: &Analysis) {
    let summary = &analysis.report.summary;

    info!(
        total = summary.total_trips,
        members = summary.subscriber_trips,
        members_pct = %format!("{:.1}", summary.subscriber_pct),
        casual = summary.occasional_trips,
        casual_pct = %format!("{:.1}", summary.occasional_pct),
        "Processed dataset"
    );

    info!(
        casual_mean_minutes = %format!("{:.1}", summary.occasional_mean_minutes),
        member_mean_minutes = %format!("{:.1}", summary.subscriber_mean_minutes),
        casual_longer_pct = %format!("{:.1}", summary.duration_delta_pct),
        "Trip duration"
    );

    for class in UserClass::ALL {
        if let Some(peaks) = summary.peaks_for(class) {
            info!(
                user_class = %class,
                peak_weekday = %peaks.peak_weekday,
                peak_hour = peaks.peak_hour,
                busiest_month = %peaks.busiest_month,
                "Usage peaks"
            );
        }
    }
}
