//! CLI entry point for the departure delay monitor.
//!
//! Provides subcommands for polling the departure boards of a station list
//! and summarising delays, and for building a station list by name search.

use anyhow::Result;
use clap::{Parser, Subcommand};
use hafas_delays::analyzers::delays::DelaySummary;
use hafas_delays::infra::hafas::{DEFAULT_TIMEOUT, HafasClient, HafasProfile};
use hafas_delays::infra::hafas::request::DEFAULT_DURATION_MINUTES;
use hafas_delays::output::{print_summary, write_delays, write_departures, write_stations};
use hafas_delays::pipeline::{DEFAULT_CONCURRENCY, process_stations};
use hafas_delays::services::board_api::{StationQuery, StationSearchApi};
use hafas_delays::stations::load_station_ids;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hafas_delays")]
#[command(about = "Poll departure boards and summarise delays per line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the boards of every station in a list and compute mean delays
    Delays {
        /// CSV file with an `extId` column
        #[arg(short, long, default_value = "data/stations.csv")]
        stations: String,

        /// CSV file receiving every departure row
        #[arg(short, long, default_value = "departures.csv")]
        output: String,

        /// CSV file receiving the mean delay per line and direction
        #[arg(short, long, default_value = "delays.csv")]
        delays_output: String,

        /// Maximum number of concurrent board requests
        #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Board lookahead window in minutes
        #[arg(long, default_value_t = DEFAULT_DURATION_MINUTES)]
        duration: u32,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
        timeout_secs: u64,

        /// Optional JSON profile overriding endpoint and client settings
        #[arg(long)]
        profile: Option<String>,
    },
    /// Search stops by name and write them as a station list
    Stations {
        /// Name fragment to search for
        #[arg(short, long)]
        query: String,

        /// Search radius in metres
        #[arg(long, default_value_t = 1000)]
        dist: u32,

        /// Maximum number of matches
        #[arg(long, default_value_t = 50)]
        max_loc: u32,

        /// Only keep stops whose name starts with this prefix
        #[arg(long)]
        starts_with: Option<String>,

        /// CSV file to write the station list to
        #[arg(short, long, default_value = "data/stations.csv")]
        output: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
        timeout_secs: u64,

        /// Optional JSON profile overriding endpoint and client settings
        #[arg(long)]
        profile: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/hafas_delays.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hafas_delays.log"));

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
        Commands::Delays {
            stations,
            output,
            delays_output,
            concurrency,
            duration,
            timeout_secs,
            profile,
        } => {
            let profile = HafasProfile::load_or_default(profile.as_deref())?;
            let client = HafasClient::new(profile, Duration::from_secs(timeout_secs))?
                .with_duration(duration);

            let station_ids = load_station_ids(&stations)?;
            info!(stations = station_ids.len(), path = %stations, "Station list loaded");

            let aggregate = process_stations(Arc::new(client), &station_ids, concurrency).await;

            if aggregate.is_empty() {
                warn!("No data was processed successfully.");
                return Ok(());
            }

            let rows = write_departures(&output, &aggregate)?;
            info!(rows, path = %output, "Departures written");

            let summary = DelaySummary::from_table(&aggregate);
            print_summary(&summary);
            let groups = write_delays(&delays_output, &summary)?;
            info!(groups, path = %delays_output, "Delay summary written");
        }
        Commands::Stations {
            query,
            dist,
            max_loc,
            starts_with,
            output,
            timeout_secs,
            profile,
        } => {
            let profile = HafasProfile::load_or_default(profile.as_deref())?;
            let client = HafasClient::new(profile, Duration::from_secs(timeout_secs))?;

            let query = StationQuery {
                name: query,
                dist,
                max_loc,
            };
            let mut found = client.search_stations(&query).await?;
            info!(matches = found.len(), query = %query.name, "Station search finished");

            if let Some(prefix) = starts_with.as_deref() {
                found.retain(|s| s.name.starts_with(prefix));
            }

            let rows = write_stations(&output, &found)?;
            info!(rows, path = %output, "Station list written");
        }
    }

    Ok(())
}
