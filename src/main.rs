//! CLI entry point for the station traffic tool.
//!
//! Loads station and trip datasets, then computes per-station traffic for
//! a time-of-day filter, renders marker styles for a map layer, or sweeps
//! the slider across the whole day.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use station_traffic::{
    aggregate::{TrafficAggregator, WindowSummary},
    config::RenderConfig,
    fetch::{BasicClient, load_source},
    model::Station,
    output::{SweepRow, append_records, print_json, print_pretty, write_json, write_traffic_csv},
    parser::{parse_stations, parse_trips},
    style::MarkerStyler,
    time::{MINUTES_PER_DAY, TimeFilter},
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

const DEFAULT_STATIONS_SOURCE: &str = "https://dsc106.com/labs/lab07/data/bluebikes-stations.json";
const DEFAULT_TRIPS_SOURCE: &str =
    "https://dsc106.com/labs/lab07/data/bluebikes-traffic-2024-03.csv";

#[derive(Parser)]
#[command(name = "station_traffic")]
#[command(about = "Bike-share station traffic by time of day", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// Station information JSON (path or URL); falls back to STATIONS_SOURCE
    #[arg(long)]
    stations: Option<String>,

    /// Trip CSV, optionally gzipped (path or URL); falls back to TRIPS_SOURCE
    #[arg(long)]
    trips: Option<String>,

    /// JSON file with rendering and loading settings
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute departures, arrivals and total traffic per station
    Traffic {
        #[command(flatten)]
        data: DataArgs,

        /// Time filter: "any", -1, a minute of day (0-1439) or HH:MM
        #[arg(short, long, default_value = "any", allow_hyphen_values = true)]
        time: TimeFilter,

        /// CSV file to write results to
        #[arg(short, long, default_value = "station_traffic.csv")]
        output: String,
    },
    /// Compute styled station markers for a map layer
    Markers {
        #[command(flatten)]
        data: DataArgs,

        /// Time filter: "any", -1, a minute of day (0-1439) or HH:MM
        #[arg(short, long, default_value = "any", allow_hyphen_values = true)]
        time: TimeFilter,

        /// JSON file to write the marker layer to
        #[arg(short, long, default_value = "markers.json")]
        output: String,
    },
    /// Compute station traffic for every slider step across the day
    Sweep {
        #[command(flatten)]
        data: DataArgs,

        /// Minutes between consecutive window centres
        #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u16).range(1..1440))]
        step: u16,

        /// CSV file to write one row per station and window
        #[arg(short, long, default_value = "sweep.csv")]
        output: String,

        /// Append to an existing output file instead of replacing it
        #[arg(long, default_value_t = false)]
        append: bool,
    },
    /// Print the slider label for a time filter
    Label {
        /// Time filter: "any", -1, a minute of day (0-1439) or HH:MM
        #[arg(value_name = "TIME", allow_hyphen_values = true)]
        time: TimeFilter,
    },
}

/// Datasets loaded once at start-up, ready for repeated queries.
struct Loaded {
    stations: Vec<Station>,
    aggregator: TrafficAggregator,
    config: RenderConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/station_traffic.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("station_traffic.log"));

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
        Commands::Traffic { data, time, output } => {
            let loaded = load_datasets(&data).await?;
            let traffic = loaded
                .aggregator
                .compute_station_traffic(&loaded.stations, time);

            print_pretty(&traffic);
            print_json(&WindowSummary::from_traffic(time, &traffic))?;
            write_traffic_csv(&output, &traffic)?;
            info!(output = %output, filter = %time, stations = traffic.len(), "Station traffic written");
        }
        Commands::Markers { data, time, output } => {
            let loaded = load_datasets(&data).await?;
            let unfiltered = loaded
                .aggregator
                .compute_station_traffic(&loaded.stations, TimeFilter::Any);
            let styler = MarkerStyler::new(&loaded.config, &unfiltered);

            let traffic = if time.is_filtered() {
                loaded
                    .aggregator
                    .compute_station_traffic(&loaded.stations, time)
            } else {
                unfiltered
            };

            let layer = styler.layer(&traffic, time);
            write_json(&output, &layer)?;
            info!(output = %output, filter = %time, markers = layer.markers.len(), "Marker layer written");
        }
        Commands::Sweep {
            data,
            step,
            output,
            append,
        } => {
            let loaded = load_datasets(&data).await?;
            sweep(&loaded, step, &output, append)?;
        }
        Commands::Label { time } => {
            info!(slider = time.slider_value(), label = %time.label(), "Slider label");
        }
    }

    Ok(())
}

/// Fetches both datasets concurrently and builds the minute indexes.
#[tracing::instrument(skip(data))]
async fn load_datasets(data: &DataArgs) -> Result<Loaded> {
    let config = RenderConfig::load_or_default(data.config.as_deref())?;

    let stations_source = resolve_source(&data.stations, "STATIONS_SOURCE", DEFAULT_STATIONS_SOURCE);
    let trips_source = resolve_source(&data.trips, "TRIPS_SOURCE", DEFAULT_TRIPS_SOURCE);
    info!(stations = %stations_source, trips = %trips_source, "Loading datasets");

    let client = BasicClient::new();
    let (station_bytes, trip_bytes) = tokio::try_join!(
        load_source(&client, &stations_source),
        load_source(&client, &trips_source),
    )?;

    let stations = parse_stations(&station_bytes)?;
    let trip_load = parse_trips(&trip_bytes, config.skip_malformed_trips)?;
    if trip_load.skipped > 0 {
        warn!(skipped = trip_load.skipped, "Malformed trip rows were skipped");
    }

    let aggregator = TrafficAggregator::with_window(trip_load.trips, config.window());
    info!(
        stations = stations.len(),
        trips = aggregator.trips().len(),
        "Datasets loaded"
    );

    Ok(Loaded {
        stations,
        aggregator,
        config,
    })
}

fn resolve_source(arg: &Option<String>, env_var: &str, default: &str) -> String {
    arg.clone()
        .or_else(|| std::env::var(env_var).ok())
        .unwrap_or_else(|| default.to_string())
}

/// Replays the slider across the day, one window every `step` minutes.
#[tracing::instrument(skip(loaded))]
fn sweep(loaded: &Loaded, step: u16, output: &str, append: bool) -> Result<()> {
    if !append && Path::new(output).exists() {
        std::fs::remove_file(output)?;
    }

    let mut windows = 0;
    for minute in (0..MINUTES_PER_DAY).step_by(step as usize) {
        let filter = TimeFilter::At(minute);
        let traffic = loaded
            .aggregator
            .compute_station_traffic(&loaded.stations, filter);

        let rows: Vec<SweepRow> = traffic.iter().map(|t| SweepRow::new(filter, t)).collect();
        append_records(output, &rows)?;

        let summary = WindowSummary::from_traffic(filter, &traffic);
        info!(
            minute,
            label = %summary.label,
            departures = summary.departures,
            arrivals = summary.arrivals,
            busiest = summary.busiest_station.as_deref().unwrap_or("-"),
            mean_traffic = summary.mean_traffic,
            stddev_traffic = summary.stddev_traffic,
            "Window aggregated"
        );
        windows += 1;
    }

    info!(output, windows, "Sweep complete");
    Ok(())
}
