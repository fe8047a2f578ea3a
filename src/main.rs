//! CLI entry point for the fleet analytics engine.
//!
//! Loads fleet records from a directory of CSV exports and runs one analysis
//! per invocation: maintenance predictions, health scores, cost analysis,
//! alert sweeps, route efficiency, optimization suggestions, driver and
//! fleet roll-ups, and cost per student.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fleet_analytics::cancel::CancellationToken;
use fleet_analytics::clock::SystemClock;
use fleet_analytics::config::AnalyticsConfig;
use fleet_analytics::output::{append_records, print_json, print_pretty};
use fleet_analytics::store::InMemoryStore;
use fleet_analytics::FleetAnalytics;
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleet_analytics")]
#[command(about = "Predictive maintenance and route analytics for a school-bus fleet", long_about = None)]
struct Cli {
    /// Directory holding vehicles.csv, routes.csv, maintenance.csv, ...
    #[arg(short, long, env = "FLEET_DATA_DIR", default_value = "data")]
    data_dir: String,

    /// Optional JSON file overriding cost constants and sweep bounds
    #[arg(short, long, env = "FLEET_CONFIG")]
    config: Option<String>,

    /// Print results as JSON instead of debug format
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict upcoming maintenance for one vehicle
    Predict { vehicle_id: i64 },
    /// Predict upcoming maintenance for every vehicle
    PredictFleet,
    /// Composite health score for one vehicle
    Health { vehicle_id: i64 },
    /// Health scores for every vehicle, worst first
    HealthFleet,
    /// Maintenance cost breakdown for a vehicle over a period
    Costs {
        vehicle_id: i64,
        #[arg(value_name = "START")]
        start: NaiveDate,
        #[arg(value_name = "END")]
        end: NaiveDate,
    },
    /// Sweep the fleet for urgent maintenance alerts
    Alerts {
        /// CSV file to append alerts to
        #[arg(long)]
        csv: Option<String>,
    },
    /// Efficiency metrics for every route on a date
    Efficiency { date: NaiveDate },
    /// Ranked optimization suggestions for a date
    Suggest { date: NaiveDate },
    /// Performance roll-up for one driver
    Driver {
        driver_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Fleet-wide roll-up, cancelled on timeout or Ctrl+C
    Fleet { start: NaiveDate, end: NaiveDate },
    /// Transportation cost per student-day
    CostPerStudent { start: NaiveDate, end: NaiveDate },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fleet_analytics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fleet_analytics.log"));

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

    let config = match &cli.config {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };
    let store = InMemoryStore::load_dir(&cli.data_dir)
        .with_context(|| format!("loading fleet data from {}", cli.data_dir))?;
    let engine = FleetAnalytics::new(Arc::new(store), Arc::new(SystemClock), config);

    let json = cli.json;
    match cli.command {
        Commands::Predict { vehicle_id } => emit(json, &engine.predict(vehicle_id)?)?,
        Commands::PredictFleet => emit(json, &engine.predict_fleet()?)?,
        Commands::Health { vehicle_id } => emit(json, &engine.score(vehicle_id)?)?,
        Commands::HealthFleet => emit(json, &engine.score_fleet()?)?,
        Commands::Costs {
            vehicle_id,
            start,
            end,
        } => emit(json, &engine.analyze_costs(vehicle_id, start, end)?)?,
        Commands::Alerts { csv } => {
            let sweep = engine.sweep_alerts()?;
            if let Some(path) = csv {
                append_records(&path, &sweep.alerts)?;
                info!(path = %path, alerts = sweep.alerts.len(), "Alerts written");
            }
            emit(json, &sweep)?;
        }
        Commands::Efficiency { date } => emit(json, &engine.route_efficiency_on(date)?)?,
        Commands::Suggest { date } => emit(json, &engine.suggest(date)?)?,
        Commands::Driver {
            driver_id,
            start,
            end,
        } => emit(json, &engine.driver_performance(driver_id, start, end)?)?,
        Commands::Fleet { start, end } => {
            let summary = fleet_summary(&engine, start, end).await?;
            emit(json, &summary)?;
        }
        Commands::CostPerStudent { start, end } => {
            emit(json, &engine.cost_per_student(start, end)?)?
        }
    }

    Ok(())
}

fn emit<T: Serialize + Debug>(json: bool, value: &T) -> Result<()> {
    if json {
        print_json(value)
    } else {
        print_pretty(value);
        Ok(())
    }
}

/// Runs the fleet roll-up on a blocking thread; its token fires on the
/// configured timeout or on Ctrl+C, and the partial summary is kept.
#[tracing::instrument(skip(engine))]
async fn fleet_summary(
    engine: &FleetAnalytics,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<fleet_analytics::analyzers::types::FleetAnalyticsSummary> {
    let token = CancellationToken::with_timeout(engine.config().fleet_summary_timeout());

    let worker = {
        let engine = engine.clone();
        let token = token.clone();
        tokio::task::spawn_blocking(move || engine.fleet_summary_with_token(start, end, &token))
    };

    let watcher = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling fleet summary");
                token.cancel();
            }
        })
    };

    let summary = worker.await?;
    watcher.abort();
    Ok(summary?)
}
