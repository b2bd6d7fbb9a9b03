//! Symbion Analytics CLI
//!
//! Runs the analytics reports over a JSON file of sensor readings.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use symbion_analytics::{
    config::Config,
    core::clustering::{ClusterOptions, DEFAULT_MAX_ITERATIONS},
    core::patterns::DEFAULT_MAX_PATTERN_SCAN,
    readings::{load_readings, Period, Reading},
    report::{ReportBuilder, Rounded},
    VERSION,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "symbion-analytics")]
#[command(author = "Symbion")]
#[command(version = VERSION)]
#[command(about = "Statistical analysis of neurochemical sensor readings", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Also save the report under the configured export path
    #[arg(long, global = true)]
    save: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Statistics, trend and anomaly count per analyte
    Summary {
        /// JSON array of readings
        #[arg(long, short)]
        input: PathBuf,

        /// Look-back period (24h, 7d, 30d, 365d or all)
        #[arg(long, default_value = "7d")]
        period: Period,
    },

    /// Trend, moving average, forecast and change points
    Trends {
        #[arg(long, short)]
        input: PathBuf,

        /// Analyte name or reading field (all panel analytes if omitted)
        #[arg(long)]
        analyte: Option<String>,

        #[arg(long, default_value = "7d")]
        period: Period,

        /// Forecast steps (configured horizon if omitted)
        #[arg(long)]
        horizon: Option<usize>,
    },

    /// Correlation matrix and strongest analyte pairs
    Correlations {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, default_value = "7d")]
        period: Period,
    },

    /// Anomalies, risk assessment and insights
    Anomalies {
        #[arg(long, short)]
        input: PathBuf,

        /// Z-score threshold (configured value if omitted)
        #[arg(long)]
        sensitivity: Option<f64>,

        #[arg(long, default_value = "7d")]
        period: Period,
    },

    /// Recurring windows within one analyte
    Patterns {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long)]
        analyte: String,

        /// Window length in samples
        #[arg(long, default_value = "12")]
        length: usize,

        /// Minimum correlation magnitude of a match
        #[arg(long, default_value = "0.8")]
        threshold: f64,

        /// Refuse to scan sequences longer than this
        #[arg(long, default_value_t = DEFAULT_MAX_PATTERN_SCAN)]
        max_len: usize,

        #[arg(long, default_value = "all")]
        period: Period,
    },

    /// K-means clustering of complete readings
    Clusters {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, default_value = "3")]
        k: usize,

        /// Seed for the initial centroids
        #[arg(long, default_value = "0")]
        seed: u64,

        #[arg(long, default_value = "all")]
        period: Period,
    },

    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path:?}"))?;
    tracing::debug!("Loaded configuration from {:?}", config_path);

    let sink = Sink {
        output: cli.output,
        save_dir: cli.save.then(|| config.export_path.clone()),
    };

    let builder = ReportBuilder::new(config);
    tracing::debug!("Report instance {}", builder.instance_id());

    match cli.command {
        Commands::Summary { input, period } => {
            let readings = read_input(&input)?;
            let report = builder.summarize(&readings, period)?;
            sink.emit("summary", &report.rounded())
        }
        Commands::Trends {
            input,
            analyte,
            period,
            horizon,
        } => {
            let readings = read_input(&input)?;
            let horizon = horizon.unwrap_or(builder.config().thresholds.forecast_horizon);
            let report = builder.analyze_trend(&readings, period, analyte.as_deref(), horizon)?;
            sink.emit("trends", &report.rounded())
        }
        Commands::Correlations { input, period } => {
            let readings = read_input(&input)?;
            let report = builder.correlation_report(&readings, period)?;
            sink.emit("correlations", &report.rounded())
        }
        Commands::Anomalies {
            input,
            sensitivity,
            period,
        } => {
            let readings = read_input(&input)?;
            let report = builder.anomaly_report(&readings, period, sensitivity)?;
            sink.emit("anomalies", &report.rounded())
        }
        Commands::Patterns {
            input,
            analyte,
            length,
            threshold,
            max_len,
            period,
        } => {
            let readings = read_input(&input)?;
            let report =
                builder.pattern_report(&readings, period, &analyte, length, threshold, max_len)?;
            sink.emit("patterns", &report.rounded())
        }
        Commands::Clusters {
            input,
            k,
            seed,
            period,
        } => {
            let readings = read_input(&input)?;
            let options = ClusterOptions {
                k,
                seed,
                max_iterations: DEFAULT_MAX_ITERATIONS,
            };
            let report = builder.cluster_report(&readings, period, &options)?;
            sink.emit("clusters", &report.rounded())
        }
        Commands::Config => {
            tracing::info!("Config file: {:?}", config_path);
            sink.emit("config", builder.config())
        }
    }
}

/// Log to stderr so stdout stays clean JSON.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("symbion_analytics=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_input(path: &Path) -> anyhow::Result<Vec<Reading>> {
    let readings =
        load_readings(path).with_context(|| format!("Failed to read readings from {path:?}"))?;
    tracing::info!("Loaded {} readings from {:?}", readings.len(), path);
    Ok(readings)
}

/// Where rendered output goes.
struct Sink {
    output: Option<PathBuf>,
    save_dir: Option<PathBuf>,
}

impl Sink {
    fn emit<T: Serialize>(&self, name: &str, value: &T) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(value)?;

        if let Some(dir) = &self.save_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create export directory {dir:?}"))?;
            let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
            let path = dir.join(format!("{name}-{stamp}.json"));
            std::fs::write(&path, &json)
                .with_context(|| format!("Failed to write {path:?}"))?;
            tracing::info!("Saved {} report to {:?}", name, path);
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &json)
                    .with_context(|| format!("Failed to write {path:?}"))?;
                tracing::info!("Wrote {} report to {:?}", name, path);
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}
