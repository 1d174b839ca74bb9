use anyhow::{Context, Result, bail};
use chrono::Duration;
use clap::{Parser, Subcommand};
use ppg_bp::application::ml::{BpPredictor, LinearBpScorer, SmartCoreBpScorer};
use ppg_bp::application::processor::{PulseSelection, SignalProcessor};
use ppg_bp::config::Config;
use ppg_bp::domain::ports::{BpScorer, ReadingRepository};
use ppg_bp::domain::risk::{CvdRiskScorer, ReadingInsights};
use ppg_bp::domain::signal::Signal;
use ppg_bp::infrastructure::persistence::csv_io;
use ppg_bp::infrastructure::{InMemoryReadingRepository, PipelineMetrics};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate blood pressure from a PPG recording
    Estimate {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        sample_rate: Option<f64>,

        /// Model bundle (JSON)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// forest | linear
        #[arg(long, default_value = "forest")]
        scorer: String,

        /// first | mean | median
        #[arg(long)]
        selection: Option<String>,

        /// Print pipeline metrics after the estimate
        #[arg(long)]
        metrics: bool,
    },
    /// Print the per-pulse features of a PPG recording as CSV
    Features {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        sample_rate: Option<f64>,
    },
    /// Cardiovascular risk and insights from stored readings
    Risk {
        #[arg(short, long)]
        input: PathBuf,

        /// Reporting window ending at the latest reading
        #[arg(long)]
        window_days: Option<i64>,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_toml_file(path),
        None => Config::from_env(),
    }
}

fn load_scorer(kind: &str, path: &Path) -> Result<Arc<dyn BpScorer>> {
    match kind.to_lowercase().as_str() {
        "forest" => Ok(Arc::new(SmartCoreBpScorer::new(path.to_path_buf()))),
        "linear" => Ok(Arc::new(
            LinearBpScorer::from_json_file(path).context("Failed to load linear model")?,
        )),
        other => bail!("Invalid scorer: {}. Must be 'forest' or 'linear'", other),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Estimate {
            input,
            sample_rate,
            model,
            scorer,
            selection,
            metrics,
        } => {
            let sample_rate = sample_rate.unwrap_or(config.pipeline.sample_rate_hz);
            let selection = match selection {
                Some(s) => s.parse::<PulseSelection>()?,
                None => config.pipeline.pulse_selection,
            };
            let model_path = model.unwrap_or_else(|| config.pipeline.model_path.clone());
            let scorer = load_scorer(&scorer, &model_path)?;

            let pipeline_metrics = PipelineMetrics::new()?;
            let processor = SignalProcessor::new(BpPredictor::new(scorer))
                .with_filter(config.bandpass_filter())
                .with_extractor(config.extractor())
                .with_selection(selection)
                .with_metrics(pipeline_metrics.clone());

            let samples = csv_io::read_signal_csv(&input)?;
            info!(
                "Loaded {} samples ({:.1} s at {} Hz) from {:?}",
                samples.len(),
                samples.len() as f64 / sample_rate,
                sample_rate,
                input
            );

            match processor.process_signal(&samples, sample_rate) {
                Some(estimate) if estimate.is_measurement() => println!("{}", estimate),
                Some(_) => println!("no measurement (pipeline fault, see log)"),
                None => println!("no measurement (no pulse resolved)"),
            }

            if metrics {
                print!("{}", pipeline_metrics.render());
            }
        }
        Commands::Features { input, sample_rate } => {
            let sample_rate = sample_rate.unwrap_or(config.pipeline.sample_rate_hz);
            let samples = csv_io::read_signal_csv(&input)?;

            let filter = config.bandpass_filter();
            let raw = Signal::new(samples, sample_rate)?;
            let filtered = filter.apply(&raw)?;
            let extraction = config.extractor().extract_detailed(&filtered);
            info!(
                "{} pulses accepted, {} rejected",
                extraction.pulses.len(),
                extraction.rejected.len()
            );

            csv_io::write_features(std::io::stdout().lock(), &extraction.features())?;
        }
        Commands::Risk { input, window_days } => {
            let repository = InMemoryReadingRepository::new();
            repository.save_all(&csv_io::read_readings_csv(&input)?)?;

            let Some(latest) = repository.latest()? else {
                println!("no readings");
                return Ok(());
            };
            let days = window_days.unwrap_or(config.monitor.risk_window_days);
            let readings =
                repository.in_range(latest.timestamp - Duration::days(days), latest.timestamp)?;

            let systolic: Vec<i32> = readings.iter().map(|r| r.systolic).collect();
            let diastolic: Vec<i32> = readings.iter().map(|r| r.diastolic).collect();
            let risk = CvdRiskScorer::new().score(&systolic, &diastolic)?;
            println!("readings: {} (last {} days)", readings.len(), days);
            println!("cvd risk: {:.1}", risk);

            if let Some(insights) = ReadingInsights::analyze(&readings) {
                println!("{}", serde_json::to_string_pretty(&insights)?);
            }
        }
    }

    Ok(())
}
