use anyhow::Context;
use clap::Parser;
use ppg_bp::infrastructure::persistence::csv_io;
use ppg_bp::infrastructure::simulation::SyntheticPpg;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output CSV file (time_s,ppg)
    #[arg(short, long, default_value = "data/signal.csv")]
    output: PathBuf,

    #[arg(long, default_value = "125")]
    sample_rate: f64,

    /// Duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Heart rate in beats per minute
    #[arg(long, default_value = "60")]
    heart_rate: f64,

    #[arg(long, default_value = "0.17")]
    amplitude: f64,

    #[arg(long, default_value = "1.5")]
    baseline: f64,

    /// Half-width of the uniform noise band (0 disables noise)
    #[arg(long, default_value = "0")]
    noise: f64,

    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    if cli.sample_rate <= 0.0 || cli.duration <= 0.0 || cli.heart_rate <= 0.0 {
        anyhow::bail!("sample rate, duration and heart rate must be positive");
    }

    let ppg = SyntheticPpg {
        amplitude: cli.amplitude,
        baseline: cli.baseline,
        ..SyntheticPpg::default()
    }
    .with_heart_rate(cli.heart_rate)
    .with_noise(cli.noise, cli.seed);

    let samples = ppg.generate(cli.sample_rate, cli.duration);

    if let Some(parent) = cli.output.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory {:?}", parent))?;
    }
    let file = File::create(&cli.output)
        .context(format!("Failed to create output file {:?}", cli.output))?;
    csv_io::write_signal(BufWriter::new(file), &samples, cli.sample_rate)?;

    info!(
        "Wrote {} samples ({} s at {} Hz, {} bpm) to {:?}",
        samples.len(),
        cli.duration,
        cli.sample_rate,
        cli.heart_rate,
        cli.output
    );
    Ok(())
}
