/// Drumline LUFS - measure track loudness for volume normalization
use clap::{Parser, Subcommand};
use drumline_lufs::{analysis, report, CliConfig, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "drumline-lufs")]
#[command(about = "Measure integrated loudness of Drumline tracks", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./drumline.toml when present)
    #[arg(short, long, global = true, env = "DRUMLINE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure files and print the normalization gain for each
    Measure {
        /// Audio files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Files analyzed in parallel
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Normalization target (replaygain, ebu_r128, streaming, disabled, custom)
        #[arg(short, long)]
        target: Option<String>,

        /// Level for the custom target in LUFS
        #[arg(long, allow_hyphen_values = true)]
        target_lufs: Option<f64>,

        /// Pre-amp in dB (-12 to +12)
        #[arg(long, allow_hyphen_values = true)]
        preamp: Option<f64>,
    },
    /// Show the full measurement of a single file
    Info {
        /// Audio file to analyze
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drumline_lufs=info,drumline_audio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Measure {
            files,
            json,
            jobs,
            target,
            target_lufs,
            preamp,
        } => {
            if json {
                config.format = OutputFormat::Json;
            }
            if let Some(jobs) = jobs {
                config.jobs = jobs;
            }
            if let Some(target) = target {
                config.target = target;
            }
            if target_lufs.is_some() {
                config.target_lufs = target_lufs;
            }
            if let Some(preamp) = preamp {
                config.preamp_db = preamp;
            }
            config.validate()?;

            measure(files, &config).await?;
        }
        Commands::Info { file } => {
            info(file).await?;
        }
    }

    Ok(())
}

async fn measure(files: Vec<PathBuf>, config: &CliConfig) -> anyhow::Result<()> {
    let normalizer = config.normalizer()?;

    tracing::info!(
        "Measuring {} files ({} jobs, target {})",
        files.len(),
        config.jobs,
        normalizer.target().as_str()
    );

    let reports = analysis::analyze_files(files, config.jobs, &normalizer).await;
    print!("{}", report::render(&reports, config.format)?);

    Ok(())
}

async fn info(file: PathBuf) -> anyhow::Result<()> {
    let display = file.display().to_string();
    let measurement = analysis::measure_file(file).await?;
    print!("{}", report::render_measurement(&display, &measurement));
    Ok(())
}
