use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use eeg_bandpass::config::{BandpassConfig, EegBand};
use eeg_bandpass::{BandpassFilter, load_wav_channel, save_wav};

#[derive(Parser, Debug)]
#[command(name = "filter_wav")]
#[command(about = "Zero-phase Butterworth band-pass filter one channel of a WAV file", long_about = None)]
struct Args {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file (mono, 32-bit float)
    #[arg(short, long)]
    output: PathBuf,

    /// Channel index to filter
    #[arg(short = 'c', long, default_value_t = 0)]
    channel: usize,

    /// TOML filter configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named EEG band
    #[arg(short, long, value_enum)]
    band: Option<EegBand>,

    /// Lower cutoff in Hz (overrides the band)
    #[arg(long)]
    lowcut: Option<f64>,

    /// Upper cutoff in Hz (overrides the band)
    #[arg(long)]
    highcut: Option<f64>,

    /// Filter order
    #[arg(long)]
    order: Option<usize>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(args: &Args) -> Result<BandpassConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            BandpassConfig::from_toml_str(&content).context("Failed to parse config file")?
        }
        None => BandpassConfig::default(),
    };

    if args.band.is_some() {
        config.band = args.band;
    }
    if args.lowcut.is_some() {
        config.lowcut = args.lowcut;
    }
    if args.highcut.is_some() {
        config.highcut = args.highcut;
    }
    if let Some(order) = args.order {
        config.order = order;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = load_config(&args)?;

    let wav = load_wav_channel(&args.input, args.channel)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    log::info!(
        "{}: channel {} of {}, {} samples at {} Hz",
        args.input.display(),
        args.channel,
        wav.channels,
        wav.samples.len(),
        wav.sample_rate
    );

    let filter = BandpassFilter::from_config(&config, wav.sample_rate as f64)
        .context("Invalid filter parameters")?;
    let (lowcut, highcut) = filter.cutoffs();
    log::info!(
        "Butterworth band-pass {:.2}-{:.2} Hz, order {}, padlen {}",
        lowcut,
        highcut,
        config.order,
        filter.design().padlen()
    );

    let filtered = filter.apply(&wav.samples).context("Filtering failed")?;
    if filtered.iter().any(|v| !v.is_finite()) {
        log::warn!("Output contains non-finite samples");
    }

    save_wav(&args.output, &filtered, wav.sample_rate)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Filtered {} samples ({:.2}-{:.2} Hz, order {}) -> {}",
        filtered.len(),
        lowcut,
        highcut,
        config.order,
        args.output.display()
    );
    Ok(())
}
