use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use eeg_bandpass::save_wav;
use eeg_bandpass::simulation::{SineComponent, SyntheticSignal};

#[derive(Parser, Debug)]
#[command(name = "generate_eeg_wav")]
#[command(about = "Generate a synthetic EEG-like WAV file for band-pass testing")]
struct Args {
    /// Output WAV file
    #[arg(short, long, default_value = "synthetic_eeg.wav")]
    output: PathBuf,

    /// TOML signal description (overrides the component flags)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sinusoids as "freq:amplitude[:phase]", comma-separated
    #[arg(long, default_value = "10:1,50:1")]
    components: String,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 256)]
    sample_rate: u32,

    /// Signal duration in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,

    /// Gaussian noise standard deviation
    #[arg(long, default_value_t = 0.05)]
    noise: f64,

    /// Seed for reproducible noise
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write a JSON manifest next to the WAV file
    #[arg(long)]
    manifest: bool,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    file: String,
    num_samples: usize,
    signal: &'a SyntheticSignal,
}

fn parse_components(s: &str) -> Result<Vec<SineComponent>> {
    s.split(',')
        .map(|part| -> Result<SineComponent> {
            let fields: Vec<&str> = part.trim().split(':').collect();
            if fields.len() < 2 || fields.len() > 3 {
                anyhow::bail!("Invalid component '{}'. Use 'freq:amplitude[:phase]'", part);
            }
            let freq: f64 = fields[0].parse().context("Invalid frequency")?;
            let amplitude: f64 = fields[1].parse().context("Invalid amplitude")?;
            let phase: f64 = match fields.get(2) {
                Some(p) => p.parse().context("Invalid phase")?,
                None => 0.0,
            };
            Ok(SineComponent::new(freq, amplitude).with_phase(phase))
        })
        .collect()
}

// WAV headers carry an integer rate; anything else would mislabel the samples
fn wav_sample_rate(rate: f64) -> Result<u32> {
    if rate.fract() != 0.0 || rate < 1.0 || rate > u32::MAX as f64 {
        anyhow::bail!("Sample rate must be a positive whole number of Hz, got {}", rate);
    }
    Ok(rate as u32)
}

fn build_signal(args: &Args) -> Result<SyntheticSignal> {
    let signal: SyntheticSignal = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        }
        None => {
            let mut signal = SyntheticSignal::new(args.sample_rate as f64, args.duration)
                .with_noise(args.noise, args.seed);
            for component in parse_components(&args.components)? {
                signal = signal.with_component(component);
            }
            signal
        }
    };

    wav_sample_rate(signal.sample_rate)?;
    Ok(signal)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let signal = build_signal(&args)?;
    let samples = signal.generate().context("Failed to generate signal")?;
    log::info!(
        "{} components, noise std {}, {} samples",
        signal.components.len(),
        signal.noise.std_dev,
        samples.len()
    );

    let sample_rate = wav_sample_rate(signal.sample_rate)?;
    save_wav(&args.output, &samples, sample_rate)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Wrote {} ({} samples)", args.output.display(), samples.len());

    if args.manifest {
        let manifest = Manifest {
            file: args.output.display().to_string(),
            num_samples: samples.len(),
            signal: &signal,
        };
        let path = args.output.with_extension("json");
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::write(&path, json).context("Failed to write manifest")?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_sample_rate() {
        assert_eq!(wav_sample_rate(256.0).unwrap(), 256);
        assert_eq!(wav_sample_rate(48000.0).unwrap(), 48000);
        assert!(wav_sample_rate(250.5).is_err());
        assert!(wav_sample_rate(0.0).is_err());
        assert!(wav_sample_rate(-256.0).is_err());
        assert!(wav_sample_rate(f64::NAN).is_err());
        assert!(wav_sample_rate(f64::INFINITY).is_err());
    }

    #[test]
    fn test_fractional_rate_in_config_is_rejected() {
        let path = std::env::temp_dir().join(format!(
            "generate_eeg_wav_fractional_{}.toml",
            std::process::id()
        ));
        fs::write(&path, "sample_rate = 250.5\nduration_secs = 1.0\n").unwrap();

        let args = Args::parse_from([
            "generate_eeg_wav",
            "--config",
            path.to_str().unwrap(),
        ]);
        let err = build_signal(&args).unwrap_err();
        assert!(err.to_string().contains("whole number"), "{}", err);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_components() {
        let components = parse_components("10:1, 50:0.5:1.5").unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[1].frequency_hz, 50.0);
        assert_eq!(components[1].phase, 1.5);
        assert!(parse_components("10").is_err());
    }
}
