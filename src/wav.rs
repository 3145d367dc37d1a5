use crate::error::{FilterError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// One channel of a WAV file as floating-point samples
#[derive(Debug, Clone)]
pub struct WavChannel {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
    /// Number of channels in the source file
    pub channels: u16,
}

/// Read a single channel from a WAV file
///
/// Integer formats are scaled to [-1, 1).
pub fn load_wav_channel<P: AsRef<Path>>(path: P, channel: usize) -> Result<WavChannel> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    if channel >= channels {
        return Err(FilterError::ChannelOutOfRange { channel, channels });
    }

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<f64>, hound::Error>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 * scale))
                .collect::<std::result::Result<Vec<f64>, hound::Error>>()?
        }
    };

    let samples = interleaved
        .into_iter()
        .skip(channel)
        .step_by(channels)
        .collect();

    Ok(WavChannel {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Write a mono 32-bit float WAV file
pub fn save_wav<P: AsRef<Path>>(path: P, samples: &[f64], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;

    for &sample in samples {
        writer.write_sample(sample as f32)?;
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("eeg_bandpass_{}_{}.wav", name, std::process::id()))
    }

    #[test]
    fn test_save_and_load_float() {
        let path = temp_path("float");
        let samples = vec![0.0, 0.25, -0.5, 0.75];
        save_wav(&path, &samples, 256).unwrap();

        let loaded = load_wav_channel(&path, 0).unwrap();
        assert_eq!(loaded.sample_rate, 256);
        assert_eq!(loaded.channels, 1);
        assert_eq!(loaded.samples, samples);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_int_stereo_channel() {
        let path = temp_path("int_stereo");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 500,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(16384i16, -8192i16), (-16384, 8192), (0, 32767)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let right = load_wav_channel(&path, 1).unwrap();
        assert_eq!(right.sample_rate, 500);
        assert_eq!(right.channels, 2);
        assert_eq!(right.samples.len(), 3);
        assert_eq!(right.samples[0], -0.25);
        assert_eq!(right.samples[1], 0.25);

        assert!(matches!(
            load_wav_channel(&path, 2),
            Err(FilterError::ChannelOutOfRange {
                channel: 2,
                channels: 2
            })
        ));

        std::fs::remove_file(&path).ok();
    }
}
