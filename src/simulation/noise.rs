use crate::error::{FilterError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Additive white Gaussian noise
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Seed for reproducible noise; fresh entropy when absent
    pub seed: Option<u64>,
    /// Standard deviation of the noise
    pub std_dev: f64,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_std_dev(mut self, std_dev: f64) -> Self {
        self.std_dev = std_dev;
        self
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Generate `len` samples of zero-mean Gaussian noise
///
/// # Errors
/// Returns `FilterError::InvalidParameter` for a negative or non-finite
/// standard deviation
pub fn white_noise(len: usize, config: &NoiseConfig) -> Result<Vec<f64>> {
    let normal = Normal::new(0.0, config.std_dev).map_err(|e| {
        FilterError::InvalidParameter(format!("noise std dev {}: {}", config.std_dev, e))
    })?;
    let mut rng = create_rng(config.seed);
    Ok((0..len).map(|_| normal.sample(&mut rng)).collect())
}

/// Add Gaussian noise to a signal in place
pub fn add_white_noise(signal: &mut [f64], config: &NoiseConfig) -> Result<()> {
    let noise = white_noise(signal.len(), config)?;
    for (sample, n) in signal.iter_mut().zip(noise) {
        *sample += n;
    }
    Ok(())
}
