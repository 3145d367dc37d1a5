use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::noise::{NoiseConfig, add_white_noise};

/// One sinusoidal component of a synthetic signal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SineComponent {
    pub frequency_hz: f64,
    pub amplitude: f64,
    /// Phase at sample 0, in radians
    #[serde(default)]
    pub phase: f64,
}

impl SineComponent {
    pub fn new(frequency_hz: f64, amplitude: f64) -> Self {
        Self {
            frequency_hz,
            amplitude,
            phase: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }
}

/// `amplitude * sin(2 pi f t + phase)` sampled at `sample_rate`
pub fn sine_wave(component: &SineComponent, sample_rate: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            component.amplitude * (2.0 * PI * component.frequency_hz * t + component.phase).sin()
        })
        .collect()
}

/// Synthetic EEG-like test signal: a sum of sinusoids plus Gaussian noise
///
/// # Example
/// ```
/// use eeg_bandpass::simulation::{SineComponent, SyntheticSignal};
///
/// let signal = SyntheticSignal::new(256.0, 2.0)
///     .with_component(SineComponent::new(10.0, 1.0))
///     .with_component(SineComponent::new(50.0, 1.0))
///     .with_noise(0.05, Some(1))
///     .generate()
///     .unwrap();
/// assert_eq!(signal.len(), 512);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSignal {
    pub sample_rate: f64,
    pub duration_secs: f64,
    #[serde(default)]
    pub components: Vec<SineComponent>,
    #[serde(default)]
    pub noise: NoiseConfig,
}

impl SyntheticSignal {
    pub fn new(sample_rate: f64, duration_secs: f64) -> Self {
        Self {
            sample_rate,
            duration_secs,
            components: Vec::new(),
            noise: NoiseConfig::default(),
        }
    }

    pub fn with_component(mut self, component: SineComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_noise(mut self, std_dev: f64, seed: Option<u64>) -> Self {
        self.noise = NoiseConfig { seed, std_dev };
        self
    }

    pub fn num_samples(&self) -> usize {
        (self.duration_secs * self.sample_rate).round() as usize
    }

    /// Render the signal
    ///
    /// # Errors
    /// Returns `FilterError::InvalidParameter` for a non-positive sample rate
    /// or duration, or an invalid noise level
    pub fn generate(&self) -> Result<Vec<f64>> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.sample_rate) || !positive(self.duration_secs) {
            return Err(FilterError::InvalidParameter(format!(
                "sample rate {} and duration {} must be positive",
                self.sample_rate, self.duration_secs
            )));
        }

        let len = self.num_samples();
        let mut signal = vec![0.0; len];
        for component in &self.components {
            for (s, v) in signal
                .iter_mut()
                .zip(sine_wave(component, self.sample_rate, len))
            {
                *s += v;
            }
        }

        if self.noise.std_dev != 0.0 {
            add_white_noise(&mut signal, &self.noise)?;
        }
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sine_wave() {
        let s = sine_wave(&SineComponent::new(1.0, 2.0), 4.0, 4);
        assert_abs_diff_eq!(s[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[2], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[3], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_components_add() {
        let signal = SyntheticSignal::new(100.0, 1.0)
            .with_component(SineComponent::new(5.0, 1.0).with_phase(PI / 2.0))
            .with_component(SineComponent::new(5.0, 1.0).with_phase(-PI / 2.0))
            .generate()
            .unwrap();
        assert_eq!(signal.len(), 100);
        assert!(signal.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_rejects_bad_timing() {
        assert!(SyntheticSignal::new(0.0, 1.0).generate().is_err());
        assert!(SyntheticSignal::new(256.0, -1.0).generate().is_err());
    }
}
