use crate::config::BandpassConfig;
use crate::error::{FilterError, Result};
use std::f64::consts::PI;

use super::butterworth::{Zpk, butter_bandpass};
use super::filtfilt::{sos_padlen, sosfiltfilt};
use super::sos::{Biquad, TransferFunction, sos_response, sos_to_tf, zpk_to_sos};

/// Filter order used when the caller has no preference
pub const DEFAULT_ORDER: usize = 4;

/// Poles closer than this to the unit circle are reported as near-unstable
const UNIT_CIRCLE_MARGIN: f64 = 1e-6;

/// A designed digital Butterworth band-pass filter
///
/// Holds the zero/pole/gain design and its second-order-section realization.
/// Cutoffs are normalized to the Nyquist frequency.
#[derive(Debug, Clone)]
pub struct BandpassDesign {
    order: usize,
    low: f64,
    high: f64,
    zpk: Zpk,
    sos: Vec<Biquad>,
}

/// Design a Butterworth band-pass filter
///
/// # Arguments
/// * `order` - Prototype order; the band-pass has twice as many poles
/// * `normalized_low` - Lower -3 dB point as a fraction of Nyquist
/// * `normalized_high` - Upper -3 dB point as a fraction of Nyquist
///
/// # Errors
/// Returns `FilterError::InvalidParameter` unless `order >= 1` and
/// `0 < normalized_low < normalized_high < 1`
pub fn design(order: usize, normalized_low: f64, normalized_high: f64) -> Result<BandpassDesign> {
    if order < 1 {
        return Err(FilterError::InvalidParameter(
            "filter order must be at least 1".to_string(),
        ));
    }
    for (name, value) in [("low", normalized_low), ("high", normalized_high)] {
        if !value.is_finite() || value <= 0.0 || value >= 1.0 {
            return Err(FilterError::InvalidParameter(format!(
                "normalized {} cutoff {} must lie strictly between 0 and 1",
                name, value
            )));
        }
    }
    if normalized_low >= normalized_high {
        return Err(FilterError::InvalidParameter(format!(
            "low cutoff {} must be below high cutoff {}",
            normalized_low, normalized_high
        )));
    }

    let zpk = butter_bandpass(order, normalized_low, normalized_high)?;
    let sos = zpk_to_sos(&zpk)?;

    let design = BandpassDesign {
        order,
        low: normalized_low,
        high: normalized_high,
        zpk,
        sos,
    };

    log::debug!(
        "Butterworth band-pass order {} [{:.5}, {:.5}]: {} sections, gain {:e}, max pole radius {:.9}",
        order,
        normalized_low,
        normalized_high,
        design.sos.len(),
        design.zpk.gain,
        design.zpk.max_pole_radius()
    );
    if design.is_near_unstable() {
        log::warn!(
            "Pole radius {:.9} is within {:e} of the unit circle; output may be unstable",
            design.zpk.max_pole_radius(),
            UNIT_CIRCLE_MARGIN
        );
    }

    Ok(design)
}

impl BandpassDesign {
    /// Prototype order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Normalized cutoffs `(low, high)`
    pub fn cutoffs(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    /// Zeros, poles and gain of the digital filter
    pub fn zpk(&self) -> &Zpk {
        &self.zpk
    }

    /// Second-order sections, poles closest to the unit circle last
    pub fn sos(&self) -> &[Biquad] {
        &self.sos
    }

    /// Distance of the outermost pole from the unit circle
    pub fn stability_margin(&self) -> f64 {
        1.0 - self.zpk.max_pole_radius()
    }

    /// True when a pole is close enough to the unit circle that rounding
    /// may make the filter ring or diverge
    pub fn is_near_unstable(&self) -> bool {
        self.stability_margin() < UNIT_CIRCLE_MARGIN
    }

    /// Expanded `(b, a)` coefficients, each of length `2 * order + 1`
    pub fn transfer_function(&self) -> TransferFunction {
        sos_to_tf(&self.sos)
    }

    /// Samples of odd reflection added at each end during zero-phase filtering
    pub fn padlen(&self) -> usize {
        sos_padlen(&self.sos)
    }

    /// Shortest signal that [`apply`](Self::apply) accepts
    pub fn min_signal_len(&self) -> usize {
        self.padlen() + 1
    }

    /// Single-pass magnitude response at a frequency normalized to Nyquist
    pub fn magnitude_response(&self, normalized_freq: f64) -> f64 {
        sos_response(&self.sos, PI * normalized_freq).norm()
    }

    /// Zero-phase filter a signal, returning a new vector of the same length
    ///
    /// # Errors
    /// Returns `FilterError::InsufficientLength` if the signal is not longer
    /// than [`padlen`](Self::padlen)
    pub fn apply(&self, signal: &[f64]) -> Result<Vec<f64>> {
        sosfiltfilt(&self.sos, signal)
    }
}

/// Convert cutoffs in Hz to fractions of the Nyquist frequency
///
/// # Errors
/// Returns `FilterError::InvalidParameter` unless the sample rate is finite
/// and positive and `0 < lowcut < highcut < fs / 2`
pub fn normalize_cutoffs(sample_rate: f64, lowcut: f64, highcut: f64) -> Result<(f64, f64)> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(FilterError::InvalidParameter(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }
    let nyquist = 0.5 * sample_rate;

    if !lowcut.is_finite() || !highcut.is_finite() {
        return Err(FilterError::InvalidParameter(
            "cutoff frequencies must be finite".to_string(),
        ));
    }
    if lowcut <= 0.0 {
        return Err(FilterError::InvalidParameter(format!(
            "low cutoff must be positive, got {} Hz",
            lowcut
        )));
    }
    if lowcut >= highcut {
        return Err(FilterError::InvalidParameter(format!(
            "low cutoff {} Hz must be below high cutoff {} Hz",
            lowcut, highcut
        )));
    }
    if highcut >= nyquist {
        return Err(FilterError::InvalidParameter(format!(
            "high cutoff {} Hz must be below Nyquist ({} Hz)",
            highcut, nyquist
        )));
    }

    Ok((lowcut / nyquist, highcut / nyquist))
}

/// Zero-phase Butterworth band-pass filter for EEG and similar signals
///
/// Designs the filter once so the same parameters can be applied to any
/// number of independent signals.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    design: BandpassDesign,
    sample_rate: f64,
    lowcut: f64,
    highcut: f64,
}

impl BandpassFilter {
    /// Create a new Butterworth band-pass filter
    ///
    /// # Arguments
    /// * `lowcut` - Lower cutoff frequency in Hz
    /// * `highcut` - Upper cutoff frequency in Hz
    /// * `sample_rate` - Sampling rate in Hz
    /// * `order` - Filter order (higher = steeper rolloff, typically 4)
    ///
    /// # Errors
    /// Returns `FilterError::InvalidParameter` if filter parameters are invalid
    pub fn new(lowcut: f64, highcut: f64, sample_rate: f64, order: usize) -> Result<Self> {
        let (low, high) = normalize_cutoffs(sample_rate, lowcut, highcut)?;
        let design = design(order, low, high)?;

        Ok(Self {
            design,
            sample_rate,
            lowcut,
            highcut,
        })
    }

    /// Build a filter from a configuration for the given sample rate
    pub fn from_config(config: &BandpassConfig, sample_rate: f64) -> Result<Self> {
        let (lowcut, highcut) = config.cutoffs()?;
        Self::new(lowcut, highcut, sample_rate, config.order)
    }

    pub fn design(&self) -> &BandpassDesign {
        &self.design
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Cutoffs `(lowcut, highcut)` in Hz
    pub fn cutoffs(&self) -> (f64, f64) {
        (self.lowcut, self.highcut)
    }

    pub fn min_signal_len(&self) -> usize {
        self.design.min_signal_len()
    }

    /// Single-pass magnitude response at `freq_hz`
    ///
    /// Zero-phase filtering applies this twice, so the effective gain is its
    /// square.
    pub fn gain_at(&self, freq_hz: f64) -> f64 {
        self.design.magnitude_response(freq_hz / (0.5 * self.sample_rate))
    }

    /// Filter a signal forward and backward
    pub fn apply(&self, signal: &[f64]) -> Result<Vec<f64>> {
        self.design.apply(signal)
    }
}

/// Apply a zero-phase Butterworth band-pass filter to a signal
///
/// Equivalent to `BandpassFilter::new(lowcut, highcut, fs, order)?.apply(signal)`.
/// Parameters are validated before any numeric work; the output always has
/// the same length as the input.
///
/// # Example
/// ```
/// use eeg_bandpass::{DEFAULT_ORDER, bandpass_filter};
///
/// let fs = 256.0;
/// let signal: Vec<f64> = (0..512)
///     .map(|i| (2.0 * std::f64::consts::PI * 10.0 * i as f64 / fs).sin())
///     .collect();
/// let alpha = bandpass_filter(&signal, fs, 8.0, 12.0, DEFAULT_ORDER).unwrap();
/// assert_eq!(alpha.len(), signal.len());
/// ```
///
/// # Errors
/// * `FilterError::InvalidParameter` for a bad sample rate, cutoffs or order
/// * `FilterError::InsufficientLength` if the signal is too short for the order
pub fn bandpass_filter(
    signal: &[f64],
    fs: f64,
    lowcut: f64,
    highcut: f64,
    order: usize,
) -> Result<Vec<f64>> {
    BandpassFilter::new(lowcut, highcut, fs, order)?.apply(signal)
}
