//! Filter configuration.
//!
//! A band can be given either as explicit cutoffs in Hz or as one of the
//! conventional EEG rhythms. Explicit cutoffs win when both are present.
//!
//! ```
//! use eeg_bandpass::config::BandpassConfig;
//!
//! let config = BandpassConfig::from_toml_str("band = \"alpha\"\norder = 6").unwrap();
//! assert_eq!(config.cutoffs().unwrap(), (8.0, 12.0));
//! assert_eq!(config.order, 6);
//! ```

use crate::error::{FilterError, Result};
use crate::signal_processing::DEFAULT_ORDER;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conventional EEG frequency bands
///
/// # Parsing formats
/// Case-insensitive names: `delta`, `theta`, `alpha`, `beta`, `gamma`.
///
/// # Example
/// ```
/// use eeg_bandpass::config::EegBand;
///
/// let band: EegBand = "Alpha".parse().unwrap();
/// assert_eq!(band.cutoffs(), (8.0, 12.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EegBand {
    /// 0.5-4 Hz
    Delta,
    /// 4-8 Hz
    Theta,
    /// 8-12 Hz
    Alpha,
    /// 12-30 Hz
    Beta,
    /// 30-45 Hz
    Gamma,
}

impl EegBand {
    pub const ALL: [EegBand; 5] = [
        EegBand::Delta,
        EegBand::Theta,
        EegBand::Alpha,
        EegBand::Beta,
        EegBand::Gamma,
    ];

    /// Band edges `(lowcut, highcut)` in Hz
    pub fn cutoffs(&self) -> (f64, f64) {
        match self {
            EegBand::Delta => (0.5, 4.0),
            EegBand::Theta => (4.0, 8.0),
            EegBand::Alpha => (8.0, 12.0),
            EegBand::Beta => (12.0, 30.0),
            EegBand::Gamma => (30.0, 45.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EegBand::Delta => "delta",
            EegBand::Theta => "theta",
            EegBand::Alpha => "alpha",
            EegBand::Beta => "beta",
            EegBand::Gamma => "gamma",
        }
    }
}

impl fmt::Display for EegBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (low, high) = self.cutoffs();
        write!(f, "{} ({}-{} Hz)", self.name(), low, high)
    }
}

impl FromStr for EegBand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        EegBand::ALL
            .into_iter()
            .find(|band| band.name() == lower)
            .ok_or_else(|| format!("unknown EEG band: {}", s))
    }
}

/// Band-pass filter parameters independent of the sample rate
///
/// Deserializes from TOML:
///
/// ```toml
/// lowcut = 1.0
/// highcut = 40.0
/// order = 4
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandpassConfig {
    /// Lower cutoff in Hz; overrides `band`
    #[serde(default)]
    pub lowcut: Option<f64>,
    /// Upper cutoff in Hz; overrides `band`
    #[serde(default)]
    pub highcut: Option<f64>,
    /// Named band used for any cutoff not given explicitly
    #[serde(default)]
    pub band: Option<EegBand>,
    /// Filter order
    #[serde(default = "default_order")]
    pub order: usize,
}

fn default_order() -> usize {
    DEFAULT_ORDER
}

impl Default for BandpassConfig {
    fn default() -> Self {
        Self {
            lowcut: None,
            highcut: None,
            band: None,
            order: DEFAULT_ORDER,
        }
    }
}

impl BandpassConfig {
    pub fn from_band(band: EegBand) -> Self {
        Self {
            band: Some(band),
            ..Self::default()
        }
    }

    pub fn from_cutoffs(lowcut: f64, highcut: f64) -> Self {
        Self {
            lowcut: Some(lowcut),
            highcut: Some(highcut),
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns `FilterError::Config` if the document is malformed
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Resolve the band edges in Hz
    ///
    /// Range checks against the sample rate happen when the filter is built.
    ///
    /// # Errors
    /// Returns `FilterError::Config` if neither explicit cutoffs nor a band
    /// determine both edges
    pub fn cutoffs(&self) -> Result<(f64, f64)> {
        let preset = self.band.map(|b| b.cutoffs());
        let lowcut = self.lowcut.or(preset.map(|(low, _)| low));
        let highcut = self.highcut.or(preset.map(|(_, high)| high));

        match (lowcut, highcut) {
            (Some(low), Some(high)) => Ok((low, high)),
            _ => Err(FilterError::Config(
                "both cutoffs are required: set lowcut and highcut, or a band".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_parsing() {
        assert_eq!("alpha".parse::<EegBand>().unwrap(), EegBand::Alpha);
        assert_eq!(" GAMMA ".parse::<EegBand>().unwrap(), EegBand::Gamma);
        assert!("mu".parse::<EegBand>().is_err());
    }

    #[test]
    fn test_band_display() {
        assert_eq!(EegBand::Theta.to_string(), "theta (4-8 Hz)");
        assert_eq!(EegBand::Delta.to_string(), "delta (0.5-4 Hz)");
    }

    #[test]
    fn test_bands_are_contiguous() {
        for pair in EegBand::ALL.windows(2) {
            assert_eq!(pair[0].cutoffs().1, pair[1].cutoffs().0);
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = BandpassConfig::from_toml_str("lowcut = 1.0\nhighcut = 40.0").unwrap();
        assert_eq!(config.order, DEFAULT_ORDER);
        assert_eq!(config.cutoffs().unwrap(), (1.0, 40.0));
    }

    #[test]
    fn test_explicit_cutoff_overrides_band() {
        let config =
            BandpassConfig::from_toml_str("band = \"beta\"\nhighcut = 25.0\norder = 2").unwrap();
        assert_eq!(config.cutoffs().unwrap(), (12.0, 25.0));
        assert_eq!(config.order, 2);
    }

    #[test]
    fn test_missing_cutoff() {
        let config = BandpassConfig::from_toml_str("lowcut = 1.0").unwrap();
        assert!(matches!(config.cutoffs(), Err(FilterError::Config(_))));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            BandpassConfig::from_toml_str("band = \"kappa\""),
            Err(FilterError::Config(_))
        ));
        assert!(matches!(
            BandpassConfig::from_toml_str("order = \"four\""),
            Err(FilterError::Config(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = BandpassConfig::from_band(EegBand::Alpha).with_order(8);
        assert_eq!(config.cutoffs().unwrap(), (8.0, 12.0));
        assert_eq!(config.order, 8);

        let config = BandpassConfig::from_cutoffs(0.5, 45.0);
        assert_eq!(config.cutoffs().unwrap(), (0.5, 45.0));
    }
}
