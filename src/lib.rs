pub mod config;
pub mod error;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{BandpassConfig, EegBand};
pub use error::{FilterError, Result};
pub use signal_processing::{
    BandpassDesign, BandpassFilter, DEFAULT_ORDER, bandpass_filter, design, filtfilt, sosfiltfilt,
};
pub use wav::{load_wav_channel, save_wav};
