use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: need {needed} samples, have {available}")]
    InsufficientLength { needed: usize, available: usize },

    #[error("Invalid filter coefficients: {0}")]
    InvalidCoefficients(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel {channel} out of range for {channels}-channel input")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("WAV I/O error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
