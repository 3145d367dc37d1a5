mod measure;
mod noise;
mod signal;

pub use measure::{SineFit, cross_correlation_lag, fit_sinusoid, rms};
pub use noise::{NoiseConfig, add_white_noise, white_noise};
pub use signal::{SineComponent, SyntheticSignal, sine_wave};
