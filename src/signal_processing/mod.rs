pub mod bandpass;
pub mod butterworth;
pub mod filtfilt;
pub mod lfilter;
pub mod sos;

pub use bandpass::{
    BandpassDesign, BandpassFilter, DEFAULT_ORDER, bandpass_filter, design, normalize_cutoffs,
};
pub use butterworth::Zpk;
pub use filtfilt::{filtfilt, sosfiltfilt};
pub use sos::{Biquad, TransferFunction};
