use crate::error::{FilterError, Result};
use iir_filters::filter_design::{FilterType, butter};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Zero/pole/gain representation of a transfer function.
///
/// Complex roots always appear together with their conjugates.
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Zpk {
    /// Largest pole magnitude; a digital filter is stable when this is below 1
    pub fn max_pole_radius(&self) -> f64 {
        self.poles.iter().map(|p| p.norm()).fold(0.0, f64::max)
    }

    /// Complex response at angular frequency `w` (rad/sample)
    pub fn response(&self, w: f64) -> Complex64 {
        let z = Complex64::from_polar(1.0, w);
        let num: Complex64 = self.zeros.iter().map(|&q| z - q).product();
        let den: Complex64 = self.poles.iter().map(|&p| z - p).product();
        self.gain * num / den
    }
}

/// Digital frequency (rad/sample) where a Butterworth band-pass with the
/// given normalized edges has unit gain
///
/// This is the bilinear image of the geometric centre of the pre-warped
/// analog band.
pub fn centre_frequency(low: f64, high: f64) -> f64 {
    let warp = |wn: f64| (PI * wn / 2.0).tan();
    2.0 * (warp(low) * warp(high)).sqrt().atan()
}

// Gain that brings |H(e^jw)| to one. Summed in the log domain so that high
// orders on wide bands neither overflow nor underflow.
fn unit_gain_at(zeros: &[Complex64], poles: &[Complex64], w: f64) -> f64 {
    let z = Complex64::from_polar(1.0, w);
    let log_num: f64 = zeros.iter().map(|&q| (z - q).norm().ln()).sum();
    let log_den: f64 = poles.iter().map(|&p| (z - p).norm().ln()).sum();
    (log_den - log_num).exp()
}

/// Digital Butterworth band-pass in ZPK form
///
/// `low` and `high` are normalized to the Nyquist frequency. Roots come from
/// `iir_filters`, which pre-warps the band edges so the -3 dB points land
/// exactly on them. The gain is recomputed for unit response at
/// [`centre_frequency`].
///
/// # Errors
/// Returns `FilterError::InvalidParameter` if `iir_filters` rejects the
/// parameters and `FilterError::InvalidCoefficients` if the roots are not
/// finite. Range checks live in `bandpass::design`.
pub fn butter_bandpass(order: usize, low: f64, high: f64) -> Result<Zpk> {
    // fs = 2 puts the Nyquist frequency at 1
    let design = butter(order as u32, FilterType::BandPass(low, high), 2.0)
        .map_err(|e| FilterError::InvalidParameter(format!("{:?}", e)))?;

    let zeros: Vec<Complex64> = design.z.iter().map(|c| Complex64::new(c.re, c.im)).collect();
    let poles: Vec<Complex64> = design.p.iter().map(|c| Complex64::new(c.re, c.im)).collect();

    if zeros.iter().chain(&poles).any(|r| !r.is_finite()) {
        return Err(FilterError::InvalidCoefficients(
            "Butterworth roots are not finite".to_string(),
        ));
    }

    let gain = unit_gain_at(&zeros, &poles, centre_frequency(low, high));
    if !gain.is_finite() || gain <= 0.0 {
        return Err(FilterError::InvalidCoefficients(format!(
            "Butterworth gain {} out of range",
            gain
        )));
    }

    Ok(Zpk { zeros, poles, gain })
}
