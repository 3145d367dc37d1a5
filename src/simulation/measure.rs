use std::f64::consts::PI;

/// Amplitude and phase of a least-squares sinusoid fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineFit {
    pub amplitude: f64,
    /// Radians, in (-pi, pi], relative to sample 0 of the full signal
    pub phase: f64,
}

/// Fit `A sin(2 pi f n / fs + phase)` to `signal[range]`
///
/// The time origin stays at sample 0 so phases from different windows of
/// the same signal are comparable.
pub fn fit_sinusoid(
    signal: &[f64],
    frequency_hz: f64,
    sample_rate: f64,
    range: std::ops::Range<usize>,
) -> SineFit {
    let omega = 2.0 * PI * frequency_hz / sample_rate;

    let (mut ss, mut sc, mut cc, mut xs, mut xc) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for i in range {
        let (s, c) = (omega * i as f64).sin_cos();
        let x = signal[i];
        ss += s * s;
        sc += s * c;
        cc += c * c;
        xs += x * s;
        xc += x * c;
    }

    // Normal equations for x ~ p sin + q cos
    let det = ss * cc - sc * sc;
    if det.abs() < f64::EPSILON {
        return SineFit {
            amplitude: 0.0,
            phase: 0.0,
        };
    }
    let p = (xs * cc - xc * sc) / det;
    let q = (xc * ss - xs * sc) / det;

    SineFit {
        amplitude: p.hypot(q),
        phase: q.atan2(p),
    }
}

pub fn rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
}

/// Lag in `-max_lag..=max_lag` that maximizes `sum a[i] * b[i + lag]`
///
/// A positive result means `b` is delayed relative to `a`.
pub fn cross_correlation_lag(a: &[f64], b: &[f64], max_lag: usize) -> isize {
    let n = a.len().min(b.len()) as isize;
    let max_lag = max_lag as isize;

    (-max_lag..=max_lag)
        .map(|lag| {
            let sum: f64 = (0..n)
                .filter(|&i| i + lag >= 0 && i + lag < n)
                .map(|i| a[i as usize] * b[(i + lag) as usize])
                .sum();
            (lag, sum)
        })
        .max_by(|x, y| x.1.total_cmp(&y.1))
        .map(|(lag, _)| lag)
        .unwrap_or(0)
}
