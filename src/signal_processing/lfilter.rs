use crate::error::{FilterError, Result};

use super::sos::Biquad;

/// Validate a transfer function and return copies with `a[0] == 1` and
/// `b`, `a` padded to the same length.
///
/// # Errors
/// Returns `FilterError::InvalidCoefficients` if either side is empty, any
/// coefficient is non-finite, or `a[0] == 0`.
pub fn normalize(b: &[f64], a: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if b.is_empty() || a.is_empty() {
        return Err(FilterError::InvalidCoefficients(
            "numerator and denominator must be non-empty".to_string(),
        ));
    }
    if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
        return Err(FilterError::InvalidCoefficients(
            "coefficients contain non-finite values".to_string(),
        ));
    }
    let a0 = a[0];
    if a0 == 0.0 {
        return Err(FilterError::InvalidCoefficients(
            "leading denominator coefficient is zero".to_string(),
        ));
    }

    let n = b.len().max(a.len());
    let mut b: Vec<f64> = b.iter().map(|c| c / a0).collect();
    let mut a: Vec<f64> = a.iter().map(|c| c / a0).collect();
    b.resize(n, 0.0);
    a.resize(n, 0.0);
    Ok((b, a))
}

/// Direct form II transposed filter over a whole buffer
///
/// `b` and `a` must come from [`normalize`]. `state` holds `len - 1` delay
/// values and is left at the final state.
pub fn lfilter(b: &[f64], a: &[f64], input: &[f64], state: &mut [f64]) -> Vec<f64> {
    let n = b.len();
    debug_assert_eq!(state.len(), n - 1);

    input
        .iter()
        .map(|&x| {
            let y = b[0] * x + state.first().copied().unwrap_or(0.0);
            for k in 0..n.saturating_sub(2) {
                state[k] = b[k + 1] * x + state[k + 1] - a[k + 1] * y;
            }
            if n > 1 {
                state[n - 2] = b[n - 1] * x - a[n - 1] * y;
            }
            y
        })
        .collect()
}

/// Initial state for a step response in steady state
///
/// Scaling the result by `x0` gives the state the filter would have after
/// seeing the constant input `x0` forever. `b` and `a` must come from
/// [`normalize`].
///
/// # Errors
/// Returns `FilterError::InvalidCoefficients` when the denominator has a root
/// at z = 1, where no steady state exists.
pub fn lfilter_zi(b: &[f64], a: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    if n < 2 {
        return Ok(Vec::new());
    }

    let a_sum: f64 = a.iter().sum();
    if a_sum == 0.0 {
        return Err(FilterError::InvalidCoefficients(
            "denominator has a root at z = 1".to_string(),
        ));
    }

    // Closed-form solution of (I - A^T) zi = b[1..] - a[1..] * b[0],
    // A being the companion matrix of a
    let b_sum: f64 = (1..n).map(|k| b[k] - a[k] * b[0]).sum();
    let mut zi = vec![0.0; n - 1];
    zi[0] = b_sum / a_sum;

    let mut a_acc = 1.0;
    let mut c_acc = 0.0;
    for k in 1..n - 1 {
        a_acc += a[k];
        c_acc += b[k] - a[k] * b[0];
        zi[k] = a_acc * zi[0] - c_acc;
    }
    Ok(zi)
}

/// Run a cascade of normalized sections over a buffer
pub fn sosfilt(sos: &[Biquad], input: &[f64], state: &mut [[f64; 2]]) -> Vec<f64> {
    debug_assert_eq!(sos.len(), state.len());

    let mut output = input.to_vec();
    for (section, z) in sos.iter().zip(state.iter_mut()) {
        for sample in output.iter_mut() {
            *sample = section.process(*sample, z);
        }
    }
    output
}

/// Steady-state initial conditions for a cascade, one pair per section
///
/// Each section's state is scaled by the DC gain of the sections before it.
///
/// # Errors
/// Returns `FilterError::InvalidCoefficients` when a section has a pole at z = 1
pub fn sosfilt_zi(sos: &[Biquad]) -> Result<Vec<[f64; 2]>> {
    let mut scale = 1.0;
    let mut zi = Vec::with_capacity(sos.len());

    for section in sos {
        let section_zi = lfilter_zi(&section.b, &section.a)?;
        zi.push([scale * section_zi[0], scale * section_zi[1]]);
        scale *= section.b.iter().sum::<f64>() / section.a.iter().sum::<f64>();
    }
    Ok(zi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normalize_pads_and_scales() {
        let (b, a) = normalize(&[2.0], &[2.0, -1.0, 0.5]).unwrap();
        assert_eq!(b, vec![1.0, 0.0, 0.0]);
        assert_eq!(a, vec![1.0, -0.5, 0.25]);
    }

    #[test]
    fn test_normalize_rejects_bad_coefficients() {
        assert!(normalize(&[], &[1.0]).is_err());
        assert!(normalize(&[1.0], &[0.0, 1.0]).is_err());
        assert!(normalize(&[f64::NAN], &[1.0]).is_err());
        assert!(normalize(&[1.0], &[1.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_lfilter_moving_average() {
        let (b, a) = normalize(&[0.5, 0.5], &[1.0]).unwrap();
        let mut state = vec![0.0];
        let y = lfilter(&b, &a, &[2.0, 4.0, 6.0], &mut state);
        assert_eq!(y, vec![1.0, 3.0, 5.0]);
        assert_eq!(state, vec![3.0]);
    }

    #[test]
    fn test_lfilter_one_pole_recursion() {
        // y[n] = x[n] + 0.5 y[n-1]
        let (b, a) = normalize(&[1.0], &[1.0, -0.5]).unwrap();
        let mut state = vec![0.0];
        let y = lfilter(&b, &a, &[1.0, 0.0, 0.0, 0.0], &mut state);
        assert_eq!(y, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_lfilter_zi_gives_steady_state() {
        let (b, a) = normalize(&[0.2, 0.3, 0.1], &[1.0, -0.6, 0.2]).unwrap();
        let zi = lfilter_zi(&b, &a).unwrap();

        let x0 = 3.0;
        let mut state: Vec<f64> = zi.iter().map(|z| z * x0).collect();
        let y = lfilter(&b, &a, &[x0; 50], &mut state);

        let dc_gain = b.iter().sum::<f64>() / a.iter().sum::<f64>();
        for &v in &y {
            assert_abs_diff_eq!(v, dc_gain * x0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lfilter_zi_rejects_pole_at_one() {
        let (b, a) = normalize(&[1.0], &[1.0, -1.0]).unwrap();
        assert!(matches!(
            lfilter_zi(&b, &a),
            Err(FilterError::InvalidCoefficients(_))
        ));
    }

    #[test]
    fn test_sosfilt_zi_gives_steady_state() {
        let sos = [
            Biquad::new([0.3, 0.2, 0.1], [1.0, -0.4, 0.1]),
            Biquad::new([1.0, 0.5, 0.25], [1.0, 0.3, 0.05]),
        ];
        let zi = sosfilt_zi(&sos).unwrap();

        let x0 = -1.5;
        let mut state: Vec<[f64; 2]> = zi.iter().map(|z| [z[0] * x0, z[1] * x0]).collect();
        let y = sosfilt(&sos, &[x0; 40], &mut state);

        let gain: f64 = sos
            .iter()
            .map(|s| s.b.iter().sum::<f64>() / s.a.iter().sum::<f64>())
            .product();
        for &v in &y {
            assert_abs_diff_eq!(v, gain * x0, epsilon = 1e-12);
        }
    }
}
