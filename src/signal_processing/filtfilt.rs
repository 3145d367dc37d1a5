use crate::error::{FilterError, Result};

use super::lfilter::{lfilter, lfilter_zi, normalize, sosfilt, sosfilt_zi};
use super::sos::Biquad;

/// Edge padding for a transfer function: three times the number of taps
pub fn tf_padlen(b_len: usize, a_len: usize) -> usize {
    3 * b_len.max(a_len)
}

/// Edge padding for a cascade, equal to the padding of its expanded
/// transfer function
///
/// Trailing zero coefficients shared by every section do not count as taps.
pub fn sos_padlen(sos: &[Biquad]) -> usize {
    let zero_b2 = sos.iter().filter(|s| s.b[2] == 0.0).count();
    let zero_a2 = sos.iter().filter(|s| s.a[2] == 0.0).count();
    let taps = 2 * sos.len() + 1 - zero_b2.min(zero_a2);
    3 * taps
}

/// Extend a signal at both ends by point reflection about its end samples
///
/// `padlen` must be smaller than `signal.len()`.
pub fn odd_extension(signal: &[f64], padlen: usize) -> Vec<f64> {
    let n = signal.len();
    if padlen == 0 {
        return signal.to_vec();
    }
    debug_assert!(padlen < n);

    let first = signal[0];
    let last = signal[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * padlen);
    extended.extend((1..=padlen).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((n - 1 - padlen..n - 1).rev().map(|i| 2.0 * last - signal[i]));
    extended
}

fn check_length(len: usize, padlen: usize) -> Result<()> {
    if len <= padlen {
        return Err(FilterError::InsufficientLength {
            needed: padlen + 1,
            available: len,
        });
    }
    Ok(())
}

// Pad, run `pass` forward then backward, and strip the padding again.
// `pass` receives the buffer and the sample its initial state is scaled to.
fn forward_backward<F>(signal: &[f64], padlen: usize, mut pass: F) -> Vec<f64>
where
    F: FnMut(&[f64], f64) -> Vec<f64>,
{
    let extended = odd_extension(signal, padlen);

    let mut forward = pass(&extended, extended[0]);
    forward.reverse();

    let mut backward = pass(&forward, forward[0]);
    backward.reverse();

    backward.drain(..padlen);
    backward.truncate(signal.len());
    backward
}

/// Zero-phase filtering with a transfer function `(b, a)`
///
/// The signal is odd-extended by `3 * max(len(a), len(b))` samples at each
/// end, filtered forward and backward starting from steady-state initial
/// conditions, and trimmed back to its original length. The input is not
/// modified. Non-finite samples propagate into the output.
///
/// # Errors
/// * `FilterError::InvalidCoefficients` for empty, non-finite or
///   unnormalizable coefficients
/// * `FilterError::InsufficientLength` if the signal is not longer than the
///   padding
pub fn filtfilt(b: &[f64], a: &[f64], signal: &[f64]) -> Result<Vec<f64>> {
    let (b, a) = normalize(b, a)?;
    let zi = lfilter_zi(&b, &a)?;
    let padlen = tf_padlen(b.len(), a.len());
    check_length(signal.len(), padlen)?;

    Ok(forward_backward(signal, padlen, |buffer, x0| {
        let mut state: Vec<f64> = zi.iter().map(|z| z * x0).collect();
        lfilter(&b, &a, buffer, &mut state)
    }))
}

/// Zero-phase filtering with cascaded second-order sections
///
/// Same procedure as [`filtfilt`], with the padding given by [`sos_padlen`].
/// This is the numerically preferred form for orders above a few.
///
/// # Errors
/// * `FilterError::InvalidCoefficients` if `sos` is empty or any section is
///   non-finite or has `a0 == 0`
/// * `FilterError::InsufficientLength` if the signal is not longer than the
///   padding
pub fn sosfiltfilt(sos: &[Biquad], signal: &[f64]) -> Result<Vec<f64>> {
    if sos.is_empty() {
        return Err(FilterError::InvalidCoefficients(
            "at least one section is required".to_string(),
        ));
    }
    let sos = sos
        .iter()
        .map(Biquad::normalized)
        .collect::<Result<Vec<_>>>()?;
    let zi = sosfilt_zi(&sos)?;
    let padlen = sos_padlen(&sos);
    check_length(signal.len(), padlen)?;

    Ok(forward_backward(signal, padlen, |buffer, x0| {
        let mut state: Vec<[f64; 2]> = zi.iter().map(|z| [z[0] * x0, z[1] * x0]).collect();
        sosfilt(&sos, buffer, &mut state)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal_processing::sos::sos_to_tf;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_odd_extension() {
        let x = [1.0, 2.0, 4.0, 7.0, 11.0];
        let ext = odd_extension(&x, 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 11.0, 15.0, 18.0]);
    }

    #[test]
    fn test_odd_extension_zero_padlen() {
        let x = [3.0, 1.0];
        assert_eq!(odd_extension(&x, 0), vec![3.0, 1.0]);
    }

    #[test]
    fn test_padlen() {
        assert_eq!(tf_padlen(9, 9), 27);
        assert_eq!(tf_padlen(1, 3), 9);

        let sos = vec![Biquad::new([1.0, 0.0, -1.0], [1.0, -1.5, 0.7]); 4];
        assert_eq!(sos_padlen(&sos), 27);

        let first_order = [Biquad::new([0.5, 0.5, 0.0], [1.0, -0.2, 0.0])];
        assert_eq!(sos_padlen(&first_order), 6);
    }

    #[test]
    fn test_filtfilt_identity() {
        let x: Vec<f64> = (0..20).map(|i| (i as f64 * 0.3).sin()).collect();
        let y = filtfilt(&[1.0], &[1.0], &x).unwrap();
        assert_eq!(y.len(), x.len());
        for (a, b) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_filtfilt_preserves_constant() {
        // Low-pass with unit DC gain must leave a constant untouched
        let b = [0.25, 0.5, 0.25];
        let a = [1.0, -0.2, 0.1];
        let dc = b.iter().sum::<f64>() / a.iter().sum::<f64>();
        let b: Vec<f64> = b.iter().map(|c| c / dc).collect();

        let x = vec![2.5; 30];
        let y = filtfilt(&b, &a, &x).unwrap();
        for &v in &y {
            assert_abs_diff_eq!(v, 2.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_filtfilt_short_signal() {
        let b = [0.25, 0.5, 0.25];
        let a = [1.0, -0.2, 0.1];
        let x = vec![1.0; 9];
        match filtfilt(&b, &a, &x) {
            Err(FilterError::InsufficientLength { needed, available }) => {
                assert_eq!(needed, 10);
                assert_eq!(available, 9);
            }
            other => panic!("expected InsufficientLength, got {:?}", other),
        }
        assert!(filtfilt(&b, &a, &[1.0; 10]).is_ok());
    }

    #[test]
    fn test_filtfilt_invalid_coefficients() {
        let x = vec![0.0; 100];
        assert!(matches!(
            filtfilt(&[1.0], &[0.0, 1.0], &x),
            Err(FilterError::InvalidCoefficients(_))
        ));
        assert!(matches!(
            filtfilt(&[f64::NAN], &[1.0], &x),
            Err(FilterError::InvalidCoefficients(_))
        ));
        assert!(matches!(
            sosfiltfilt(&[], &x),
            Err(FilterError::InvalidCoefficients(_))
        ));
    }

    #[test]
    fn test_filtfilt_does_not_mutate_input() {
        let x: Vec<f64> = (0..64).map(|i| i as f64).collect();
        let copy = x.clone();
        let _ = filtfilt(&[0.5, 0.5], &[1.0], &x).unwrap();
        assert_eq!(x, copy);
    }

    #[test]
    fn test_sosfiltfilt_matches_filtfilt() {
        let sos = [
            Biquad::new([0.1, 0.0, -0.1], [1.0, -1.6, 0.8]),
            Biquad::new([1.0, 0.0, -1.0], [1.0, -1.4, 0.7]),
        ];
        let tf = sos_to_tf(&sos);

        let x: Vec<f64> = (0..200)
            .map(|i| (i as f64 * 0.2).sin() + 0.3 * (i as f64 * 1.3).cos() + 0.5)
            .collect();

        let y_sos = sosfiltfilt(&sos, &x).unwrap();
        let y_tf = filtfilt(&tf.b, &tf.a, &x).unwrap();
        for (a, b) in y_sos.iter().zip(y_tf.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }
}
