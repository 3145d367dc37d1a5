use crate::error::{FilterError, Result};
use num_complex::Complex64;

use super::butterworth::Zpk;

/// One second-order section: `b0 + b1 z^-1 + b2 z^-2` over `a0 + a1 z^-1 + a2 z^-2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Default for Biquad {
    fn default() -> Self {
        Self {
            b: [1.0, 0.0, 0.0],
            a: [1.0, 0.0, 0.0],
        }
    }
}

impl Biquad {
    pub fn new(b: [f64; 3], a: [f64; 3]) -> Self {
        Self { b, a }
    }

    /// Build a section from at most two zeros and two poles
    ///
    /// Complex roots must be passed together with their conjugate.
    fn from_roots(zeros: &[Complex64], poles: &[Complex64]) -> Self {
        Self {
            b: quadratic(zeros),
            a: quadratic(poles),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.b.iter().chain(self.a.iter()).all(|c| c.is_finite())
    }

    /// Scale so that `a0 == 1`
    ///
    /// # Errors
    /// Returns `FilterError::InvalidCoefficients` for non-finite values or `a0 == 0`
    pub fn normalized(&self) -> Result<Self> {
        if !self.is_finite() {
            return Err(FilterError::InvalidCoefficients(
                "section contains non-finite values".to_string(),
            ));
        }
        let a0 = self.a[0];
        if a0 == 0.0 {
            return Err(FilterError::InvalidCoefficients(
                "leading denominator coefficient is zero".to_string(),
            ));
        }
        Ok(Self {
            b: self.b.map(|c| c / a0),
            a: self.a.map(|c| c / a0),
        })
    }

    /// Direct form II transposed step. Assumes `a0 == 1`.
    #[inline]
    pub fn process(&self, x: f64, state: &mut [f64; 2]) -> f64 {
        let y = self.b[0] * x + state[0];
        state[0] = self.b[1] * x - self.a[1] * y + state[1];
        state[1] = self.b[2] * x - self.a[2] * y;
        y
    }

    /// Complex response at `w` radians/sample
    pub fn response(&self, w: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -w);
        let z2 = z1 * z1;
        let num = self.b[0] + z1 * self.b[1] + z2 * self.b[2];
        let den = self.a[0] + z1 * self.a[1] + z2 * self.a[2];
        num / den
    }
}

// Real coefficients of prod(1 - r z^-1), padded to three terms
fn quadratic(roots: &[Complex64]) -> [f64; 3] {
    match roots {
        [] => [1.0, 0.0, 0.0],
        [r] => [1.0, -r.re, 0.0],
        [r1, r2] => [1.0, -(r1 + r2).re, (r1 * r2).re],
        _ => unreachable!("a section holds at most two roots"),
    }
}

/// Transfer function coefficients, numerator `b` and denominator `a`
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

/// Convert a ZPK filter into cascaded second-order sections
///
/// Poles are grouped into conjugate pairs (real poles pair with each other)
/// and sections are ordered so the poles closest to the unit circle come
/// last. Each section takes the zeros nearest its poles, and the overall gain
/// is applied to the first section.
///
/// # Errors
/// Returns `FilterError::InvalidCoefficients` if the roots are not
/// conjugate-symmetric or there are more zeros than poles.
pub fn zpk_to_sos(zpk: &Zpk) -> Result<Vec<Biquad>> {
    if zpk.zeros.len() > zpk.poles.len() {
        return Err(FilterError::InvalidCoefficients(format!(
            "{} zeros but only {} poles",
            zpk.zeros.len(),
            zpk.poles.len()
        )));
    }
    if zpk.poles.is_empty() {
        return Ok(vec![Biquad::new([zpk.gain, 0.0, 0.0], [1.0, 0.0, 0.0])]);
    }

    let mut groups = group_poles(&zpk.poles)?;
    groups.sort_by(|x, y| unit_circle_distance(y).total_cmp(&unit_circle_distance(x)));

    let (mut complex_zeros, mut real_zeros) = split_conjugates(&zpk.zeros)?;

    // Most resonant pole pairs pick their zeros first, single real poles last
    let mut assignment: Vec<usize> = (0..groups.len()).collect();
    assignment.sort_by(|&i, &j| {
        (groups[i].len() == 1)
            .cmp(&(groups[j].len() == 1))
            .then(unit_circle_distance(&groups[i]).total_cmp(&unit_circle_distance(&groups[j])))
    });

    let mut sections = vec![Biquad::default(); groups.len()];
    for idx in assignment {
        let poles = &groups[idx];
        let anchor = nearest_to_unit_circle(poles);
        let mut zeros: Vec<Complex64> = Vec::with_capacity(2);

        if poles.len() == 2 && !complex_zeros.is_empty() {
            let (ci, c_dist) = nearest(&complex_zeros, anchor);
            let real_dist = real_zeros
                .iter()
                .map(|&r| (Complex64::new(r, 0.0) - anchor).norm())
                .fold(f64::INFINITY, f64::min);
            if real_zeros.len() < 2 || c_dist <= real_dist {
                let c = complex_zeros.swap_remove(ci);
                zeros.push(c);
                zeros.push(c.conj());
            }
        }

        while zeros.len() < poles.len() && !real_zeros.is_empty() {
            let candidates: Vec<Complex64> =
                real_zeros.iter().map(|&r| Complex64::new(r, 0.0)).collect();
            let (ri, _) = nearest(&candidates, anchor);
            zeros.push(Complex64::new(real_zeros.swap_remove(ri), 0.0));
        }

        sections[idx] = Biquad::from_roots(&zeros, poles);
    }

    if !complex_zeros.is_empty() || !real_zeros.is_empty() {
        return Err(FilterError::InvalidCoefficients(
            "zeros could not be paired with poles".to_string(),
        ));
    }

    for c in sections[0].b.iter_mut() {
        *c *= zpk.gain;
    }

    Ok(sections)
}

/// Expand cascaded sections into a single transfer function
///
/// High-order polynomials lose precision; filter with the sections instead
/// and use this only to inspect or export `(b, a)`.
pub fn sos_to_tf(sos: &[Biquad]) -> TransferFunction {
    let mut b = vec![1.0];
    let mut a = vec![1.0];
    for section in sos {
        b = convolve(&b, &section.b);
        a = convolve(&a, &section.a);
    }
    TransferFunction { b, a }
}

/// Complex response of a cascade at `w` radians/sample
pub fn sos_response(sos: &[Biquad], w: f64) -> Complex64 {
    sos.iter()
        .map(|s| s.response(w))
        .fold(Complex64::new(1.0, 0.0), |acc, h| acc * h)
}

fn convolve(p: &[f64], q: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; p.len() + q.len() - 1];
    for (i, &pi) in p.iter().enumerate() {
        for (j, &qj) in q.iter().enumerate() {
            out[i + j] += pi * qj;
        }
    }
    out
}

// Upper-half-plane representatives of complex conjugate pairs, plus real roots
fn split_conjugates(roots: &[Complex64]) -> Result<(Vec<Complex64>, Vec<f64>)> {
    let mut upper = Vec::new();
    let mut lower = 0usize;
    let mut real = Vec::new();

    for &r in roots {
        let tol = 100.0 * f64::EPSILON * r.norm();
        if r.im.abs() <= tol {
            real.push(r.re);
        } else if r.im > 0.0 {
            upper.push(r);
        } else {
            lower += 1;
        }
    }

    if upper.len() != lower {
        return Err(FilterError::InvalidCoefficients(
            "complex roots are not in conjugate pairs".to_string(),
        ));
    }
    Ok((upper, real))
}

fn group_poles(poles: &[Complex64]) -> Result<Vec<Vec<Complex64>>> {
    let (complex, mut real) = split_conjugates(poles)?;

    let mut groups: Vec<Vec<Complex64>> = complex.into_iter().map(|c| vec![c, c.conj()]).collect();

    real.sort_by(|x, y| (1.0 - x.abs()).abs().total_cmp(&(1.0 - y.abs()).abs()));
    groups.extend(
        real.chunks(2)
            .map(|pair| pair.iter().map(|&r| Complex64::new(r, 0.0)).collect()),
    );
    Ok(groups)
}

fn unit_circle_distance(roots: &[Complex64]) -> f64 {
    roots
        .iter()
        .map(|r| (1.0 - r.norm()).abs())
        .fold(f64::INFINITY, f64::min)
}

fn nearest_to_unit_circle(roots: &[Complex64]) -> Complex64 {
    roots
        .iter()
        .copied()
        .min_by(|x, y| (1.0 - x.norm()).abs().total_cmp(&(1.0 - y.norm()).abs()))
        .unwrap_or_default()
}

fn nearest(candidates: &[Complex64], target: Complex64) -> (usize, f64) {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (i, (c - target).norm()))
        .min_by(|x, y| x.1.total_cmp(&y.1))
        .unwrap_or((0, f64::INFINITY))
}
