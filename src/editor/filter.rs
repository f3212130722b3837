//! Fourth-order Butterworth design and zero-phase forward-backward filtering.
//!
//! Design follows the classic route: analog prototype poles, frequency
//! transform to the target band, bilinear transform, then expansion of the
//! zeros and poles into transfer-function polynomials. Cutoffs are fractions
//! of Nyquist.

use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use thiserror::Error;

/// Butterworth order used by the editor filters.
pub const FILTER_ORDER: usize = 4;
const LOW_PASS_CUTOFF: f64 = 0.1;
const HIGH_PASS_CUTOFF: f64 = 0.1;
const BAND_PASS_EDGES: (f64, f64) = (0.05, 0.15);

/// Bilinear transform with the sample rate normalized so Nyquist is 1.
const NORMALIZED_FS: f64 = 2.0;

type C64 = Complex<f64>;

/// Errors raised while designing or applying a filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Cannot filter an empty buffer")]
    EmptyBuffer,
    #[error("Cutoff {0} must lie strictly between 0 and 1 (fraction of Nyquist)")]
    InvalidCutoff(f64),
    #[error("Band edges {low}..{high} must be ordered")]
    InvalidBand { low: f64, high: f64 },
    #[error("Filter produced non-finite output")]
    Unstable,
}

/// Editor filter presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
}

impl FilterKind {
    /// Cutoffs used for this preset.
    pub fn band(self) -> FilterBand {
        match self {
            FilterKind::LowPass => FilterBand::LowPass(LOW_PASS_CUTOFF),
            FilterKind::HighPass => FilterBand::HighPass(HIGH_PASS_CUTOFF),
            FilterKind::BandPass => FilterBand::BandPass(BAND_PASS_EDGES.0, BAND_PASS_EDGES.1),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::LowPass => "Low-pass filter",
            FilterKind::HighPass => "High-pass filter",
            FilterKind::BandPass => "Band-pass filter",
        }
    }
}

/// Pass band with cutoffs as fractions of Nyquist.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterBand {
    LowPass(f64),
    HighPass(f64),
    BandPass(f64, f64),
}

/// Transfer-function coefficients with `a[0] == 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

/// Apply the preset `kind` forward and backward over `samples`.
pub fn apply_filter(samples: &[f64], kind: FilterKind) -> Result<Vec<f64>, FilterError> {
    if samples.is_empty() {
        return Err(FilterError::EmptyBuffer);
    }
    let coefficients = butterworth(FILTER_ORDER, kind.band())?;
    filtfilt(&coefficients, samples)
}

/// Design a digital Butterworth filter of `order`.
pub fn butterworth(order: usize, band: FilterBand) -> Result<FilterCoefficients, FilterError> {
    let order = order.max(1);
    let prototype = analog_prototype(order);
    let analog = match band {
        FilterBand::LowPass(cutoff) => to_low_pass(prototype, prewarp(cutoff)?),
        FilterBand::HighPass(cutoff) => to_high_pass(prototype, prewarp(cutoff)?),
        FilterBand::BandPass(low, high) => {
            if low >= high {
                return Err(FilterError::InvalidBand { low, high });
            }
            let (w1, w2) = (prewarp(low)?, prewarp(high)?);
            to_band_pass(prototype, (w1 * w2).sqrt(), w2 - w1)
        }
    };
    let digital = bilinear(analog);
    let b: Vec<f64> = poly(&digital.zeros)
        .into_iter()
        .map(|c| (c * digital.gain).re)
        .collect();
    let a: Vec<f64> = poly(&digital.poles).into_iter().map(|c| c.re).collect();
    if b.iter().chain(&a).any(|v| !v.is_finite()) {
        return Err(FilterError::Unstable);
    }
    Ok(FilterCoefficients { b, a })
}

/// Zero-phase filtering with odd-extension padding and steady-state initial conditions.
pub fn filtfilt(coefficients: &FilterCoefficients, samples: &[f64]) -> Result<Vec<f64>, FilterError> {
    if samples.is_empty() {
        return Err(FilterError::EmptyBuffer);
    }
    let (b, a) = normalized(coefficients);
    let pad = (3 * b.len()).min(samples.len() - 1);
    let extended = odd_extension(samples, pad);
    let zi = steady_state(&b, &a);

    let head = extended[0];
    let mut forward = lfilter(&b, &a, &extended, zi.iter().map(|z| z * head).collect());
    forward.reverse();
    let tail = forward[0];
    let mut output = lfilter(&b, &a, &forward, zi.iter().map(|z| z * tail).collect());
    output.reverse();

    let filtered = output[pad..output.len() - pad].to_vec();
    if filtered.iter().any(|v| !v.is_finite()) {
        return Err(FilterError::Unstable);
    }
    Ok(filtered)
}

struct Zpk {
    zeros: Vec<C64>,
    poles: Vec<C64>,
    gain: f64,
}

fn analog_prototype(order: usize) -> Zpk {
    let n = order as i64;
    let poles = (-n + 1..n)
        .step_by(2)
        .map(|m| -C64::from_polar(1.0, PI * m as f64 / (2 * n) as f64))
        .collect();
    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

fn prewarp(cutoff: f64) -> Result<f64, FilterError> {
    if !(cutoff > 0.0 && cutoff < 1.0) {
        return Err(FilterError::InvalidCutoff(cutoff));
    }
    Ok(2.0 * NORMALIZED_FS * (PI * cutoff / NORMALIZED_FS).tan())
}

fn to_low_pass(zpk: Zpk, wo: f64) -> Zpk {
    let degree = (zpk.poles.len() - zpk.zeros.len()) as i32;
    Zpk {
        zeros: zpk.zeros.iter().map(|z| *z * wo).collect(),
        poles: zpk.poles.iter().map(|p| *p * wo).collect(),
        gain: zpk.gain * wo.powi(degree),
    }
}

fn to_high_pass(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.poles.len() - zpk.zeros.len();
    let numerator: C64 = zpk.zeros.iter().map(|z| -*z).product();
    let denominator: C64 = zpk.poles.iter().map(|p| -*p).product();
    let wo = C64::new(wo, 0.0);
    let mut zeros: Vec<C64> = zpk.zeros.iter().map(|z| wo / *z).collect();
    zeros.extend(std::iter::repeat_n(C64::new(0.0, 0.0), degree));
    Zpk {
        zeros,
        poles: zpk.poles.iter().map(|p| wo / *p).collect(),
        gain: zpk.gain * (numerator / denominator).re,
    }
}

fn to_band_pass(zpk: Zpk, wo: f64, bandwidth: f64) -> Zpk {
    let degree = zpk.poles.len() - zpk.zeros.len();
    let split = |roots: &[C64]| -> Vec<C64> {
        let scaled: Vec<C64> = roots.iter().map(|r| *r * (bandwidth / 2.0)).collect();
        let offset = |r: &C64| (*r * *r - wo * wo).sqrt();
        scaled
            .iter()
            .map(|r| *r + offset(r))
            .chain(scaled.iter().map(|r| *r - offset(r)))
            .collect()
    };
    let mut zeros = split(&zpk.zeros);
    zeros.extend(std::iter::repeat_n(C64::new(0.0, 0.0), degree));
    Zpk {
        zeros,
        poles: split(&zpk.poles),
        gain: zpk.gain * bandwidth.powi(degree as i32),
    }
}

fn bilinear(zpk: Zpk) -> Zpk {
    let fs2 = C64::new(2.0 * NORMALIZED_FS, 0.0);
    let degree = zpk.poles.len() - zpk.zeros.len();
    let numerator: C64 = zpk.zeros.iter().map(|z| fs2 - *z).product();
    let denominator: C64 = zpk.poles.iter().map(|p| fs2 - *p).product();
    let mut zeros: Vec<C64> = zpk.zeros.iter().map(|z| (fs2 + *z) / (fs2 - *z)).collect();
    zeros.extend(std::iter::repeat_n(C64::new(-1.0, 0.0), degree));
    Zpk {
        zeros,
        poles: zpk.poles.iter().map(|p| (fs2 + *p) / (fs2 - *p)).collect(),
        gain: zpk.gain * (numerator / denominator).re,
    }
}

/// Monic polynomial coefficients (highest power first) with the given roots.
fn poly(roots: &[C64]) -> Vec<C64> {
    let mut coeffs = vec![C64::new(1.0, 0.0)];
    for root in roots {
        coeffs.push(C64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= *root * prev;
        }
    }
    coeffs
}

/// Pad `b` and `a` to equal length and scale so `a[0] == 1`.
fn normalized(coefficients: &FilterCoefficients) -> (Vec<f64>, Vec<f64>) {
    let n = coefficients.b.len().max(coefficients.a.len()).max(1);
    let lead = coefficients.a.first().copied().filter(|v| *v != 0.0).unwrap_or(1.0);
    let mut b = vec![0.0; n];
    let mut a = vec![0.0; n];
    for (dst, src) in b.iter_mut().zip(&coefficients.b) {
        *dst = src / lead;
    }
    for (dst, src) in a.iter_mut().zip(&coefficients.a) {
        *dst = src / lead;
    }
    a[0] = 1.0;
    (b, a)
}

fn odd_extension(samples: &[f64], pad: usize) -> Vec<f64> {
    let len = samples.len();
    let first = samples[0];
    let last = samples[len - 1];
    let mut extended = Vec::with_capacity(len + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - samples[i]));
    extended.extend_from_slice(samples);
    extended.extend((1..=pad).map(|i| 2.0 * last - samples[len - 1 - i]));
    extended
}

/// Filter state that yields a constant unit output for a constant unit input.
fn steady_state(b: &[f64], a: &[f64]) -> Vec<f64> {
    let n = a.len();
    if n < 2 {
        return Vec::new();
    }
    let a_sum: f64 = a.iter().sum();
    let gain = if a_sum.abs() > f64::EPSILON {
        b.iter().sum::<f64>() / a_sum
    } else {
        0.0
    };
    let mut zi = vec![0.0; n - 1];
    zi[n - 2] = b[n - 1] - a[n - 1] * gain;
    for i in (0..n - 2).rev() {
        zi[i] = b[i + 1] - a[i + 1] * gain + zi[i + 1];
    }
    zi
}

/// Direct form II transposed IIR filter starting from state `z`.
fn lfilter(b: &[f64], a: &[f64], input: &[f64], mut z: Vec<f64>) -> Vec<f64> {
    let n = a.len();
    let mut output = Vec::with_capacity(input.len());
    for &x in input {
        let y = b[0] * x + z.first().copied().unwrap_or(0.0);
        if n > 1 {
            for i in 0..n - 2 {
                z[i] = b[i + 1] * x + z[i + 1] - a[i + 1] * y;
            }
            z[n - 2] = b[n - 1] * x - a[n - 1] * y;
        }
        output.push(y);
    }
    output
}
