//! Whole-buffer spectral bin remapping pitch shift.
//!
//! Each bin `k` moves to `round(k * 2^(semitones / 12))`; moved bins past the end
//! are dropped and unfilled bins stay zero. No phase vocoding, so large shifts
//! produce audible comb artifacts.

use rustfft::{FftPlanner, num_complex::Complex};

/// Frequency ratio for a shift of `semitones`.
pub fn pitch_factor(semitones: f64) -> f64 {
    2f64.powf(semitones / 12.0)
}

/// Shift `samples` by `semitones`, returning a buffer of the same length.
pub fn pitch_shift(samples: &[f64], semitones: f64) -> Vec<f64> {
    let len = samples.len();
    if len == 0 || !semitones.is_finite() {
        return samples.to_vec();
    }
    let factor = pitch_factor(semitones);
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(len);
    let inverse = planner.plan_fft_inverse(len);

    let mut spectrum: Vec<Complex<f64>> = samples
        .iter()
        .map(|&re| Complex { re, im: 0.0 })
        .collect();
    forward.process(&mut spectrum);

    let mut shifted = vec![Complex { re: 0.0, im: 0.0 }; len];
    // Ascending order, so on collisions the later source bin wins.
    for (k, bin) in spectrum.iter().enumerate() {
        let target = (k as f64 * factor).round();
        if target >= 0.0 && (target as usize) < len {
            shifted[target as usize] = *bin;
        }
    }
    inverse.process(&mut shifted);

    let scale = 1.0 / len as f64;
    shifted.iter().map(|c| c.re * scale).collect()
}
