//! Pure sample transforms behind the crop and gate edits.

use crate::selection::SelectionRegion;

/// Keep only `samples[start..end]`. `None` when the clamped region is empty.
pub fn crop_selected(samples: &[f64], region: SelectionRegion) -> Option<Vec<f64>> {
    let end = region.end().min(samples.len());
    let start = region.start().min(end);
    let cropped = samples[start..end].to_vec();
    (!cropped.is_empty()).then_some(cropped)
}

/// Drop `samples[start..end]`, joining what lies on either side.
///
/// `None` when nothing would remain, so the buffer never becomes empty.
pub fn crop_unselected(samples: &[f64], region: SelectionRegion) -> Option<Vec<f64>> {
    let end = region.end().min(samples.len());
    let start = region.start().min(end);
    let mut kept = Vec::with_capacity(samples.len() - (end - start));
    kept.extend_from_slice(&samples[..start]);
    kept.extend_from_slice(&samples[end..]);
    (!kept.is_empty()).then_some(kept)
}

/// Zero every sample quieter than `decibel_level` relative to the peak.
///
/// Length is unchanged. `None` for a silent buffer or a non-finite level.
pub fn trim_by_threshold(samples: &[f64], decibel_level: f64) -> Option<Vec<f64>> {
    if !decibel_level.is_finite() {
        return None;
    }
    let reference = samples.iter().fold(0.0_f64, |peak, s| peak.max(s.abs()));
    if reference == 0.0 {
        return None;
    }
    let threshold = reference * 10f64.powf(decibel_level / 20.0);
    Some(
        samples
            .iter()
            .map(|&sample| if sample.abs() < threshold { 0.0 } else { sample })
            .collect(),
    )
}
