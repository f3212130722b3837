use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{info, warn};

use crate::audio::codec::{self, DecodeError, DecodedAudio, EncodeError};

/// Where the active buffer came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    /// File the samples were decoded from; `None` for in-memory buffers.
    pub path: Option<PathBuf>,
    /// Channel count before downmixing.
    pub channels: u16,
    pub sample_rate: u32,
    pub duration_seconds: f64,
}

/// Decoded mono samples plus their sample rate.
///
/// Samples are an immutable shared slice: edits build a new slice and swap it in,
/// so undo snapshots can hold the previous one without copying.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Arc<[f64]>,
    sample_rate: u32,
    source: Arc<SourceInfo>,
}

impl SampleBuffer {
    /// Decode `path` and downmix to mono.
    pub fn load(path: &Path) -> Result<Self, DecodeError> {
        let decoded = codec::decode(path)?;
        info!(
            "Loaded {} ({} ch, {} Hz, {:.3} s)",
            path.display(),
            decoded.channels,
            decoded.sample_rate,
            decoded.duration_seconds
        );
        Self::from_decoded(decoded, Some(path.to_path_buf()))
    }

    pub fn from_decoded(decoded: DecodedAudio, path: Option<PathBuf>) -> Result<Self, DecodeError> {
        if decoded.samples.is_empty() {
            return Err(DecodeError::Empty);
        }
        if decoded.sample_rate == 0 {
            return Err(DecodeError::InvalidSampleRate);
        }
        let source = SourceInfo {
            path,
            channels: decoded.channels,
            sample_rate: decoded.sample_rate,
            duration_seconds: decoded.duration_seconds,
        };
        Ok(Self {
            samples: Arc::from(decoded.samples),
            sample_rate: decoded.sample_rate,
            source: Arc::new(source),
        })
    }

    /// Wrap in-memory mono samples.
    pub fn from_samples(samples: Vec<f64>, sample_rate: u32) -> Result<Self, DecodeError> {
        let duration_seconds = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f64 / sample_rate as f64
        };
        Self::from_decoded(
            DecodedAudio {
                samples,
                sample_rate,
                channels: 1,
                duration_seconds,
            },
            None,
        )
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Shared handle to the current samples, used for snapshots.
    pub fn shared_samples(&self) -> Arc<[f64]> {
        Arc::clone(&self.samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed buffer.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0_f64, |peak, s| peak.max(s.abs()))
    }

    /// Samples in `[start, end)`, clamped to the buffer.
    pub fn segment(&self, start: usize, end: usize) -> &[f64] {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        &self.samples[start..end]
    }

    /// Millisecond offset of `index` at the buffer's sample rate.
    pub fn index_to_ms(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate as f64 * 1000.0
    }

    /// Swap in a new sample slice. Empty input is refused and returns false.
    pub fn replace(&mut self, samples: Arc<[f64]>) -> bool {
        if samples.is_empty() {
            warn!("Refusing to replace buffer with zero samples");
            return false;
        }
        self.samples = samples;
        true
    }

    /// Write the current samples as a mono float WAV.
    pub fn export(&self, path: &Path) -> Result<(), EncodeError> {
        codec::encode(path, &self.samples, self.sample_rate)?;
        info!("Exported {} samples to {}", self.samples.len(), path.display());
        Ok(())
    }
}
