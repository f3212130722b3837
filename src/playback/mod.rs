//! Playback service seam, pause-aware clock, and position tracking.

mod clock;
mod service;
mod sync;

use thiserror::Error;

pub use clock::PlaybackClock;
pub use service::{PlaybackHandle, PlaybackService};
pub use sync::{PlaybackDirection, PlaybackSync, TickOutcome};

/// Errors raised while starting playback.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio output device could not be opened.
    #[error("Failed to open audio output: {message}")]
    OpenStream { message: String },
    /// The requested segment contained no samples.
    #[error("Nothing to play: the requested segment is empty")]
    EmptySegment,
    /// The buffer reported a sample rate the output cannot use.
    #[error("Invalid playback sample rate: {0}")]
    InvalidSampleRate(u32),
}
