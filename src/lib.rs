//! Waveform editing core for Epoch123: sample buffers, selections, undoable edits,
//! and playback position tracking.
/// Application directory helpers.
pub mod app_dirs;
/// Audio decoding, encoding, and device playback.
pub mod audio;
/// Persisted editor settings.
pub mod config;
/// Buffer, history, view, and edit operations.
pub mod editor;
/// Aggregated error type for editor entry points.
pub mod error;
/// Tracing subscriber setup.
pub mod logging;
/// Playback service seam and position tracking.
pub mod playback;
/// Selection math and drag gestures.
pub mod selection;

pub use editor::{EditorSession, PlotFrame, PlotObserver, SampleBuffer, ViewWindow};
pub use error::{EditorError, ErrorCategory};
pub use selection::{SelectionModel, SelectionPhase, SelectionRegion};
