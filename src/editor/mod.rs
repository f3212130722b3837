//! Waveform editing: the sample buffer, undo history, edit operations, and the
//! session that keeps them consistent with the selection and playback marker.

mod buffer;
/// Butterworth design and zero-phase filtering.
pub mod filter;
mod history;
/// Crop and gate sample transforms.
pub mod ops;
/// Spectral bin-remap pitch shift.
pub mod pitch;
mod session;
mod view;

pub use buffer::{SampleBuffer, SourceInfo};
pub use filter::{FilterError, FilterKind};
pub use history::{EditHistory, Snapshot};
pub use session::{EditorSession, PlotFrame, PlotObserver};
pub use view::{AxisTick, ViewWindow};
