/// Decode and encode between files and mono `f64` samples.
pub mod codec;
/// Background decode thread.
pub mod decode_job;
/// rodio-backed playback service.
pub mod player;

pub use codec::{DecodeError, DecodedAudio, EncodeError};
pub use decode_job::{DecodeResult, DecodeWorker};
pub use player::RodioPlaybackService;
