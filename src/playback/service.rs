use super::PlaybackError;

/// Opaque token for one `load_and_play` session.
///
/// Services ignore calls made with a handle that is no longer current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(u64);

impl PlaybackHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Audio output collaborator driven by [`super::PlaybackSync`].
pub trait PlaybackService {
    /// Start playing `samples` (mono) at `sample_rate`, replacing any current session.
    fn load_and_play(
        &mut self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<PlaybackHandle, PlaybackError>;

    fn pause(&mut self, handle: PlaybackHandle);

    fn resume(&mut self, handle: PlaybackHandle);

    fn stop(&mut self, handle: PlaybackHandle);

    /// Milliseconds played for `handle`, excluding paused time. Zero for stale handles.
    fn elapsed_ms(&self, handle: PlaybackHandle) -> f64;

    /// True while `handle` is current and still has audio queued.
    fn is_active(&self, handle: PlaybackHandle) -> bool;

    /// Output volume in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);
}
