use epoch123::playback::{PlaybackError, PlaybackHandle, PlaybackService};

/// Deterministic playback service: time only moves when a test sets `elapsed_ms`.
#[derive(Debug, Default)]
pub struct ScriptedPlayback {
    next_id: u64,
    current: Option<PlaybackHandle>,
    pub elapsed_ms: f64,
    pub finished: bool,
    pub fail_next: bool,
    pub paused: bool,
    pub volume: f32,
    pub stop_calls: usize,
    pub loaded: Vec<(Vec<f64>, u32)>,
}

impl ScriptedPlayback {
    pub fn current(&self) -> Option<PlaybackHandle> {
        self.current
    }
}

impl PlaybackService for ScriptedPlayback {
    fn load_and_play(
        &mut self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<PlaybackHandle, PlaybackError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(PlaybackError::OpenStream {
                message: "scripted failure".into(),
            });
        }
        self.next_id += 1;
        let handle = PlaybackHandle::new(self.next_id);
        self.current = Some(handle);
        self.elapsed_ms = 0.0;
        self.finished = false;
        self.paused = false;
        self.loaded.push((samples.to_vec(), sample_rate));
        Ok(handle)
    }

    fn pause(&mut self, handle: PlaybackHandle) {
        if self.current == Some(handle) {
            self.paused = true;
        }
    }

    fn resume(&mut self, handle: PlaybackHandle) {
        if self.current == Some(handle) {
            self.paused = false;
        }
    }

    fn stop(&mut self, handle: PlaybackHandle) {
        if self.current == Some(handle) {
            self.current = None;
            self.stop_calls += 1;
        }
    }

    fn elapsed_ms(&self, handle: PlaybackHandle) -> f64 {
        if self.current == Some(handle) {
            self.elapsed_ms
        } else {
            0.0
        }
    }

    fn is_active(&self, handle: PlaybackHandle) -> bool {
        self.current == Some(handle) && !self.finished
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}
