use std::time::Instant;

use rodio::{OutputStream, OutputStreamBuilder, Sink, buffer::SamplesBuffer};
use tracing::{debug, info};

use crate::playback::{PlaybackClock, PlaybackError, PlaybackHandle, PlaybackService};

/// Default-device playback through a rodio sink, timed with a pause-aware clock.
pub struct RodioPlaybackService {
    stream: OutputStream,
    sink: Option<Sink>,
    current: Option<PlaybackHandle>,
    next_id: u64,
    clock: PlaybackClock,
    volume: f32,
}

impl RodioPlaybackService {
    /// Open the system default output device.
    pub fn open_default() -> Result<Self, PlaybackError> {
        let stream =
            OutputStreamBuilder::open_default_stream().map_err(|err| PlaybackError::OpenStream {
                message: err.to_string(),
            })?;
        info!("Opened default audio output");
        Ok(Self::with_stream(stream))
    }

    /// Wrap an already opened output stream.
    pub fn with_stream(stream: OutputStream) -> Self {
        Self {
            stream,
            sink: None,
            current: None,
            next_id: 0,
            clock: PlaybackClock::new(),
            volume: 1.0,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn is_current(&self, handle: PlaybackHandle) -> bool {
        self.current == Some(handle)
    }
}

impl PlaybackService for RodioPlaybackService {
    fn load_and_play(
        &mut self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<PlaybackHandle, PlaybackError> {
        if samples.is_empty() {
            return Err(PlaybackError::EmptySegment);
        }
        if sample_rate == 0 {
            return Err(PlaybackError::InvalidSampleRate(sample_rate));
        }
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        let data: Vec<f32> = samples.iter().map(|&sample| sample as f32).collect();
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(SamplesBuffer::new(1, sample_rate, data));
        sink.play();
        self.next_id += 1;
        let handle = PlaybackHandle::new(self.next_id);
        self.current = Some(handle);
        self.sink = Some(sink);
        self.clock.start(Instant::now());
        debug!(id = handle.id(), samples = samples.len(), sample_rate, "Sink started");
        Ok(handle)
    }

    fn pause(&mut self, handle: PlaybackHandle) {
        if !self.is_current(handle) {
            return;
        }
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        self.clock.pause(Instant::now());
    }

    fn resume(&mut self, handle: PlaybackHandle) {
        if !self.is_current(handle) {
            return;
        }
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
        self.clock.resume(Instant::now());
    }

    fn stop(&mut self, handle: PlaybackHandle) {
        if !self.is_current(handle) {
            return;
        }
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.current = None;
        self.clock.stop();
    }

    fn elapsed_ms(&self, handle: PlaybackHandle) -> f64 {
        if !self.is_current(handle) {
            return 0.0;
        }
        self.clock.elapsed(Instant::now()).as_secs_f64() * 1000.0
    }

    fn is_active(&self, handle: PlaybackHandle) -> bool {
        self.is_current(handle) && self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.volume);
        }
    }
}
