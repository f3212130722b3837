use tracing::{debug, info, warn};

use super::{PlaybackError, PlaybackHandle, PlaybackService};
use crate::editor::SampleBuffer;
use crate::selection::SelectionRegion;

/// Direction the position marker travels through the playing segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackDirection {
    Forward,
    Reverse,
}

/// Result of one polling step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is playing; no polling needed.
    Idle,
    /// Playback is paused; the marker did not move.
    Paused,
    /// The marker moved to the given sample index.
    Advanced(usize),
    /// The marker left the selection, or its segment drained; playback stopped and the marker reset to the selection start.
    LeftSelection(usize),
    /// The service finished without a selection; polling stopped and the marker reset to zero.
    Finished,
}

#[derive(Clone, Copy, Debug)]
struct ActiveSegment {
    handle: PlaybackHandle,
    start: usize,
    end: usize,
    sample_rate: u32,
    direction: PlaybackDirection,
}

/// Polling tracker that maps playback service time onto buffer sample indices.
///
/// The service is lent by the owner on every call so no global player exists.
#[derive(Debug, Default)]
pub struct PlaybackSync {
    active: Option<ActiveSegment>,
    position_marker: usize,
    is_playing: bool,
    paused: bool,
}

impl PlaybackSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position_marker(&self) -> usize {
        self.position_marker
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True while the owner should keep calling [`Self::tick`].
    pub fn is_polling(&self) -> bool {
        self.active.is_some() && !self.paused
    }

    pub fn direction(&self) -> Option<PlaybackDirection> {
        self.active.map(|segment| segment.direction)
    }

    /// Play the selection, or the whole buffer without one.
    pub fn play<P: PlaybackService>(
        &mut self,
        service: &mut P,
        buffer: &SampleBuffer,
        selection: Option<SelectionRegion>,
    ) -> Result<(), PlaybackError> {
        self.start(service, buffer, selection, PlaybackDirection::Forward)
    }

    /// Play the same segment as [`Self::play`] backwards; the marker runs from its end toward its start.
    pub fn play_reversed<P: PlaybackService>(
        &mut self,
        service: &mut P,
        buffer: &SampleBuffer,
        selection: Option<SelectionRegion>,
    ) -> Result<(), PlaybackError> {
        self.start(service, buffer, selection, PlaybackDirection::Reverse)
    }

    fn start<P: PlaybackService>(
        &mut self,
        service: &mut P,
        buffer: &SampleBuffer,
        selection: Option<SelectionRegion>,
        direction: PlaybackDirection,
    ) -> Result<(), PlaybackError> {
        self.stop(service);
        let len = buffer.len();
        let (start, end) = selection
            .map(|region| (region.start().min(len), region.end().min(len)))
            .unwrap_or((0, len));
        if start >= end {
            return Err(PlaybackError::EmptySegment);
        }
        let sample_rate = buffer.sample_rate();
        let segment = &buffer.samples()[start..end];
        let loaded = match direction {
            PlaybackDirection::Forward => service.load_and_play(segment, sample_rate),
            PlaybackDirection::Reverse => {
                let reversed: Vec<f64> = segment.iter().rev().copied().collect();
                service.load_and_play(&reversed, sample_rate)
            }
        };
        let handle = loaded.inspect_err(|err| {
            warn!("Playback failed to start: {err}");
            self.is_playing = false;
        })?;
        let start_offset_ms = start as f64 / sample_rate as f64 * 1000.0;
        info!(
            start,
            end,
            start_offset_ms,
            ?direction,
            "Playback started"
        );
        self.active = Some(ActiveSegment {
            handle,
            start,
            end,
            sample_rate,
            direction,
        });
        self.is_playing = true;
        self.paused = false;
        self.position_marker = match direction {
            PlaybackDirection::Forward => start,
            PlaybackDirection::Reverse => end,
        };
        Ok(())
    }

    /// Advance the marker from the service clock, re-reading the selection each time.
    pub fn tick<P: PlaybackService>(
        &mut self,
        service: &mut P,
        selection: Option<SelectionRegion>,
    ) -> TickOutcome {
        let Some(segment) = self.active else {
            return TickOutcome::Idle;
        };
        if self.paused {
            return TickOutcome::Paused;
        }
        let elapsed_ms = service.elapsed_ms(segment.handle);
        let played = (elapsed_ms / 1000.0 * segment.sample_rate as f64) as i64;
        let index = match segment.direction {
            PlaybackDirection::Forward => segment.start as i64 + played,
            PlaybackDirection::Reverse => segment.end as i64 - played,
        };
        if let Some(region) = selection {
            let outside = match segment.direction {
                PlaybackDirection::Forward => {
                    index < region.start() as i64 || index >= region.end() as i64
                }
                PlaybackDirection::Reverse => {
                    index < region.start() as i64 || index > region.end() as i64
                }
            };
            // A drained selection segment counts as leaving the selection.
            if outside || !service.is_active(segment.handle) {
                return self.leave_selection(service, segment.handle, region, index);
            }
        } else if !service.is_active(segment.handle) {
            debug!("Playback finished");
            self.reset();
            return TickOutcome::Finished;
        }
        let marker = index.clamp(segment.start as i64, segment.end as i64) as usize;
        self.position_marker = marker;
        TickOutcome::Advanced(marker)
    }

    fn leave_selection<P: PlaybackService>(
        &mut self,
        service: &mut P,
        handle: PlaybackHandle,
        region: SelectionRegion,
        index: i64,
    ) -> TickOutcome {
        service.stop(handle);
        self.reset();
        self.position_marker = region.start();
        debug!(index, start = region.start(), "Playback left selection");
        TickOutcome::LeftSelection(region.start())
    }

    /// Move the marker while nothing is playing; ignored during playback.
    pub fn park_marker(&mut self, index: usize) {
        if self.active.is_none() {
            self.position_marker = index;
        }
    }

    /// Pause the service; the marker holds until [`Self::resume`].
    pub fn pause<P: PlaybackService>(&mut self, service: &mut P) {
        if let Some(segment) = self.active
            && !self.paused
        {
            service.pause(segment.handle);
            self.paused = true;
            self.is_playing = false;
        }
    }

    pub fn resume<P: PlaybackService>(&mut self, service: &mut P) {
        if let Some(segment) = self.active
            && self.paused
        {
            service.resume(segment.handle);
            self.paused = false;
            self.is_playing = true;
        }
    }

    /// Stop playback and reset the marker to zero. Safe to call repeatedly.
    pub fn stop<P: PlaybackService>(&mut self, service: &mut P) {
        if let Some(segment) = self.active {
            service.stop(segment.handle);
        }
        self.reset();
    }

    /// Relay a volume in percent (`0..=100`) to the service.
    pub fn set_volume<P: PlaybackService>(service: &mut P, percent: u8) {
        service.set_volume(f32::from(percent.min(100)) / 100.0);
    }

    /// Forget the current session without touching the service.
    pub(crate) fn reset(&mut self) {
        self.active = None;
        self.is_playing = false;
        self.paused = false;
        self.position_marker = 0;
    }
}
