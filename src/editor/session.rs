use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tracing::{debug, info, warn};

use super::{
    buffer::SampleBuffer,
    filter::{self, FilterKind},
    history::{EditHistory, Snapshot},
    ops, pitch,
    view::{AxisTick, ViewWindow},
};
use crate::{
    audio::DecodeWorker,
    config::EditorSettings,
    error::EditorError,
    playback::{PlaybackService, PlaybackSync, TickOutcome},
    selection::{SelectionModel, SelectionPhase, SelectionRegion},
};

/// Everything a plot needs to redraw after a state change.
#[derive(Debug, Clone, Copy)]
pub struct PlotFrame<'a> {
    pub samples: &'a [f64],
    pub sample_rate: u32,
    pub view: ViewWindow,
    pub selection: Option<SelectionRegion>,
    pub position_marker: usize,
    pub is_playing: bool,
}

/// Receives a frame after every mutation and every marker move.
pub trait PlotObserver {
    fn on_plot_update(&mut self, frame: &PlotFrame<'_>);
}

/// Owns the buffer, selection, history, view, and playback service for one open file.
///
/// Each edit captures the pre-edit samples and view, computes the new samples,
/// swaps them in, clears the selection, and notifies observers. Edits that need
/// a selection return `Ok(false)` without touching history when there is none.
pub struct EditorSession<P: PlaybackService> {
    settings: EditorSettings,
    buffer: Option<SampleBuffer>,
    original: Option<Arc<[f64]>>,
    selection: SelectionModel,
    history: EditHistory,
    view: ViewWindow,
    playback: PlaybackSync,
    service: P,
    observers: Vec<Box<dyn PlotObserver>>,
    decoder: Option<DecodeWorker>,
}

impl<P: PlaybackService> EditorSession<P> {
    pub fn new(mut service: P, settings: EditorSettings) -> Self {
        let settings = settings.normalized();
        service.set_volume(settings.playback.volume);
        Self {
            selection: SelectionModel::new(settings.selection.min_span_samples),
            history: EditHistory::new(settings.history.limit),
            settings,
            buffer: None,
            original: None,
            view: ViewWindow::full(1),
            playback: PlaybackSync::new(),
            service,
            observers: Vec::new(),
            decoder: None,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn PlotObserver>) {
        self.observers.push(observer);
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn buffer(&self) -> Option<&SampleBuffer> {
        self.buffer.as_ref()
    }

    pub fn view(&self) -> ViewWindow {
        self.view
    }

    pub fn selection(&self) -> Option<SelectionRegion> {
        self.selection.region()
    }

    pub fn selection_phase(&self) -> SelectionPhase {
        self.selection.phase()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn service(&self) -> &P {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut P {
        &mut self.service
    }

    pub fn position_marker(&self) -> usize {
        self.playback.position_marker()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn is_paused(&self) -> bool {
        self.playback.is_paused()
    }

    /// True while the host should call [`Self::tick`] every [`Self::poll_interval`].
    pub fn is_polling(&self) -> bool {
        self.playback.is_polling()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.settings.playback.poll_interval_ms)
    }

    // Loading

    /// Decode `path` on the calling thread and make it the active buffer.
    pub fn load_file(&mut self, path: &Path) -> Result<(), EditorError> {
        let buffer = SampleBuffer::load(path)?;
        self.install_buffer(buffer);
        Ok(())
    }

    /// Make `buffer` active, discarding history and selection.
    pub fn install_buffer(&mut self, buffer: SampleBuffer) {
        self.playback.stop(&mut self.service);
        let len = buffer.len();
        self.original = Some(buffer.shared_samples());
        self.selection.reset(len);
        self.history.clear();
        self.view = ViewWindow::full(len);
        self.buffer = Some(buffer);
        self.notify();
    }

    /// Queue `path` on the background decoder; collect it with [`Self::poll_decoder`].
    pub fn request_load(&mut self, path: impl Into<PathBuf>) -> Result<u64, EditorError> {
        let decoder = match self.decoder.take() {
            Some(decoder) => decoder,
            None => DecodeWorker::spawn()?,
        };
        Ok(self.decoder.insert(decoder).request(path)?)
    }

    /// Install the newest finished decode, ignoring superseded requests.
    ///
    /// Returns true when a new buffer became active. On a decode error the prior buffer stays.
    pub fn poll_decoder(&mut self) -> Result<bool, EditorError> {
        let Some(decoder) = self.decoder.as_ref() else {
            return Ok(false);
        };
        let latest = decoder.latest_request();
        let mut installed = None;
        while let Some(done) = decoder.try_recv()? {
            if Some(done.request_id) != latest {
                debug!("Dropping stale decode of {}", done.path.display());
                continue;
            }
            installed = Some(done.result?);
        }
        match installed {
            Some(buffer) => {
                self.install_buffer(buffer);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Write the current samples to `path`.
    pub fn export(&self, path: &Path) -> Result<(), EditorError> {
        let buffer = self.buffer.as_ref().ok_or(EditorError::NoAudioLoaded)?;
        buffer.export(path)?;
        Ok(())
    }

    // Selection gestures

    /// Select `[min(a, b), max(a, b))`; spans at or below the threshold clear instead.
    pub fn set_selection(&mut self, a: usize, b: usize) -> Option<SelectionRegion> {
        let region = self.selection.set(a, b);
        self.park_marker();
        self.notify();
        region
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.park_marker();
            self.notify();
        }
    }

    pub fn pointer_pressed(&mut self, x: f64, width_px: f64) {
        self.selection.begin_drag(self.view.sample_at(x, width_px));
        self.notify();
    }

    pub fn pointer_dragged(&mut self, x: f64, width_px: f64) {
        if self.selection.is_dragging() {
            self.selection.update_drag(self.view.sample_at(x, width_px));
            self.notify();
        }
    }

    pub fn pointer_released(&mut self, x: f64, width_px: f64) -> Option<SelectionRegion> {
        let region = self.selection.finish_drag(self.view.sample_at(x, width_px));
        self.park_marker();
        self.notify();
        region
    }

    /// A press-release without movement; always clears the selection.
    pub fn pointer_clicked(&mut self, x: f64, width_px: f64) {
        if self.selection.click(self.view.sample_at(x, width_px)) {
            self.park_marker();
            self.notify();
        }
    }

    // Edits

    /// Keep only the selected samples.
    pub fn crop_selected(&mut self) -> Result<bool, EditorError> {
        let Some(region) = self.selection.region() else {
            return Ok(false);
        };
        self.apply_edit("Crop", |samples| Ok(ops::crop_selected(samples, region)))
    }

    /// Remove the selected samples. No-op when that would leave nothing.
    pub fn crop_unselected(&mut self) -> Result<bool, EditorError> {
        let Some(region) = self.selection.region() else {
            return Ok(false);
        };
        let Some(buffer) = self.buffer.as_ref() else {
            return Ok(false);
        };
        if region.start() == 0 && region.end() >= buffer.len() {
            debug!("Selection covers the whole buffer; nothing to keep");
            return Ok(false);
        }
        self.apply_edit("Remove selection", |samples| {
            Ok(ops::crop_unselected(samples, region))
        })
    }

    /// Shift pitch by `semitones`; non-finite amounts are ignored.
    pub fn pitch_shift(&mut self, semitones: f64) -> Result<bool, EditorError> {
        if !semitones.is_finite() {
            return Ok(false);
        }
        self.apply_edit("Pitch shift", |samples| {
            Ok(Some(pitch::pitch_shift(samples, semitones)))
        })
    }

    pub fn apply_filter(&mut self, kind: FilterKind) -> Result<bool, EditorError> {
        if self.buffer.is_none() {
            return Err(filter::FilterError::EmptyBuffer.into());
        }
        self.apply_edit(kind.label(), |samples| {
            Ok(Some(filter::apply_filter(samples, kind)?))
        })
    }

    /// Gate samples quieter than `decibel_level` below the peak to zero.
    pub fn trim_by_threshold(&mut self, decibel_level: f64) -> Result<bool, EditorError> {
        let silent = self.buffer.as_ref().is_none_or(|buffer| buffer.peak() == 0.0);
        if silent || !decibel_level.is_finite() {
            return Ok(false);
        }
        self.apply_edit("Threshold gate", |samples| {
            Ok(ops::trim_by_threshold(samples, decibel_level))
        })
    }

    /// Restore the samples that were loaded from disk.
    pub fn reset_to_original(&mut self) -> Result<bool, EditorError> {
        let Some(original) = self.original.clone() else {
            return Ok(false);
        };
        self.apply_edit("Reset", |_| Ok(Some(original.to_vec())))
    }

    /// Shared path for every sample-replacing edit: snapshot, compute, swap, clear, notify.
    fn apply_edit<F>(&mut self, label: &str, compute: F) -> Result<bool, EditorError>
    where
        F: FnOnce(&[f64]) -> Result<Option<Vec<f64>>, EditorError>,
    {
        let Some(buffer) = self.buffer.as_ref() else {
            return Ok(false);
        };
        let before = buffer.shared_samples();
        self.playback.stop(&mut self.service);
        self.history
            .push(Snapshot::new(label, Arc::clone(&before), self.view));
        let Some(next) = compute(&before)? else {
            debug!("{label} left the buffer unchanged");
            return Ok(false);
        };
        let next_len = next.len();
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(false);
        };
        if !buffer.replace(Arc::from(next)) {
            return Ok(false);
        }
        if next_len != before.len() {
            self.view = ViewWindow::full(next_len);
        }
        self.selection.reset(next_len);
        info!("{label}: {} -> {} samples", before.len(), next_len);
        self.notify();
        Ok(true)
    }

    /// Undo the latest edit; returns its label.
    pub fn undo(&mut self) -> Option<String> {
        let buffer = self.buffer.as_ref()?;
        let label = self.history.peek_undo_label()?.to_string();
        let current = Snapshot::new(label.clone(), buffer.shared_samples(), self.view);
        let previous = self.history.undo(current)?;
        self.restore(previous);
        info!("Undo {label}");
        Some(label)
    }

    /// Reapply the latest undone edit; returns its label.
    pub fn redo(&mut self) -> Option<String> {
        let buffer = self.buffer.as_ref()?;
        let label = self.history.peek_redo_label()?.to_string();
        let current = Snapshot::new(label.clone(), buffer.shared_samples(), self.view);
        let next = self.history.redo(current)?;
        self.restore(next);
        info!("Redo {label}");
        Some(label)
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.playback.stop(&mut self.service);
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        if !buffer.replace(snapshot.samples) {
            warn!("Skipped restoring an empty snapshot");
            return;
        }
        self.selection.reset(buffer.len());
        self.view = snapshot.view;
        self.notify();
    }

    // View

    /// Zoom the view to the selection and clear it. Undo restores the prior view.
    pub fn zoom_into_selection(&mut self) -> bool {
        let Some(region) = self.selection.region() else {
            return false;
        };
        let Some(buffer) = self.buffer.as_ref() else {
            return false;
        };
        self.history
            .push(Snapshot::new("Zoom", buffer.shared_samples(), self.view));
        self.view.zoom_to(region.start(), region.end());
        self.selection.clear();
        self.park_marker();
        self.notify();
        true
    }

    /// Show the whole buffer and clear the selection. Not recorded in history.
    pub fn zoom_out(&mut self) {
        let len = self.buffer.as_ref().map_or(1, SampleBuffer::len);
        self.view = ViewWindow::full(len);
        self.selection.clear();
        self.park_marker();
        self.notify();
    }

    pub fn zoom_by(&mut self, factor: f64, anchor: f64) {
        self.view.zoom_by(factor, anchor);
        self.notify();
    }

    pub fn pan_by(&mut self, delta: f64) {
        self.view.pan_by(delta);
        self.notify();
    }

    /// Time axis ticks for the current view using the configured tick count.
    pub fn time_ticks(&self) -> Vec<AxisTick> {
        let rate = self.buffer.as_ref().map_or(1, SampleBuffer::sample_rate);
        self.view.time_ticks(rate, self.settings.view.tick_count)
    }

    pub fn amplitude_ticks(&self) -> Vec<AxisTick> {
        ViewWindow::amplitude_ticks()
    }

    // Playback

    /// Play the selection, or everything without one. Returns false with no buffer.
    pub fn play(&mut self) -> Result<bool, EditorError> {
        let Some(buffer) = self.buffer.as_ref() else {
            return Ok(false);
        };
        self.playback
            .play(&mut self.service, buffer, self.selection.region())?;
        self.notify();
        Ok(true)
    }

    pub fn play_reversed(&mut self) -> Result<bool, EditorError> {
        let Some(buffer) = self.buffer.as_ref() else {
            return Ok(false);
        };
        self.playback
            .play_reversed(&mut self.service, buffer, self.selection.region())?;
        self.notify();
        Ok(true)
    }

    pub fn pause(&mut self) {
        self.playback.pause(&mut self.service);
    }

    pub fn resume(&mut self) {
        self.playback.resume(&mut self.service);
    }

    pub fn stop(&mut self) {
        self.playback.stop(&mut self.service);
        self.notify();
    }

    /// Volume in percent, `0..=100`.
    pub fn set_volume(&mut self, percent: u8) {
        PlaybackSync::set_volume(&mut self.service, percent);
        self.settings.playback.volume = f32::from(percent.min(100)) / 100.0;
    }

    /// Poll the playback clock once and move the marker.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self
            .playback
            .tick(&mut self.service, self.selection.region());
        if matches!(
            outcome,
            TickOutcome::Advanced(_) | TickOutcome::LeftSelection(_) | TickOutcome::Finished
        ) {
            self.notify();
        }
        outcome
    }

    /// Rest the idle marker on the selection start, or zero without a selection.
    fn park_marker(&mut self) {
        let marker = self.selection.region().map_or(0, |region| region.start());
        self.playback.park_marker(marker);
    }

    fn notify(&mut self) {
        let Some(buffer) = self.buffer.as_ref() else {
            return;
        };
        let frame = PlotFrame {
            samples: buffer.samples(),
            sample_rate: buffer.sample_rate(),
            view: self.view,
            selection: self.selection.region(),
            position_marker: self.playback.position_marker(),
            is_playing: self.playback.is_playing(),
        };
        for observer in &mut self.observers {
            observer.on_plot_update(&frame);
        }
    }
}
