//! Helpers for tracking waveform selection regions and drag interactions.
//! Selection math stays pure and testable so session code only relays gestures.

use tracing::debug;

/// Half-open `[start, end)` region of sample indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRegion {
    start: usize,
    end: usize,
}

impl SelectionRegion {
    /// Create a region, ordering the bounds so `start <= end`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// First sample inside the region.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last sample inside the region.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of samples covered.
    pub fn span(&self) -> usize {
        self.end - self.start
    }

    /// True when `index` falls in `[start, end)`.
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

/// Observable state of the selection gesture machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPhase {
    /// No region and no drag past the threshold.
    Idle,
    /// A drag is in progress and spans more than the threshold.
    Selecting,
    /// A region is committed.
    Selected,
}

/// The selection edge being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionEdge {
    /// Adjust the starting edge.
    Start,
    /// Adjust the ending edge.
    End,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragKind {
    Create { anchor: usize },
    StartEdge,
    EndEdge,
}

impl From<SelectionEdge> for DragKind {
    fn from(edge: SelectionEdge) -> Self {
        match edge {
            SelectionEdge::Start => DragKind::StartEdge,
            SelectionEdge::End => DragKind::EndEdge,
        }
    }
}

/// Tracks the active selection region and drag gestures over a buffer of `len` samples.
///
/// A region whose span is `<= min_span` samples is treated as no selection.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    region: Option<SelectionRegion>,
    drag: Option<DragKind>,
    min_span: usize,
    len: usize,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SelectionModel {
    /// Create an empty model with the given click threshold in samples.
    pub fn new(min_span: usize) -> Self {
        Self {
            region: None,
            drag: None,
            min_span: min_span.max(1),
            len: 0,
        }
    }

    /// Threshold at or below which a span counts as no selection.
    pub fn min_span(&self) -> usize {
        self.min_span
    }

    /// Buffer length positions are clamped to.
    pub fn buffer_len(&self) -> usize {
        self.len
    }

    /// Rebind to a buffer of `len` samples, dropping any region or drag.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.region = None;
        self.drag = None;
    }

    /// Current region, if one exists.
    pub fn region(&self) -> Option<SelectionRegion> {
        self.region
    }

    /// True while a pointer drag is active.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn phase(&self) -> SelectionPhase {
        match (self.region, self.drag) {
            (None, _) => SelectionPhase::Idle,
            (Some(_), Some(_)) => SelectionPhase::Selecting,
            (Some(_), None) => SelectionPhase::Selected,
        }
    }

    /// Replace the region with `[min(a, b), max(a, b))`, clamped to the buffer.
    ///
    /// Returns the stored region, or `None` when the span fell at or below the threshold.
    pub fn set(&mut self, a: usize, b: usize) -> Option<SelectionRegion> {
        self.drag = None;
        self.region = self.accept(SelectionRegion::new(a.min(self.len), b.min(self.len)));
        self.region
    }

    /// Remove any region; returns true if something changed.
    pub fn clear(&mut self) -> bool {
        let changed = self.region.is_some();
        self.region = None;
        self.drag = None;
        changed
    }

    /// False without a region; otherwise `start <= index < end`.
    pub fn contains(&self, index: usize) -> bool {
        self.region.is_some_and(|region| region.contains(index))
    }

    /// Begin creating a new region anchored at `position` (sample coordinates).
    ///
    /// Any prior region is dropped until the drag exceeds the threshold.
    pub fn begin_drag(&mut self, position: f64) {
        let anchor = self.clamp_position(position);
        self.region = None;
        self.drag = Some(DragKind::Create { anchor });
        debug!(anchor, "selection drag started");
    }

    /// Begin dragging an existing edge; returns false if no region is present.
    pub fn begin_edge_drag(&mut self, edge: SelectionEdge) -> bool {
        if self.region.is_none() {
            return false;
        }
        self.drag = Some(edge.into());
        true
    }

    /// Update the active drag with a new pointer position.
    pub fn update_drag(&mut self, position: f64) -> Option<SelectionRegion> {
        let drag = self.drag?;
        let position = self.clamp_position(position);
        let candidate = match drag {
            DragKind::Create { anchor } => SelectionRegion::new(anchor, position),
            DragKind::StartEdge => SelectionRegion::new(position, self.region?.end()),
            DragKind::EndEdge => SelectionRegion::new(self.region?.start(), position),
        };
        match (drag, self.accept(candidate)) {
            (_, Some(region)) => self.region = Some(region),
            (DragKind::Create { .. }, None) => self.region = None,
            // Edge drags keep the last valid region rather than collapsing it.
            (_, None) => {}
        }
        self.region
    }

    /// Finish the drag at `position`, committing the region if it exceeds the threshold.
    pub fn finish_drag(&mut self, position: f64) -> Option<SelectionRegion> {
        if self.drag.is_none() {
            return self.region;
        }
        self.update_drag(position);
        self.drag = None;
        debug!(region = ?self.region, "selection drag finished");
        self.region
    }

    /// A press and release without meaningful movement: always returns to `Idle`.
    ///
    /// Returns true if a region was cleared.
    pub fn click(&mut self, position: f64) -> bool {
        let index = self.clamp_position(position);
        debug!(index, "selection click");
        self.clear()
    }

    fn accept(&self, region: SelectionRegion) -> Option<SelectionRegion> {
        (region.span() > self.min_span).then_some(region)
    }

    fn clamp_position(&self, position: f64) -> usize {
        if !position.is_finite() || position <= 0.0 {
            return 0;
        }
        (position.trunc() as usize).min(self.len)
    }
}
