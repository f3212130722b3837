use std::{cell::RefCell, rc::Rc};

use epoch123::{PlotFrame, PlotObserver, SelectionRegion};

/// Copy of the interesting parts of a [`PlotFrame`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub len: usize,
    pub view: (f64, f64),
    pub selection: Option<SelectionRegion>,
    pub position_marker: usize,
    pub is_playing: bool,
}

/// Observer that appends every frame to a shared log.
pub struct RecordingObserver {
    frames: Rc<RefCell<Vec<FrameRecord>>>,
}

impl RecordingObserver {
    pub fn new() -> (Self, Rc<RefCell<Vec<FrameRecord>>>) {
        let frames = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                frames: Rc::clone(&frames),
            },
            frames,
        )
    }
}

impl PlotObserver for RecordingObserver {
    fn on_plot_update(&mut self, frame: &PlotFrame<'_>) {
        self.frames.borrow_mut().push(FrameRecord {
            len: frame.samples.len(),
            view: frame.view.visible_range(),
            selection: frame.selection,
            position_marker: frame.position_marker,
            is_playing: frame.is_playing,
        });
    }
}
