//! Visible sample range, axis ticks, and pixel/sample mapping.

const AMPLITUDE_TICK_COUNT: usize = 15;
const AMPLITUDE_LIMIT: f64 = 1.6;

/// Axis tick: a position in axis units plus its label (blank labels are not drawn).
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

/// Visible `(x_min, x_max)` range in sample units over a buffer of `len` samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    x_min: f64,
    x_max: f64,
    len: usize,
}

impl ViewWindow {
    /// Show the whole buffer.
    pub fn full(len: usize) -> Self {
        Self {
            x_min: 0.0,
            x_max: len.max(1) as f64,
            len: len.max(1),
        }
    }

    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    pub fn visible_range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Buffer length the window is bounded by.
    pub fn buffer_len(&self) -> usize {
        self.len
    }

    pub fn is_full(&self) -> bool {
        self.x_min <= 0.0 && self.x_max >= self.len as f64
    }

    /// Set the visible range, ordering and clamping it to `[0, len]` with at least one sample visible.
    pub fn set(&mut self, a: f64, b: f64) {
        let limit = self.len as f64;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = sanitize(lo, 0.0).clamp(0.0, limit);
        let hi = sanitize(hi, limit).clamp(0.0, limit);
        if hi - lo >= 1.0 {
            self.x_min = lo;
            self.x_max = hi;
        } else if lo + 1.0 <= limit {
            self.x_min = lo;
            self.x_max = lo + 1.0;
        } else {
            self.x_min = (limit - 1.0).max(0.0);
            self.x_max = limit;
        }
    }

    /// Show exactly the sample range `[start, end)`.
    pub fn zoom_to(&mut self, start: usize, end: usize) {
        self.set(start as f64, end as f64);
    }

    /// Scale the visible width by `factor` (below 1 zooms in), keeping `anchor` at the same relative spot.
    pub fn zoom_by(&mut self, factor: f64, anchor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let width = self.width();
        let anchor = sanitize(anchor, self.x_min + width / 2.0).clamp(self.x_min, self.x_max);
        let ratio = (anchor - self.x_min) / width;
        let new_width = (width * factor).clamp(1.0, self.len as f64);
        let new_min = anchor - ratio * new_width;
        self.shift_into_bounds(new_min, new_width);
    }

    /// Move the window by `delta` samples without changing its width.
    pub fn pan_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.shift_into_bounds(self.x_min + delta, self.width());
    }

    /// Sample coordinate under pixel `x` of a plot `width_px` wide.
    pub fn sample_at(&self, x: f64, width_px: f64) -> f64 {
        if width_px <= 0.0 {
            return self.x_min;
        }
        self.x_min + (x / width_px) * self.width()
    }

    /// Pixel offset of `sample` in a plot `width_px` wide.
    pub fn x_at(&self, sample: f64, width_px: f64) -> f64 {
        (sample - self.x_min) / self.width() * width_px
    }

    /// `count` evenly spaced ticks across the visible range labelled in seconds; the first label is blank.
    pub fn time_ticks(&self, sample_rate: u32, count: usize) -> Vec<AxisTick> {
        let rate = f64::from(sample_rate.max(1));
        linspace(self.x_min, self.x_max, count)
            .enumerate()
            .map(|(idx, value)| AxisTick {
                value,
                label: if idx == 0 {
                    String::new()
                } else {
                    format!("{:.2}", value / rate)
                },
            })
            .collect()
    }

    /// Fifteen ticks over `[-1.6, 1.6]` with one decimal; the outermost labels are blank.
    pub fn amplitude_ticks() -> Vec<AxisTick> {
        linspace(-AMPLITUDE_LIMIT, AMPLITUDE_LIMIT, AMPLITUDE_TICK_COUNT)
            .enumerate()
            .map(|(idx, value)| {
                let value = if value.abs() < 1e-9 { 0.0 } else { value };
                let outer = idx == 0 || idx + 1 == AMPLITUDE_TICK_COUNT;
                AxisTick {
                    value,
                    label: if outer {
                        String::new()
                    } else {
                        format!("{value:.1}")
                    },
                }
            })
            .collect()
    }

    fn shift_into_bounds(&mut self, min: f64, width: f64) {
        let limit = self.len as f64;
        let width = width.clamp(1.0, limit);
        let min = min.clamp(0.0, limit - width);
        self.x_min = min;
        self.x_max = min + width;
    }
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |idx| start + step * idx as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_orders_and_clamps() {
        let mut view = ViewWindow::full(1_000);
        view.set(900.0, -50.0);
        assert_eq!(view.visible_range(), (0.0, 900.0));
        view.set(999.5, 2_000.0);
        assert_eq!(view.visible_range(), (999.0, 1_000.0));
        view.set(10.0, 10.2);
        assert_eq!(view.visible_range(), (10.0, 11.0));
    }

    #[test]
    fn zoom_keeps_anchor_position() {
        let mut view = ViewWindow::full(1_000);
        view.zoom_by(0.5, 500.0);
        assert_eq!(view.visible_range(), (250.0, 750.0));
        view.zoom_by(0.5, 250.0);
        assert_eq!(view.visible_range(), (250.0, 500.0));
        view.zoom_by(100.0, 300.0);
        assert!(view.is_full());
    }

    #[test]
    fn pan_stays_in_bounds() {
        let mut view = ViewWindow::full(1_000);
        view.zoom_to(100, 300);
        view.pan_by(-500.0);
        assert_eq!(view.visible_range(), (0.0, 200.0));
        view.pan_by(5_000.0);
        assert_eq!(view.visible_range(), (800.0, 1_000.0));
    }

    #[test]
    fn pixel_mapping_round_trips() {
        let mut view = ViewWindow::full(44_100);
        view.zoom_to(1_000, 2_000);
        assert_eq!(view.sample_at(0.0, 500.0), 1_000.0);
        assert_eq!(view.sample_at(250.0, 500.0), 1_500.0);
        assert_eq!(view.x_at(1_500.0, 500.0), 250.0);
        assert_eq!(view.sample_at(10.0, 0.0), 1_000.0);
    }

    #[test]
    fn time_ticks_are_labelled_in_seconds() {
        let view = ViewWindow::full(44_100);
        let ticks = view.time_ticks(44_100, 10);
        assert_eq!(ticks.len(), 10);
        assert_eq!(ticks[0].label, "");
        assert_eq!(ticks[1].value, 4_900.0);
        assert_eq!(ticks[1].label, "0.11");
        assert_eq!(ticks[9].label, "1.00");
    }

    #[test]
    fn amplitude_ticks_blank_outer_labels() {
        let ticks = ViewWindow::amplitude_ticks();
        assert_eq!(ticks.len(), 15);
        assert_eq!(ticks[0].label, "");
        assert_eq!(ticks[14].label, "");
        assert_eq!(ticks[0].value, -1.6);
        assert_eq!(ticks[7].label, "0.0");
        assert_eq!(ticks[1].label, "-1.4");
        assert_eq!(ticks[13].label, "1.4");
    }
}
