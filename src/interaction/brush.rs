use std::fmt;

use tracing::{debug, trace};

use crate::core::{ContinuousScale, TimeRange};

/// Receives the brushed time range, `None` when the selection was cleared.
pub type BrushCallback = Box<dyn FnMut(Option<TimeRange>)>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    /// Drawing a new selection from a fixed anchor.
    Select { anchor: f64 },
    /// Dragging an existing selection by its body.
    Move { grab: f64, origin: (f64, f64) },
}

/// Horizontal brush over the preview pane.
///
/// Selections are kept in preview pixel space and converted to time through
/// the preview x scale whenever a callback fires. Only pointer gestures fire
/// callbacks; `move_to` and `clear` are silent.
pub struct BrushController {
    extent: (f64, f64),
    selection: Option<(f64, f64)>,
    gesture: Option<Gesture>,
    on_change: Option<BrushCallback>,
    on_commit: Option<BrushCallback>,
}

impl fmt::Debug for BrushController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrushController")
            .field("extent", &self.extent)
            .field("selection", &self.selection)
            .field("gesture", &self.gesture)
            .field("has_on_change", &self.on_change.is_some())
            .field("has_on_commit", &self.on_commit.is_some())
            .finish()
    }
}

impl Default for BrushController {
    fn default() -> Self {
        Self {
            extent: (0.0, 1.0),
            selection: None,
            gesture: None,
            on_change: None,
            on_commit: None,
        }
    }
}

impl BrushController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired on every drag step while a gesture is active.
    pub fn set_on_change(&mut self, callback: BrushCallback) {
        self.on_change = Some(callback);
    }

    /// Fired once when a gesture is released.
    pub fn set_on_commit(&mut self, callback: BrushCallback) {
        self.on_commit = Some(callback);
    }

    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        self.extent
    }

    /// Sets the pixel span the brush may occupy and clamps the selection into it.
    pub fn set_extent(&mut self, x0: f64, x1: f64) {
        self.extent = (x0.min(x1), x0.max(x1));
        self.selection = self
            .selection
            .and_then(|(s0, s1)| non_empty(self.clamp(s0), self.clamp(s1)));
        if let Some(Gesture::Move { grab, origin }) = self.gesture {
            self.gesture = Some(match non_empty(self.clamp(origin.0), self.clamp(origin.1)) {
                Some(origin) => Gesture::Move {
                    grab: self.clamp(grab),
                    origin,
                },
                None => Gesture::Select {
                    anchor: self.clamp(grab),
                },
            });
        }
    }

    #[must_use]
    pub fn selection_px(&self) -> Option<(f64, f64)> {
        self.selection
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    #[must_use]
    pub fn selection_range(&self, scale: ContinuousScale) -> Option<TimeRange> {
        to_time_range(self.selection, scale)
    }

    pub fn pointer_down(&mut self, x: f64) {
        let x = self.clamp(x);
        self.gesture = Some(match self.selection {
            Some((s0, s1)) if x > s0 && x < s1 => Gesture::Move {
                grab: x,
                origin: (s0, s1),
            },
            _ => {
                self.selection = None;
                Gesture::Select { anchor: x }
            }
        });
        trace!(x, gesture = ?self.gesture, "brush gesture started");
    }

    pub fn pointer_move(&mut self, x: f64, scale: ContinuousScale) {
        if !self.apply_gesture(x) {
            return;
        }
        let range = to_time_range(self.selection, scale);
        if let Some(callback) = self.on_change.as_mut() {
            callback(range);
        }
    }

    pub fn pointer_up(&mut self, x: f64, scale: ContinuousScale) {
        if !self.apply_gesture(x) {
            return;
        }
        self.gesture = None;
        let range = to_time_range(self.selection, scale);
        debug!(?range, "brush committed");
        if let Some(callback) = self.on_commit.as_mut() {
            callback(range);
        }
    }

    /// Repositions the selection without notifying anyone.
    ///
    /// Ignored while the user is dragging so a re-render cannot fight the
    /// pointer.
    pub fn move_to(&mut self, selection_px: Option<(f64, f64)>) {
        if self.is_active() {
            return;
        }
        self.selection = selection_px.and_then(|(x0, x1)| {
            let (lo, hi) = (x0.min(x1), x0.max(x1));
            non_empty(self.clamp(lo), self.clamp(hi))
        });
    }

    pub fn clear(&mut self) {
        self.gesture = None;
        self.selection = None;
    }

    fn apply_gesture(&mut self, x: f64) -> bool {
        let x = self.clamp(x);
        let Some(gesture) = self.gesture else {
            return false;
        };
        self.selection = match gesture {
            Gesture::Select { anchor } => non_empty(anchor.min(x), anchor.max(x)),
            Gesture::Move { grab, origin } => {
                let width = (origin.1 - origin.0).min(self.extent.1 - self.extent.0);
                let max = (self.extent.1 - width).max(self.extent.0);
                let start = (origin.0 + x - grab).clamp(self.extent.0, max);
                Some((start, (start + width).min(self.extent.1)))
            }
        };
        true
    }

    fn clamp(&self, x: f64) -> f64 {
        if x.is_finite() {
            x.clamp(self.extent.0, self.extent.1)
        } else {
            self.extent.0
        }
    }
}

fn non_empty(x0: f64, x1: f64) -> Option<(f64, f64)> {
    (x1 > x0).then_some((x0, x1))
}

fn to_time_range(selection: Option<(f64, f64)>, scale: ContinuousScale) -> Option<TimeRange> {
    let (x0, x1) = selection?;
    TimeRange::new(scale.invert(x0)?, scale.invert(x1)?).ok()
}
