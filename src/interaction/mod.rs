//! Pointer-driven chart interaction: the preview brush and main-chart hover.

pub mod brush;
pub mod hover;

pub use brush::{BrushCallback, BrushController};
pub use hover::{HOVER_TOLERANCE_PX, HoverState, HoverValue, bisect_left, hovered_row, nearest_row};
