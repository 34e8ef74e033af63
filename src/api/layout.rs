use serde::{Deserialize, Serialize};

use crate::core::Viewport;

pub const MAIN_HEIGHT_PX: f64 = 300.0;
pub const MAIN_TOP_PADDING_PX: f64 = 10.0;
pub const SIDE_PADDING_PX: f64 = 55.0;
pub const MAIN_AXIS_BAND_PX: f64 = 30.0;
pub const PREVIEW_HEIGHT_PX: f64 = 60.0;
pub const PREVIEW_TOP_PADDING_PX: f64 = 5.0;
pub const PREVIEW_AXIS_BAND_PX: f64 = 20.0;
pub const LEGEND_ROW_HEIGHT_PX: f64 = 18.0;

/// Pixel rectangle of one plot pane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PlotArea {
    #[must_use]
    pub fn width(self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn contains(self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Layout of the main pane, the optional preview pane below it and the legend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartDimensions {
    pub width: u32,
    /// Plot area of the main chart; the x axis sits on `main.bottom`.
    pub main: PlotArea,
    /// Pointer-tracking area: the main plot extended down to the pane bottom.
    pub overlay: PlotArea,
    /// Plot area of the preview pane.
    pub preview: PlotArea,
    /// Pixel span the preview brush may cover vertically.
    pub brush_band: (f64, f64),
    pub legend_top: f64,
}

impl ChartDimensions {
    #[must_use]
    pub fn for_width(width: u32, with_preview: bool) -> Self {
        let left = SIDE_PADDING_PX;
        let right = (f64::from(width) - SIDE_PADDING_PX).max(left + 1.0);
        let main = PlotArea {
            left,
            right,
            top: MAIN_TOP_PADDING_PX,
            bottom: MAIN_HEIGHT_PX - MAIN_AXIS_BAND_PX,
        };
        let overlay = PlotArea {
            bottom: MAIN_HEIGHT_PX,
            ..main
        };
        let preview_origin = MAIN_HEIGHT_PX;
        let preview = PlotArea {
            left,
            right,
            top: preview_origin + PREVIEW_TOP_PADDING_PX,
            bottom: preview_origin + PREVIEW_HEIGHT_PX - PREVIEW_AXIS_BAND_PX,
        };
        let legend_top = if with_preview {
            preview_origin + PREVIEW_HEIGHT_PX
        } else {
            MAIN_HEIGHT_PX
        };

        Self {
            width,
            main,
            overlay,
            preview,
            brush_band: (preview_origin, preview_origin + PREVIEW_HEIGHT_PX),
            legend_top,
        }
    }

    /// Vertical center of legend line `index`; line 0 is the header.
    #[must_use]
    pub fn legend_line_y(&self, index: usize) -> f64 {
        self.legend_top + LEGEND_ROW_HEIGHT_PX * (index as f64 + 0.5)
    }

    /// Surface size holding the panes plus a header and `legend_rows` rows.
    #[must_use]
    pub fn viewport(&self, legend_rows: usize) -> Viewport {
        let height = self.legend_top + LEGEND_ROW_HEIGHT_PX * (legend_rows as f64 + 1.0);
        Viewport::new(self.width.max(1), height.ceil() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::ChartDimensions;

    #[test]
    fn panes_follow_fixed_bands() {
        let dims = ChartDimensions::for_width(800, true);
        assert_eq!((dims.main.left, dims.main.right), (55.0, 745.0));
        assert_eq!((dims.main.top, dims.main.bottom), (10.0, 270.0));
        assert_eq!((dims.preview.top, dims.preview.bottom), (305.0, 340.0));
        assert_eq!(dims.legend_top, 360.0);
        assert_eq!(dims.viewport(2).height, 414);
    }

    #[test]
    fn narrow_width_keeps_positive_plot() {
        let dims = ChartDimensions::for_width(40, false);
        assert!(dims.main.width() > 0.0);
        assert_eq!(dims.legend_top, 300.0);
    }
}
