mod frame;
mod null_renderer;
mod primitives;
mod scene;

pub use frame::{FramePrimitive, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{
    CATEGORY10, Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive,
};
pub use scene::{
    AXIS_COLOR, AxisOrientation, AxisTick, LegendCell, NodeContent, NodeId, Pane,
    ReconcileStats, RegionId, RegionSnapshot, SceneNode, Surface, SurfaceSnapshot,
};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame` flattened from the
/// retained scene, so drawing code stays isolated from chart state.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
