use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaintOp {
    Line(usize),
    Rect(usize),
    Text(usize),
}

/// One primitive borrowed from a frame, yielded in paint order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramePrimitive<'a> {
    Line(&'a LinePrimitive),
    Rect(&'a RectPrimitive),
    Text(&'a TextPrimitive),
}

/// Backend-agnostic draw list for one presentation of the surface.
///
/// Primitives are grouped by kind for counting and validation, while
/// `primitives()` replays them in the order they were pushed. Backends must
/// paint through `primitives()` so later regions cover earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
    order: Vec<PaintOp>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn push_line(&mut self, line: LinePrimitive) {
        self.order.push(PaintOp::Line(self.lines.len()));
        self.lines.push(line);
    }

    pub fn push_rect(&mut self, rect: RectPrimitive) {
        self.order.push(PaintOp::Rect(self.rects.len()));
        self.rects.push(rect);
    }

    /// Empty labels are dropped; an axis may leave minor ticks unlabeled.
    pub fn push_text(&mut self, text: TextPrimitive) {
        if !text.text.is_empty() {
            self.order.push(PaintOp::Text(self.texts.len()));
            self.texts.push(text);
        }
    }

    /// Every pushed primitive, back to front.
    pub fn primitives(&self) -> impl Iterator<Item = FramePrimitive<'_>> + '_ {
        self.order.iter().filter_map(|op| match *op {
            PaintOp::Line(index) => self.lines.get(index).map(FramePrimitive::Line),
            PaintOp::Rect(index) => self.rects.get(index).map(FramePrimitive::Rect),
            PaintOp::Text(index) => self.texts.get(index).map(FramePrimitive::Text),
        })
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FramePrimitive, RenderFrame};
    use crate::core::Viewport;
    use crate::render::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

    #[test]
    fn primitives_replay_in_push_order() {
        let mut frame = RenderFrame::new(Viewport::new(100, 100));
        let color = Color::rgb(0.2, 0.2, 0.2);
        frame.push_line(LinePrimitive::new(0.0, 0.0, 10.0, 10.0, 1.0, color));
        frame.push_rect(RectPrimitive::new(0.0, 0.0, 5.0, 5.0, color));
        frame.push_text(TextPrimitive::new("", 1.0, 1.0, 10.0, color, TextHAlign::Left));
        frame.push_line(LinePrimitive::new(1.0, 1.0, 2.0, 2.0, 1.0, color));

        let kinds: Vec<&str> = frame
            .primitives()
            .map(|primitive| match primitive {
                FramePrimitive::Line(_) => "line",
                FramePrimitive::Rect(_) => "rect",
                FramePrimitive::Text(_) => "text",
            })
            .collect();
        assert_eq!(kinds, ["line", "rect", "line"]);
    }
}
