use std::collections::BTreeMap;
use std::ops::AddAssign;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{AxisId, AxisSide, PathRun, Viewport};
use crate::render::{
    Color, LinePrimitive, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive,
};

pub const AXIS_COLOR: Color = Color::rgb(0.2, 0.2, 0.2);
pub const AXIS_FONT_SIZE_PX: f64 = 10.0;
pub const AXIS_TICK_SIZE_PX: f64 = 6.0;
pub const LEGEND_FONT_SIZE_PX: f64 = 11.0;
pub const LEGEND_SWATCH_SIZE_PX: f64 = 10.0;

/// Which of the two plot panes a region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pane {
    Main,
    Preview,
}

/// Independently reconciled group of nodes.
///
/// Variant order is the paint order of the flattened frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionId {
    Lines { pane: Pane, side: AxisSide },
    Axis(AxisId),
    Brush,
    Overlay,
    Indicator,
    Legend,
    LoadingText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisOrientation {
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub value: f64,
    /// Pixel position along the axis.
    pub position: f64,
    /// May be empty for unlabeled minor ticks.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendCell {
    pub x: f64,
    pub text: String,
}

/// What a retained node draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeContent {
    /// A line path already split at gaps.
    Path {
        runs: Vec<PathRun>,
        color: Color,
        stroke_width: f64,
    },
    /// An axis: domain line along `span` at `offset`, plus ticks.
    Axis {
        orientation: AxisOrientation,
        offset: f64,
        span: (f64, f64),
        ticks: Vec<AxisTick>,
    },
    Rect(RectPrimitive),
    Line(LinePrimitive),
    Text(TextPrimitive),
    LegendRow {
        swatch: Option<Color>,
        y: f64,
        cells: SmallVec<[LegendCell; 8]>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub key: String,
    pub content: NodeContent,
}

/// Outcome of one keyed reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub entered: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub exited: usize,
}

impl ReconcileStats {
    /// True when the pass left every node as it was.
    #[must_use]
    pub fn is_noop(self) -> bool {
        self.entered == 0 && self.updated == 0 && self.exited == 0
    }
}

impl AddAssign for ReconcileStats {
    fn add_assign(&mut self, rhs: Self) {
        self.entered += rhs.entered;
        self.updated += rhs.updated;
        self.unchanged += rhs.unchanged;
        self.exited += rhs.exited;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub region: RegionId,
    pub nodes: Vec<SceneNode>,
}

/// Serializable copy of every retained node, in paint order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub regions: Vec<RegionSnapshot>,
}

impl SurfaceSnapshot {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.regions.iter().map(|region| region.nodes.len()).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Retained node set of one chart.
///
/// Every region is updated through [`Surface::reconcile`], which matches
/// desired nodes to existing ones by key. Matched nodes keep their id, so a
/// backend that animates or caches per node sees updates instead of
/// remove/insert pairs.
#[derive(Debug, Default)]
pub struct Surface {
    regions: BTreeMap<RegionId, IndexMap<String, SceneNode>>,
    next_id: u64,
}

impl Surface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter/update/exit pass for `region`.
    ///
    /// Node order follows `desired`. Duplicate keys keep their first entry.
    /// An empty `desired` list removes the region.
    pub fn reconcile(
        &mut self,
        region: RegionId,
        desired: Vec<(String, NodeContent)>,
    ) -> ReconcileStats {
        let mut previous = self.regions.remove(&region).unwrap_or_default();
        let mut nodes = IndexMap::with_capacity(desired.len());
        let mut stats = ReconcileStats::default();

        for (key, content) in desired {
            if nodes.contains_key(&key) {
                debug!(?region, key = %key, "dropping duplicate scene key");
                continue;
            }
            let node = match previous.swap_remove(&key) {
                Some(mut node) => {
                    if node.content == content {
                        stats.unchanged += 1;
                    } else {
                        node.content = content;
                        stats.updated += 1;
                    }
                    node
                }
                None => {
                    stats.entered += 1;
                    SceneNode {
                        id: self.allocate_id(),
                        key: key.clone(),
                        content,
                    }
                }
            };
            nodes.insert(key, node);
        }
        stats.exited = previous.len();

        if !nodes.is_empty() {
            self.regions.insert(region, nodes);
        }
        trace!(
            ?region,
            entered = stats.entered,
            updated = stats.updated,
            unchanged = stats.unchanged,
            exited = stats.exited,
            "region reconciled"
        );
        stats
    }

    pub fn remove_region(&mut self, region: RegionId) -> ReconcileStats {
        self.reconcile(region, Vec::new())
    }

    #[must_use]
    pub fn has_region(&self, region: RegionId) -> bool {
        self.regions.contains_key(&region)
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.keys().copied()
    }

    pub fn nodes(&self, region: RegionId) -> impl Iterator<Item = &SceneNode> {
        self.regions.get(&region).into_iter().flat_map(IndexMap::values)
    }

    #[must_use]
    pub fn node(&self, region: RegionId, key: &str) -> Option<&SceneNode> {
        self.regions.get(&region)?.get(key)
    }

    #[must_use]
    pub fn region_len(&self, region: RegionId) -> usize {
        self.regions.get(&region).map_or(0, IndexMap::len)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.regions.values().map(IndexMap::len).sum()
    }

    #[must_use]
    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            regions: self
                .regions
                .iter()
                .map(|(region, nodes)| RegionSnapshot {
                    region: *region,
                    nodes: nodes.values().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Flattens retained nodes into draw primitives in paint order.
    #[must_use]
    pub fn to_frame(&self, viewport: Viewport) -> RenderFrame {
        let mut frame = RenderFrame::new(viewport);
        for node in self.regions.values().flat_map(IndexMap::values) {
            emit_node(&mut frame, &node.content);
        }
        frame
    }

    fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}

fn emit_node(frame: &mut RenderFrame, content: &NodeContent) {
    match content {
        NodeContent::Path {
            runs,
            color,
            stroke_width,
        } => {
            for run in runs {
                for ((x1, y1), (x2, y2)) in run.segments() {
                    frame.push_line(LinePrimitive::new(x1, y1, x2, y2, *stroke_width, *color));
                }
            }
        }
        NodeContent::Axis {
            orientation,
            offset,
            span,
            ticks,
        } => emit_axis(frame, *orientation, *offset, *span, ticks),
        NodeContent::Rect(rect) => frame.push_rect(*rect),
        NodeContent::Line(line) => frame.push_line(*line),
        NodeContent::Text(text) => frame.push_text(text.clone()),
        NodeContent::LegendRow { swatch, y, cells } => {
            if let Some(color) = swatch {
                let half = LEGEND_SWATCH_SIZE_PX / 2.0;
                frame.push_rect(RectPrimitive::new(
                    0.0,
                    y - half,
                    LEGEND_SWATCH_SIZE_PX,
                    LEGEND_SWATCH_SIZE_PX,
                    *color,
                ));
            }
            for cell in cells {
                frame.push_text(TextPrimitive::new(
                    cell.text.clone(),
                    cell.x,
                    *y,
                    LEGEND_FONT_SIZE_PX,
                    AXIS_COLOR,
                    TextHAlign::Left,
                ));
            }
        }
    }
}

fn emit_axis(
    frame: &mut RenderFrame,
    orientation: AxisOrientation,
    offset: f64,
    span: (f64, f64),
    ticks: &[AxisTick],
) {
    let tick = AXIS_TICK_SIZE_PX;
    match orientation {
        AxisOrientation::Bottom => {
            frame.push_line(LinePrimitive::new(span.0, offset, span.1, offset, 1.0, AXIS_COLOR));
            for t in ticks {
                frame.push_line(LinePrimitive::new(
                    t.position,
                    offset,
                    t.position,
                    offset + tick,
                    1.0,
                    AXIS_COLOR,
                ));
                frame.push_text(TextPrimitive::new(
                    t.label.clone(),
                    t.position,
                    offset + tick + AXIS_FONT_SIZE_PX,
                    AXIS_FONT_SIZE_PX,
                    AXIS_COLOR,
                    TextHAlign::Center,
                ));
            }
        }
        AxisOrientation::Left | AxisOrientation::Right => {
            let (direction, align) = if orientation == AxisOrientation::Left {
                (-1.0, TextHAlign::Right)
            } else {
                (1.0, TextHAlign::Left)
            };
            frame.push_line(LinePrimitive::new(offset, span.0, offset, span.1, 1.0, AXIS_COLOR));
            for t in ticks {
                frame.push_line(LinePrimitive::new(
                    offset,
                    t.position,
                    offset + direction * tick,
                    t.position,
                    1.0,
                    AXIS_COLOR,
                ));
                frame.push_text(TextPrimitive::new(
                    t.label.clone(),
                    offset + direction * (tick + 3.0),
                    t.position,
                    AXIS_FONT_SIZE_PX,
                    AXIS_COLOR,
                    align,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeContent, RegionId, Surface};
    use crate::render::{Color, LinePrimitive};

    fn line(x: f64) -> NodeContent {
        NodeContent::Line(LinePrimitive::new(x, 0.0, x, 10.0, 1.0, Color::rgb(0.0, 0.0, 0.0)))
    }

    #[test]
    fn reconcile_keeps_ids_for_matching_keys() {
        let mut surface = Surface::new();
        let first = surface.reconcile(
            RegionId::Indicator,
            vec![("a".to_owned(), line(1.0)), ("b".to_owned(), line(2.0))],
        );
        assert_eq!(first.entered, 2);
        let id_a = surface.node(RegionId::Indicator, "a").expect("a").id;

        let second = surface.reconcile(
            RegionId::Indicator,
            vec![("a".to_owned(), line(5.0)), ("c".to_owned(), line(3.0))],
        );
        assert_eq!((second.entered, second.updated, second.exited), (1, 1, 1));
        assert_eq!(surface.node(RegionId::Indicator, "a").expect("a").id, id_a);
        assert!(surface.node(RegionId::Indicator, "b").is_none());
    }

    #[test]
    fn identical_pass_is_a_noop() {
        let mut surface = Surface::new();
        let desired = vec![("a".to_owned(), line(1.0))];
        surface.reconcile(RegionId::Overlay, desired.clone());
        let stats = surface.reconcile(RegionId::Overlay, desired);
        assert!(stats.is_noop());
        assert_eq!(stats.unchanged, 1);
        assert_eq!(surface.node_count(), 1);
    }

    #[test]
    fn empty_desired_removes_region() {
        let mut surface = Surface::new();
        surface.reconcile(RegionId::Brush, vec![("x".to_owned(), line(1.0))]);
        let stats = surface.remove_region(RegionId::Brush);
        assert_eq!(stats.exited, 1);
        assert!(!surface.has_region(RegionId::Brush));
    }

    #[test]
    fn duplicate_keys_keep_first_entry() {
        let mut surface = Surface::new();
        surface.reconcile(
            RegionId::Indicator,
            vec![("a".to_owned(), line(1.0)), ("a".to_owned(), line(2.0))],
        );
        assert_eq!(surface.region_len(RegionId::Indicator), 1);
        assert_eq!(
            surface.node(RegionId::Indicator, "a").map(|node| &node.content),
            Some(&line(1.0))
        );
    }
}
