//! Render targets.

use composer_common::error::ComposerResult;
use composer_layout_model::{EntityId, Point2D, Rect, Resolution};
use serde::Serialize;

use crate::source::MediaSource;

/// Circular clip region in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleClip {
    pub center: Point2D,
    pub radius: f64,
}

/// Where and how to paint one source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourcePlacement {
    pub entity: EntityId,
    /// Destination rectangle for the full source frame.
    pub dest: Rect,
    pub clip: Option<CircleClip>,
    /// 0.0..=1.0
    pub alpha: f64,
}

/// Pen for one polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokePaint {
    pub color: String,
    pub line_width: f64,
    pub alpha: f64,
}

/// A 2D target the compositor paints into.
pub trait Surface {
    /// Pixel size of the surface.
    fn size(&self) -> Resolution;

    fn clear(&mut self) -> ComposerResult<()>;

    fn draw_source(
        &mut self,
        source: &dyn MediaSource,
        placement: &SourcePlacement,
    ) -> ComposerResult<()>;

    fn stroke_polyline(&mut self, points: &[Point2D], paint: &StrokePaint) -> ComposerResult<()>;
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Clear,
    Source(SourcePlacement),
    Polyline {
        points: Vec<Point2D>,
        paint: StrokePaint,
    },
}

/// Surface that records calls instead of rasterizing. Used by tests and by
/// the CLI replay command.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Resolution,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(size: Resolution) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Entities painted since the last clear, in paint order.
    pub fn painted_entities(&self) -> Vec<EntityId> {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Clear))
            .map_or(0, |pos| pos + 1);
        self.ops[start..]
            .iter()
            .filter_map(|op| match op {
                DrawOp::Source(placement) => Some(placement.entity),
                _ => None,
            })
            .collect()
    }

    /// Number of frames started (clears).
    pub fn frame_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Clear)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Resolution {
        self.size
    }

    fn clear(&mut self) -> ComposerResult<()> {
        self.ops.push(DrawOp::Clear);
        Ok(())
    }

    fn draw_source(
        &mut self,
        _source: &dyn MediaSource,
        placement: &SourcePlacement,
    ) -> ComposerResult<()> {
        self.ops.push(DrawOp::Source(*placement));
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point2D], paint: &StrokePaint) -> ComposerResult<()> {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            paint: paint.clone(),
        });
        Ok(())
    }
}
