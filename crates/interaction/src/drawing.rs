//! Freehand drawing layer.
//!
//! Strokes are polylines with a style captured when the stroke starts.
//! A stroke with a non-zero auto-erase delay fades linearly over its last
//! second and is dropped by the next sweep after it expires.

use std::fmt;

use composer_common::{config::DrawingDefaults, ms_to_secs};
use composer_layout_model::Point2D;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;

/// Stable handle for one stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrokeId(pub u64);

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stroke_{}", self.0)
    }
}

/// Pen style. Snapshotted into every stroke at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawStyle {
    pub color: String,
    pub line_width: f64,
    /// Seconds before a stroke is erased (0 = never).
    pub auto_erase_delay_secs: f64,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self::from(&DrawingDefaults::default())
    }
}

impl From<&DrawingDefaults> for DrawStyle {
    fn from(defaults: &DrawingDefaults) -> Self {
        Self {
            color: defaults.color.clone(),
            line_width: defaults.line_width,
            auto_erase_delay_secs: defaults.auto_erase_delay_secs,
        }
    }
}

/// Partial style update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawStylePatch {
    pub color: Option<String>,
    pub line_width: Option<f64>,
    pub auto_erase_delay_secs: Option<f64>,
}

impl DrawStyle {
    pub fn apply(&mut self, patch: &DrawStylePatch) {
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(width) = patch.line_width {
            self.line_width = width;
        }
        if let Some(delay) = patch.auto_erase_delay_secs {
            self.auto_erase_delay_secs = delay.max(0.0);
        }
    }
}

/// One freehand polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub points: Vec<Point2D>,
    pub style: DrawStyle,
    /// Composer time when the stroke started.
    pub start_ms: u64,
}

impl Stroke {
    /// Seconds left before auto-erase; `None` if the stroke never expires.
    pub fn remaining_secs(&self, now_ms: u64) -> Option<f64> {
        let delay = self.style.auto_erase_delay_secs;
        if delay <= 0.0 {
            return None;
        }
        let elapsed = ms_to_secs(now_ms.saturating_sub(self.start_ms));
        Some(delay - elapsed)
    }

    /// Whether a sweep at `now_ms` removes this stroke.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.remaining_secs(now_ms).is_some_and(|r| r < 0.0)
    }

    /// Paint alpha in `[0, 1]`: opaque until the last second, then linear fade.
    pub fn alpha_at(&self, now_ms: u64) -> f64 {
        match self.remaining_secs(now_ms) {
            None => 1.0,
            Some(r) if r < 0.0 => 0.0,
            Some(r) => r.min(1.0),
        }
    }
}

/// Stroke storage plus the pen state.
#[derive(Debug, Clone, Default)]
pub struct DrawingLayer {
    strokes: Arena<StrokeId, Stroke>,
    /// Stroke ids oldest first; paint order.
    order: Vec<StrokeId>,
    active: Option<StrokeId>,
    style: DrawStyle,
    next_id: u64,
}

impl DrawingLayer {
    pub fn new(style: DrawStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn style(&self) -> &DrawStyle {
        &self.style
    }

    /// Merge `patch` into the pen style. Existing strokes keep their own.
    pub fn set_style(&mut self, patch: &DrawStylePatch) {
        self.style.apply(patch);
        tracing::debug!(style = ?self.style, "Draw style updated");
    }

    /// Start a new stroke at `point`. Any unfinished stroke is finalized.
    pub fn begin_stroke(&mut self, point: Point2D, now_ms: u64) -> StrokeId {
        self.end_stroke();
        let id = StrokeId(self.next_id);
        self.next_id += 1;
        self.strokes.insert(
            id,
            Stroke {
                points: vec![point],
                style: self.style.clone(),
                start_ms: now_ms,
            },
        );
        self.order.push(id);
        self.active = Some(id);
        id
    }

    /// Append to the active stroke. Returns false when no stroke is active
    /// (e.g. it was swept or cleared mid-gesture).
    pub fn extend_stroke(&mut self, point: Point2D) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        match self.strokes.get_mut(&id) {
            Some(stroke) => {
                stroke.points.push(point);
                true
            }
            None => {
                self.active = None;
                false
            }
        }
    }

    /// Finalize the active stroke, if any.
    pub fn end_stroke(&mut self) -> Option<StrokeId> {
        self.active.take()
    }

    pub fn active_stroke(&self) -> Option<StrokeId> {
        self.active
    }

    /// Remove every expired stroke. Returns how many were removed.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let removed = self.strokes.retain(|_, stroke| !stroke.is_expired(now_ms));
        if removed > 0 {
            let strokes = &self.strokes;
            self.order.retain(|id| strokes.contains(id));
            if self.active.is_some_and(|id| !strokes.contains(&id)) {
                self.active = None;
            }
            tracing::debug!(removed, remaining = self.order.len(), "Swept expired strokes");
        }
        removed
    }

    /// Remove all strokes.
    pub fn clear(&mut self) {
        let count = self.strokes.drain().count();
        self.order.clear();
        self.active = None;
        tracing::debug!(count, "Cleared drawing");
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.get(&id)
    }

    /// All strokes, oldest first.
    pub fn strokes(&self) -> impl Iterator<Item = (StrokeId, &Stroke)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.strokes.get(id).map(|s| (*id, s)))
    }

    /// Strokes to paint at `now_ms` with their alpha, oldest first.
    /// Expired-but-unswept strokes are skipped.
    pub fn visible_strokes(&self, now_ms: u64) -> impl Iterator<Item = (&Stroke, f64)> + '_ {
        self.strokes().filter_map(move |(_, stroke)| {
            let alpha = stroke.alpha_at(now_ms);
            (alpha > 0.0).then_some((stroke, alpha))
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    fn erasing(delay: f64) -> DrawingLayer {
        DrawingLayer::new(DrawStyle {
            auto_erase_delay_secs: delay,
            ..DrawStyle::default()
        })
    }

    #[test]
    fn test_default_style() {
        let style = DrawStyle::default();
        assert_eq!(style.color, "#000000");
        assert_eq!(style.line_width, 2.0);
        assert_eq!(style.auto_erase_delay_secs, 0.0);
    }

    #[test]
    fn test_stroke_lifecycle() {
        let mut layer = DrawingLayer::default();
        let id = layer.begin_stroke(p(0.0, 0.0), 0);
        assert!(layer.extend_stroke(p(5.0, 5.0)));
        assert!(layer.extend_stroke(p(10.0, 5.0)));
        assert_eq!(layer.end_stroke(), Some(id));
        assert!(!layer.extend_stroke(p(20.0, 20.0)));

        let stroke = layer.get(id).unwrap();
        assert_eq!(stroke.points, vec![p(0.0, 0.0), p(5.0, 5.0), p(10.0, 5.0)]);
    }

    #[test]
    fn test_style_is_snapshotted_per_stroke() {
        let mut layer = DrawingLayer::default();
        let first = layer.begin_stroke(p(0.0, 0.0), 0);
        layer.set_style(&DrawStylePatch {
            color: Some("#ff0000".into()),
            ..DrawStylePatch::default()
        });
        let second = layer.begin_stroke(p(1.0, 1.0), 0);

        assert_eq!(layer.get(first).unwrap().style.color, "#000000");
        assert_eq!(layer.get(second).unwrap().style.color, "#ff0000");
        // Partial patch kept the width.
        assert_eq!(layer.style().line_width, 2.0);
    }

    #[test]
    fn test_sweep_removes_only_after_delay() {
        let mut layer = erasing(2.0);
        layer.begin_stroke(p(0.0, 0.0), 0);
        layer.end_stroke();

        assert_eq!(layer.sweep(1000), 0);
        assert_eq!(layer.sweep(2000), 0);
        assert_eq!(layer.sweep(2001), 1);
        assert!(layer.is_empty());
    }

    #[test]
    fn test_zero_delay_never_erases() {
        let mut layer = DrawingLayer::default();
        layer.begin_stroke(p(0.0, 0.0), 0);
        assert_eq!(layer.sweep(u64::MAX / 2), 0);
        assert_eq!(layer.get(StrokeId(0)).unwrap().alpha_at(10_000_000), 1.0);
    }

    #[test]
    fn test_fade_over_last_second() {
        let mut layer = erasing(2.0);
        let id = layer.begin_stroke(p(0.0, 0.0), 1000);
        let stroke = layer.get(id).unwrap();

        assert_eq!(stroke.alpha_at(1000), 1.0);
        assert_eq!(stroke.alpha_at(2000), 1.0);
        assert!((stroke.alpha_at(2500) - 0.5).abs() < 1e-9);
        assert_eq!(stroke.alpha_at(3000), 0.0);
        assert_eq!(stroke.alpha_at(3001), 0.0);
    }

    #[test]
    fn test_expired_stroke_is_not_visible_before_sweep() {
        let mut layer = erasing(1.0);
        layer.begin_stroke(p(0.0, 0.0), 0);
        layer.end_stroke();
        assert_eq!(layer.visible_strokes(500).count(), 1);
        assert_eq!(layer.visible_strokes(1500).count(), 0);
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_sweep_drops_active_stroke() {
        let mut layer = erasing(1.0);
        layer.begin_stroke(p(0.0, 0.0), 0);
        layer.sweep(5000);
        assert_eq!(layer.active_stroke(), None);
        assert!(!layer.extend_stroke(p(1.0, 1.0)));
    }

    #[test]
    fn test_clear_and_paint_order() {
        let mut layer = DrawingLayer::default();
        let a = layer.begin_stroke(p(0.0, 0.0), 0);
        let b = layer.begin_stroke(p(1.0, 1.0), 10);
        let ids: Vec<_> = layer.strokes().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);

        layer.clear();
        assert!(layer.is_empty());
        assert_eq!(layer.active_stroke(), None);
    }
}
