//! Frame compositor: entities in z-order, then the drawing layer.
//!
//! Composition is split in two steps. [`compose_frame`] is pure and turns
//! the current scene into a [`FrameComposition`] (a list of draw
//! instructions). [`paint`] replays that list onto a [`Surface`].

use composer_common::error::ComposerResult;
use composer_interaction::DrawingLayer;
use composer_layout_model::{DisplaySettings, EntityId, Mask, Point2D, Rect};
use serde::Serialize;

use crate::entity::Entity;
use crate::source::MediaSource;
use crate::surface::{CircleClip, SourcePlacement, StrokePaint, Surface};

/// A single frame's composition instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameComposition {
    /// Frame number since the composer started.
    pub frame_index: u64,

    /// Composer time in milliseconds.
    pub time_ms: u64,

    /// Draw calls in paint order.
    pub instructions: Vec<DrawInstruction>,
}

/// One paint step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawInstruction {
    Source(SourcePlacement),
    Stroke {
        points: Vec<Point2D>,
        paint: StrokePaint,
    },
}

impl FrameComposition {
    /// Entities painted by this frame, bottom to top.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.instructions.iter().filter_map(|i| match i {
            DrawInstruction::Source(p) => Some(p.entity),
            DrawInstruction::Stroke { .. } => None,
        })
    }
}

/// Placement of one source inside its display geometry.
///
/// Without a mask the source fills its display rectangle. With a circle the
/// frame is clipped to the circle and scaled to cover the bounding square,
/// centered along its longer axis.
pub fn source_placement(
    entity: EntityId,
    display: &DisplaySettings,
    mask: Mask,
    alpha: f64,
) -> SourcePlacement {
    let rect = display.rect();
    let clip = match (mask, display.radius, display.circle_center()) {
        (Mask::Circle, Some(radius), Some(center)) => Some(CircleClip { center, radius }),
        _ => None,
    };

    let dest = match clip {
        None => rect,
        Some(_) => {
            let native = display.native_resolution;
            if native.width > native.height {
                let width = rect.width * native.width / native.height;
                Rect::new(rect.x - (width - rect.width) / 2.0, rect.y, width, rect.height)
            } else {
                let height = rect.height * native.height / native.width;
                Rect::new(rect.x, rect.y - (height - rect.height) / 2.0, rect.width, height)
            }
        }
    };

    SourcePlacement {
        entity,
        dest,
        clip,
        alpha,
    }
}

/// Build the frame for `entities` (already in ascending z-order) and the
/// drawing layer at `time_ms`.
pub fn compose_frame<'a>(
    frame_index: u64,
    time_ms: u64,
    entities: impl IntoIterator<Item = &'a Entity>,
    drawing: &DrawingLayer,
) -> FrameComposition {
    let mut instructions: Vec<DrawInstruction> = entities
        .into_iter()
        .filter(|e| e.is_visible() && e.source().has_video())
        .filter_map(|e| {
            let options = e.options();
            e.display().map(|display| {
                DrawInstruction::Source(source_placement(
                    e.id(),
                    display,
                    options.mask,
                    options.alpha(),
                ))
            })
        })
        .collect();

    instructions.extend(drawing.visible_strokes(time_ms).map(|(stroke, alpha)| {
        DrawInstruction::Stroke {
            points: stroke.points.clone(),
            paint: StrokePaint {
                color: stroke.style.color.clone(),
                line_width: stroke.style.line_width,
                alpha,
            },
        }
    }));

    FrameComposition {
        frame_index,
        time_ms,
        instructions,
    }
}

/// Clear `surface` and replay `composition` onto it.
///
/// `source_of` resolves entity ids to their sources; instructions for ids it
/// does not know are skipped.
pub fn paint<'a>(
    composition: &FrameComposition,
    surface: &mut dyn Surface,
    source_of: impl Fn(EntityId) -> Option<&'a dyn MediaSource>,
) -> ComposerResult<()> {
    surface.clear()?;
    for instruction in &composition.instructions {
        match instruction {
            DrawInstruction::Source(placement) => match source_of(placement.entity) {
                Some(source) => surface.draw_source(source, placement)?,
                None => tracing::debug!(entity = %placement.entity, "Skipping unknown source"),
            },
            DrawInstruction::Stroke { points, paint } => {
                surface.stroke_polyline(points, paint)?;
            }
        }
    }
    Ok(())
}
