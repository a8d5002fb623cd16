//! Drag and resize math.
//!
//! All geometry is computed from the [`DragContext`] captured at press time,
//! never from the previous move's result, so long gestures do not
//! accumulate rounding drift. Resizes are aspect-locked and are not clamped:
//! dragging an edge past its opposite edge yields negative sizes.

use composer_layout_model::{FixedGeometry, Point2D};

use crate::hit_test::{HitTarget, Location, Locations};

/// State captured when the pointer goes down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragContext {
    /// The entity under the pointer at press time, with its geometry snapshot.
    pub target: Option<HitTarget>,
    /// Location tags at press time.
    pub locations: Locations,
    /// Pointer coordinate at press time.
    pub start: Point2D,
}

impl DragContext {
    /// Offset from the entity's top-left corner to the press point.
    pub fn grab_offset(&self) -> Option<Point2D> {
        self.target.map(|t| {
            Point2D::new(
                self.start.x - t.display.position.x,
                self.start.y - t.display.position.y,
            )
        })
    }
}

/// What a drag does to its entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureKind {
    /// Pure translation, size unchanged.
    Move,
    /// Resize from the given handle.
    Resize(Location),
}

/// New pinned geometry produced by one pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub geometry: FixedGeometry,
}

/// Geometry for the entity being dragged, with the pointer now at `pointer`.
///
/// Returns `None` when the press did not land on an entity, the entity
/// allows neither operation, or the snapshot is degenerate.
pub fn drag_geometry(ctx: &DragContext, pointer: Point2D) -> Option<Gesture> {
    let target = ctx.target?;

    if target.resizable && ctx.locations.has_handle() {
        return resize(ctx, &target, pointer);
    }
    if target.draggable && ctx.locations.contains(Location::Inside) {
        let offset = ctx.grab_offset()?;
        let size = target.display.display_resolution;
        return Some(Gesture {
            kind: GestureKind::Move,
            geometry: FixedGeometry::pinned(
                pointer.x - offset.x,
                pointer.y - offset.y,
                size.width,
                size.height,
            ),
        });
    }
    None
}

fn resize(ctx: &DragContext, target: &HitTarget, pointer: Point2D) -> Option<Gesture> {
    let snapshot = &target.display;
    let (sx, sy) = (snapshot.position.x, snapshot.position.y);
    let (sw, sh) = (
        snapshot.display_resolution.width,
        snapshot.display_resolution.height,
    );
    let dx = pointer.x - ctx.start.x;
    let dy = pointer.y - ctx.start.y;

    let handle = [
        Location::Circle,
        Location::Bottom,
        Location::Top,
        Location::Left,
        Location::Right,
    ]
    .into_iter()
    .find(|l| ctx.locations.contains(*l))?;

    let (x, y, w, h) = match handle {
        Location::Circle => {
            let radius = snapshot.radius.filter(|r| *r != 0.0)?;
            let center = snapshot.circle_center()?;
            let new_radius = center.distance_to(&pointer);
            let scale = new_radius / radius;
            (
                sx + radius - new_radius,
                sy + radius - new_radius,
                sw * scale,
                sh * scale,
            )
        }
        Location::Bottom | Location::Top => {
            if sh == 0.0 {
                return None;
            }
            let h = if handle == Location::Bottom {
                sh + dy
            } else {
                sh - dy
            };
            let w = sw * h / sh;
            let y = if handle == Location::Top { sy + dy } else { sy };
            (sx - (w - sw) / 2.0, y, w, h)
        }
        Location::Left | Location::Right => {
            if sw == 0.0 {
                return None;
            }
            let w = if handle == Location::Right {
                sw + dx
            } else {
                sw - dx
            };
            let h = sh * w / sw;
            let x = if handle == Location::Left { sx + dx } else { sx };
            (x, sy - (h - sh) / 2.0, w, h)
        }
        Location::Inside => return None,
    };

    Some(Gesture {
        kind: GestureKind::Resize(handle),
        geometry: FixedGeometry::pinned(x, y, w, h),
    })
}
