//! The geometry engine: position mode + mask -> pixel geometry.
//!
//! Every function here is pure. Callers recompute whenever options, the
//! container, or the source's native resolution change; nothing is cached,
//! so percentage dimensions always track the current container.

use composer_common::error::{ComposerError, ComposerResult};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point2D, Position, Rect, Resolution};
use crate::position::{FixedGeometry, Mask, PositionMode};

/// Output of one layout computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub display_resolution: Resolution,
    pub position: Position,
    /// Present iff the mask is a circle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

/// Derived geometry of an entity: its layout plus the native resolution it
/// was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub display_resolution: Resolution,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    pub native_resolution: Resolution,
}

impl DisplaySettings {
    pub fn new(layout: Layout, native_resolution: Resolution) -> Self {
        Self {
            display_resolution: layout.display_resolution,
            position: layout.position,
            radius: layout.radius,
            native_resolution,
        }
    }

    /// Bounding rectangle in container pixels.
    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.display_resolution)
    }

    /// Center of the circular mask (top-left corner offset by the radius).
    pub fn circle_center(&self) -> Option<Point2D> {
        self.radius
            .map(|r| Point2D::new(self.position.x + r, self.position.y + r))
    }
}

/// Compute the display geometry of a source inside a container.
///
/// Fails with [`ComposerError::GeometryNotReady`] when the native resolution
/// is not yet known (either axis non-positive); callers should defer until
/// the source reports dimensions. `subject` names the source in the error.
pub fn compute_layout(
    subject: &str,
    container: Resolution,
    native: Resolution,
    mode: &PositionMode,
    mask: Mask,
) -> ComposerResult<Layout> {
    if !native.is_available() {
        return Err(ComposerError::geometry_not_ready(subject));
    }

    let layout = match mode {
        PositionMode::Contain => layout_contain(container, native, mask),
        PositionMode::Cover => layout_cover(container, native, mask),
        PositionMode::Fixed(fixed) => layout_fixed(container, native, fixed, mask),
    };
    Ok(layout)
}

/// Whether the source is relatively wider than the container.
fn wider_than_container(container: Resolution, native: Resolution) -> bool {
    native.width / container.width > native.height / container.height
}

fn layout_contain(container: Resolution, native: Resolution, mask: Mask) -> Layout {
    let (width, height) = if wider_than_container(container, native) {
        let width = container.width;
        let height = if mask.is_circle() {
            width
        } else {
            native.height * container.width / native.width
        };
        (width, height)
    } else {
        let height = container.height;
        let width = if mask.is_circle() {
            height
        } else {
            height * native.width / native.height
        };
        (width, height)
    };

    // Center the slack axis.
    let x = if width < container.width {
        (container.width - width) / 2.0
    } else {
        0.0
    };
    let y = if height < container.height {
        (container.height - height) / 2.0
    } else {
        0.0
    };

    finish(width, height, Position::new(x, y), mask)
}

fn layout_cover(container: Resolution, native: Resolution, mask: Mask) -> Layout {
    let (width, height) = if wider_than_container(container, native) {
        let height = container.height;
        let width = if mask.is_circle() {
            height
        } else {
            native.width * container.height / native.height
        };
        (width, height)
    } else {
        let width = container.width;
        let height = if mask.is_circle() {
            width
        } else {
            native.height * container.width / native.width
        };
        (width, height)
    };

    // Center the overflowing axis (negative offset).
    let x = if width > container.width {
        (container.width - width) / 2.0
    } else {
        0.0
    };
    let y = if height > container.height {
        (container.height - height) / 2.0
    } else {
        0.0
    };

    finish(width, height, Position::new(x, y), mask)
}

fn layout_fixed(
    container: Resolution,
    native: Resolution,
    fixed: &FixedGeometry,
    mask: Mask,
) -> Layout {
    let mut width = fixed.width.map(|w| w.resolve(container.width));
    let mut height = fixed.height.map(|h| h.resolve(container.height));

    if width.is_none() && height.is_none() {
        width = Some(container.width);
        height = Some(container.height);
    }

    // A circle needs a square box: one given side drives the other.
    if mask.is_circle() {
        match (width, height) {
            (None, Some(h)) => width = Some(h),
            (Some(w), None) => height = Some(w),
            _ => {}
        }
    }

    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (None, Some(h)) => (native.width * h / native.height, h),
        (Some(w), None) => (w, native.height * w / native.width),
        (None, None) => (container.width, container.height),
    };

    let position = Position::new(fixed.x.unwrap_or(0.0), fixed.y.unwrap_or(0.0));
    finish(width, height, position, mask)
}

fn finish(width: f64, height: f64, position: Position, mask: Mask) -> Layout {
    let display_resolution = Resolution::new(width, height);
    Layout {
        display_resolution,
        position,
        radius: mask
            .is_circle()
            .then(|| display_resolution.min_side() / 2.0),
    }
}
