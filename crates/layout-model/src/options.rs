//! Entity identity, user options and partial option updates.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use composer_common::error::{ComposerError, ComposerResult};
use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;
use crate::position::{Dimension, FixedGeometry, Mask, PositionMode, PositionModeKind};

/// What kind of source an entity wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A source with pixels (camera, screen share, still image).
    Video,
    /// An audio-only source: mixed, never painted or hit-tested.
    AudioOnly,
}

/// Opaque entity handle, stable for the entity's lifetime.
///
/// Displays as `video_<n>` / `audio_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    kind: EntityKind,
    seq: u64,
}

impl EntityId {
    pub fn new(kind: EntityKind, seq: u64) -> Self {
        Self { kind, seq }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            EntityKind::Video => "video",
            EntityKind::AudioOnly => "audio",
        };
        write!(f, "{}_{}", prefix, self.seq)
    }
}

impl FromStr for EntityId {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, seq) = s
            .split_once('_')
            .ok_or_else(|| ComposerError::unknown_entity(s))?;
        let kind = match prefix {
            "video" => EntityKind::Video,
            "audio" => EntityKind::AudioOnly,
            _ => return Err(ComposerError::unknown_entity(s)),
        };
        let seq = seq.parse().map_err(|_| ComposerError::unknown_entity(s))?;
        Ok(Self { kind, seq })
    }
}

impl TryFrom<String> for EntityId {
    type Error = ComposerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

/// Callback invoked when an entity is clicked, with the press point.
#[derive(Clone)]
pub struct ClickHandler(Arc<dyn Fn(EntityId, Point2D) + Send + Sync>);

impl ClickHandler {
    pub fn new(f: impl Fn(EntityId, Point2D) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, id: EntityId, point: Point2D) {
        (self.0)(id, point)
    }
}

impl fmt::Debug for ClickHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClickHandler(..)")
    }
}

impl PartialEq for ClickHandler {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Current options of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityOptions {
    /// Display name.
    pub name: Option<String>,

    /// Placement strategy.
    pub position: PositionMode,

    /// Clip shape.
    pub mask: Mask,

    /// Whether the entity can be moved with the pointer.
    pub draggable: bool,

    /// Whether the entity can be resized with the pointer.
    pub resizable: bool,

    /// Whether the source's audio is excluded from the mix.
    pub mute: bool,

    /// Hidden entities are neither painted nor hit-tested.
    pub hidden: bool,

    /// Opacity percentage, 0..=100.
    pub opacity: u8,

    #[serde(skip)]
    pub on_click: Option<ClickHandler>,
}

impl Default for EntityOptions {
    fn default() -> Self {
        Self {
            name: None,
            position: PositionMode::Cover,
            mask: Mask::None,
            draggable: false,
            resizable: false,
            mute: false,
            hidden: false,
            opacity: 100,
            on_click: None,
        }
    }
}

impl EntityOptions {
    /// Merge a partial update into these options.
    ///
    /// A position kind in the patch rebuilds the position mode (fixed fields
    /// are dropped for contain/cover). Without one, fixed fields in the patch
    /// are merged into the current geometry only if the entity is already
    /// `fixed`. The patch's `index` is not handled here; z-order belongs to
    /// the registry.
    pub fn apply(&mut self, patch: &OptionsPatch) {
        let fixed = patch.fixed_geometry();
        if let Some(kind) = patch.position {
            self.position = PositionMode::from_kind(kind, fixed);
        } else if let PositionMode::Fixed(current) = &mut self.position {
            current.merge(&fixed);
        }

        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(mask) = patch.mask {
            self.mask = mask;
        }
        if let Some(draggable) = patch.draggable {
            self.draggable = draggable;
        }
        if let Some(resizable) = patch.resizable {
            self.resizable = resizable;
        }
        if let Some(mute) = patch.mute {
            self.mute = mute;
        }
        if let Some(hidden) = patch.hidden {
            self.hidden = hidden;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.min(100);
        }
        if let Some(on_click) = &patch.on_click {
            self.on_click = Some(on_click.clone());
        }
    }

    /// Opacity as a 0.0..=1.0 alpha.
    pub fn alpha(&self) -> f64 {
        f64::from(self.opacity.min(100)) / 100.0
    }
}

/// A partial options update. Absent fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsPatch {
    pub name: Option<String>,
    pub position: Option<PositionModeKind>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub mask: Option<Mask>,
    pub draggable: Option<bool>,
    pub resizable: Option<bool>,
    pub mute: Option<bool>,
    pub hidden: Option<bool>,
    pub opacity: Option<u8>,
    /// Explicit z-index request (1-based).
    pub index: Option<u32>,
    #[serde(skip)]
    pub on_click: Option<ClickHandler>,
}

impl OptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that pins the entity at absolute pixel geometry.
    pub fn pinned(geometry: FixedGeometry) -> Self {
        Self {
            position: Some(PositionModeKind::Fixed),
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            ..Self::default()
        }
    }

    /// The fixed-mode fields carried by this patch.
    pub fn fixed_geometry(&self) -> FixedGeometry {
        FixedGeometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Whether the patch touches placement or stacking (position, geometry,
    /// mask or index). These mean nothing for audio-only entities.
    pub fn has_layout_fields(&self) -> bool {
        self.position.is_some()
            || !self.fixed_geometry().is_empty()
            || self.mask.is_some()
            || self.index.is_some()
    }

    /// Set the position mode from its user-facing name.
    pub fn position_str(mut self, mode: &str) -> ComposerResult<Self> {
        self.position = Some(mode.parse()?);
        Ok(self)
    }

    pub fn position(mut self, kind: PositionModeKind) -> Self {
        self.position = Some(kind);
        self
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = Some(draggable);
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = Some(resizable);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn opacity(mut self, opacity: u8) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn on_click(mut self, f: impl Fn(EntityId, Point2D) + Send + Sync + 'static) -> Self {
        self.on_click = Some(ClickHandler::new(f));
        self
    }
}
