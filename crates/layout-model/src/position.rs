//! Position modes: how an entity's geometry is derived from its container.

use std::fmt;
use std::str::FromStr;

use composer_common::error::ComposerError;
use serde::{Deserialize, Serialize};

/// A fixed-mode size along one axis.
///
/// Serialized as a bare number (pixels) or a string. Strings ending in `%`
/// are percentages of the container axis; other strings are pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DimensionRepr", into = "DimensionRepr")]
pub enum Dimension {
    Pixels(f64),
    Percent(f64),
}

impl Dimension {
    /// Resolve against the container length of the same axis.
    ///
    /// Percentages are re-resolved on every call, never cached.
    pub fn resolve(self, container_len: f64) -> f64 {
        match self {
            Dimension::Pixels(px) => px,
            Dimension::Percent(pct) => pct * container_len / 100.0,
        }
    }
}

impl From<f64> for Dimension {
    fn from(px: f64) -> Self {
        Dimension::Pixels(px)
    }
}

impl FromStr for Dimension {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parse = |num: &str| {
            num.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ComposerError::invalid_dimension(s))
        };
        match trimmed.strip_suffix('%') {
            Some(pct) => parse(pct).map(Dimension::Percent),
            None => parse(trimmed.strip_suffix("px").unwrap_or(trimmed)).map(Dimension::Pixels),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{px}"),
            Dimension::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<DimensionRepr> for Dimension {
    type Error = ComposerError;

    fn try_from(repr: DimensionRepr) -> Result<Self, Self::Error> {
        match repr {
            DimensionRepr::Number(px) => Ok(Dimension::Pixels(px)),
            DimensionRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Dimension> for DimensionRepr {
    fn from(dim: Dimension) -> Self {
        match dim {
            Dimension::Pixels(px) => DimensionRepr::Number(px),
            Dimension::Percent(_) => DimensionRepr::Text(dim.to_string()),
        }
    }
}

/// Explicit geometry for the `fixed` position mode. Every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedGeometry {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
}

impl FixedGeometry {
    /// Fully pinned pixel geometry, as produced by interactive drag/resize.
    pub fn pinned(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(Dimension::Pixels(width)),
            height: Some(Dimension::Pixels(height)),
        }
    }

    /// Overlay the fields present in `other`.
    pub fn merge(&mut self, other: &FixedGeometry) {
        if other.x.is_some() {
            self.x = other.x;
        }
        if other.y.is_some() {
            self.y = other.y;
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.height.is_some() {
            self.height = other.height;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FixedGeometry::default()
    }
}

/// How an entity is placed inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PositionMode {
    /// Fit entirely inside the container, preserving aspect ratio.
    Contain,
    /// Cover the whole container, cropping the overflowing axis.
    #[default]
    Cover,
    /// Explicit geometry; omitted fields are derived.
    Fixed(FixedGeometry),
}

impl PositionMode {
    pub fn kind(&self) -> PositionModeKind {
        match self {
            PositionMode::Contain => PositionModeKind::Contain,
            PositionMode::Cover => PositionModeKind::Cover,
            PositionMode::Fixed(_) => PositionModeKind::Fixed,
        }
    }

    /// Build a mode from its kind; fixed fields are dropped for contain/cover.
    pub fn from_kind(kind: PositionModeKind, fixed: FixedGeometry) -> Self {
        match kind {
            PositionModeKind::Contain => PositionMode::Contain,
            PositionModeKind::Cover => PositionMode::Cover,
            PositionModeKind::Fixed => PositionMode::Fixed(fixed),
        }
    }
}

/// The name of a position mode, as accepted from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PositionModeKind {
    Contain,
    Cover,
    Fixed,
}

impl PositionModeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionModeKind::Contain => "contain",
            PositionModeKind::Cover => "cover",
            PositionModeKind::Fixed => "fixed",
        }
    }
}

impl FromStr for PositionModeKind {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contain" => Ok(PositionModeKind::Contain),
            "cover" => Ok(PositionModeKind::Cover),
            "fixed" => Ok(PositionModeKind::Fixed),
            other => Err(ComposerError::invalid_position_mode(other)),
        }
    }
}

impl TryFrom<String> for PositionModeKind {
    type Error = ComposerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PositionModeKind> for String {
    fn from(kind: PositionModeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PositionModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clip shape applied when painting an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mask {
    #[default]
    None,
    Circle,
}

impl Mask {
    pub fn is_circle(&self) -> bool {
        matches!(self, Mask::Circle)
    }
}

impl FromStr for Mask {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Mask::None),
            "circle" => Ok(Mask::Circle),
            other => Err(ComposerError::invalid_mask(other)),
        }
    }
}
