//! Tracked entities.

use composer_common::error::ComposerResult;
use composer_interaction::HitTarget;
use composer_layout_model::{
    compute_layout, DisplaySettings, EntityId, EntityOptions, Resolution,
};
use serde::Serialize;

use crate::source::MediaSource;

/// A video entity: a source plus its options and derived geometry.
pub struct Entity {
    id: EntityId,
    source: Box<dyn MediaSource>,
    options: EntityOptions,
    display: Option<DisplaySettings>,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

impl Entity {
    pub fn new(id: EntityId, source: Box<dyn MediaSource>, options: EntityOptions) -> Self {
        Self {
            id,
            source,
            options,
            display: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn source(&self) -> &dyn MediaSource {
        self.source.as_ref()
    }

    pub fn options(&self) -> &EntityOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut EntityOptions {
        &mut self.options
    }

    /// Derived geometry; `None` until the source reports its size.
    pub fn display(&self) -> Option<&DisplaySettings> {
        self.display.as_ref()
    }

    /// Whether the entity takes part in painting and hit testing.
    pub fn is_visible(&self) -> bool {
        !self.options.hidden && self.display.is_some()
    }

    /// Re-derive display settings against `container`.
    ///
    /// On [`GeometryNotReady`](composer_common::ComposerError::GeometryNotReady)
    /// the previous display settings are dropped and the error is returned.
    pub fn recompute(&mut self, container: Resolution) -> ComposerResult<&DisplaySettings> {
        let native = self.source.native_resolution().unwrap_or(Resolution::new(0.0, 0.0));
        let subject = self.id.to_string();
        match compute_layout(
            &subject,
            container,
            native,
            &self.options.position,
            self.options.mask,
        ) {
            Ok(layout) => Ok(&*self.display.insert(DisplaySettings::new(layout, native))),
            Err(err) => {
                self.display = None;
                Err(err)
            }
        }
    }

    /// Hit-test view of this entity at the given z-index.
    pub fn hit_target(&self, z_index: u32) -> Option<HitTarget> {
        if !self.is_visible() {
            return None;
        }
        self.display.map(|display| HitTarget {
            id: self.id,
            z_index,
            display,
            mask: self.options.mask,
            draggable: self.options.draggable,
            resizable: self.options.resizable,
        })
    }

    /// Release the owned source.
    pub fn release(&mut self) {
        self.source.release();
    }

    pub fn info(&self, z_index: Option<u32>) -> EntityInfo {
        EntityInfo {
            id: self.id,
            z_index,
            options: self.options.clone(),
            display: self.display,
        }
    }
}

/// An audio-only entity. Never painted, never hit-tested, no z-index.
///
/// Only the non-geometric options (name, mute) mean anything here.
pub struct AudioEntity {
    id: EntityId,
    source: Box<dyn MediaSource>,
    options: EntityOptions,
}

impl AudioEntity {
    pub fn new(id: EntityId, source: Box<dyn MediaSource>, options: EntityOptions) -> Self {
        Self {
            id,
            source,
            options,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn options_mut(&mut self) -> &mut EntityOptions {
        &mut self.options
    }

    pub fn release(&mut self) {
        self.source.release();
    }

    pub fn info(&self) -> EntityInfo {
        EntityInfo {
            id: self.id,
            z_index: None,
            options: self.options.clone(),
            display: None,
        }
    }
}

/// Read-only snapshot of an entity for queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityInfo {
    pub id: EntityId,
    /// 1-based stacking rank; `None` for audio-only entities.
    pub z_index: Option<u32>,
    pub options: EntityOptions,
    pub display: Option<DisplaySettings>,
}
