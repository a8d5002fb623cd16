//! The composer: entity registry, pointer routing and the draw tick.

use composer_common::config::ComposerConfig;
use composer_common::error::{ComposerError, ComposerResult};
use composer_common::{ComposerClock, RateController, TimeSource};
use composer_interaction::pointer::ObserverList;
use composer_interaction::{
    Arena, ClickEvent, CursorHint, DragEndEvent, DragEvent, DrawStyle, DrawStylePatch,
    DrawingLayer, HitTarget, InteractionEvent, MoveEvent, PointerStateMachine, ZOrderRegistry,
};
use composer_layout_model::{
    EntityId, EntityKind, EntityOptions, InteractionMode, OptionsPatch, Point2D, PointerEvent,
    Resolution,
};

use crate::compositor::{compose_frame, paint, FrameComposition};
use crate::entity::{AudioEntity, Entity, EntityInfo};
use crate::source::MediaSource;
use crate::surface::Surface;

/// Owns every entity, the z-order, the pointer state machine and the
/// drawing layer. Single-threaded: hosts either call it directly from their
/// UI thread or hand it to [`crate::driver::run_composer_loop`].
pub struct Composer {
    config: ComposerConfig,
    container: Resolution,
    entities: Arena<EntityId, Entity>,
    audio: Arena<EntityId, AudioEntity>,
    z_order: ZOrderRegistry<EntityId>,
    reorder_observers: ObserverList<Vec<EntityId>>,
    pointer: PointerStateMachine,
    drawing: DrawingLayer,
    frame_rate: RateController,
    sweep_rate: RateController,
    clock: Box<dyn TimeSource + Send>,
    next_video_seq: u64,
    next_audio_seq: u64,
    frame_index: u64,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("container", &self.container)
            .field("entities", &self.entities.len())
            .field("audio", &self.audio.len())
            .field("z_order", &self.z_order)
            .field("pointer", &self.pointer)
            .field("strokes", &self.drawing.len())
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl Composer {
    /// Create a composer timed by a real clock started now.
    pub fn new(config: ComposerConfig) -> Self {
        Self::with_clock(config, ComposerClock::start())
    }

    /// Create a composer with an explicit time source.
    pub fn with_clock(config: ComposerConfig, clock: impl TimeSource + Send + 'static) -> Self {
        let container = Resolution::new(
            f64::from(config.resolution.width),
            f64::from(config.resolution.height),
        );
        Self {
            container,
            entities: Arena::new(),
            audio: Arena::new(),
            z_order: ZOrderRegistry::new(),
            reorder_observers: ObserverList::default(),
            pointer: PointerStateMachine::new(config.hit_band_px),
            drawing: DrawingLayer::new(DrawStyle::from(&config.drawing)),
            frame_rate: RateController::new(config.fps),
            sweep_rate: RateController::with_interval_ms(config.sweep_interval_ms),
            clock: Box::new(clock),
            next_video_seq: 0,
            next_audio_seq: 0,
            frame_index: 0,
            config,
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Output frame size all geometry is computed against.
    pub fn container(&self) -> Resolution {
        self.container
    }

    /// Composer time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // ── Entities ────────────────────────────────────────────────────

    /// Track a new source on top of the stack.
    ///
    /// A source without a video track is registered as audio-only instead
    /// (see [`Composer::add_audio_source`]).
    pub fn add_entity(
        &mut self,
        source: impl MediaSource + 'static,
        options: EntityOptions,
    ) -> EntityId {
        if !source.has_video() {
            return self.add_audio(Box::new(source), options);
        }

        let id = EntityId::new(EntityKind::Video, self.next_video_seq);
        self.next_video_seq += 1;

        let mut entity = Entity::new(id, Box::new(source), options);
        refresh(&mut entity, self.container);
        self.entities.insert(id, entity);
        let z_index = self.z_order.append(id);

        tracing::info!(entity = %id, z_index, "Entity added");
        self.notify_reorder();
        id
    }

    /// Track an audio-only source. It gets no z-index and no geometry.
    pub fn add_audio_source(&mut self, source: impl MediaSource + 'static) -> EntityId {
        self.add_audio(Box::new(source), EntityOptions::default())
    }

    fn add_audio(&mut self, source: Box<dyn MediaSource>, options: EntityOptions) -> EntityId {
        let id = EntityId::new(EntityKind::AudioOnly, self.next_audio_seq);
        self.next_audio_seq += 1;
        self.audio.insert(id, AudioEntity::new(id, source, options));
        tracing::info!(entity = %id, "Audio source added");
        id
    }

    /// Merge `patch` into an entity's options and re-derive its geometry.
    ///
    /// An explicit `index` in the patch re-ranks the entity; without one the
    /// z-order is untouched.
    pub fn update_entity(&mut self, id: EntityId, patch: OptionsPatch) -> ComposerResult<()> {
        if let Some(audio) = self.audio.get_mut(&id) {
            if patch.has_layout_fields() {
                tracing::debug!(
                    entity = %id,
                    "Ignoring placement and index fields for audio-only entity"
                );
            }
            audio.options_mut().apply(&patch);
            return Ok(());
        }

        let container = self.container;
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| ComposerError::unknown_entity(id))?;
        entity.options_mut().apply(&patch);
        refresh(entity, container);

        if let Some(index) = patch.index {
            let assigned = self.z_order.set_index(id, index);
            tracing::debug!(entity = %id, requested = index, assigned = ?assigned, "Entity re-ranked");
            self.notify_reorder();
        }
        tracing::trace!(entity = %id, "Entity updated");
        Ok(())
    }

    /// Stop tracking an entity and release its source.
    pub fn remove_entity(&mut self, id: EntityId) -> ComposerResult<()> {
        if let Some(mut entity) = self.entities.remove(&id) {
            self.z_order.remove(id);
            entity.release();
            tracing::info!(entity = %id, remaining = self.entities.len(), "Entity removed");
            self.notify_reorder();
            return Ok(());
        }
        if let Some(mut audio) = self.audio.remove(&id) {
            audio.release();
            tracing::info!(entity = %id, "Audio source removed");
            return Ok(());
        }
        Err(ComposerError::unknown_entity(id))
    }

    /// Swap with the entity one rank above. Returns whether anything moved.
    pub fn move_up(&mut self, id: EntityId) -> ComposerResult<bool> {
        let moved = self
            .z_order
            .move_up(id)
            .ok_or_else(|| ComposerError::unknown_entity(id))?;
        if moved {
            self.notify_reorder();
        }
        Ok(moved)
    }

    /// Swap with the entity one rank below. Returns whether anything moved.
    pub fn move_down(&mut self, id: EntityId) -> ComposerResult<bool> {
        let moved = self
            .z_order
            .move_down(id)
            .ok_or_else(|| ComposerError::unknown_entity(id))?;
        if moved {
            self.notify_reorder();
        }
        Ok(moved)
    }

    /// The source behind `id` reported new native dimensions.
    pub fn source_resized(&mut self, id: EntityId) -> ComposerResult<()> {
        if self.audio.contains(&id) {
            return Ok(());
        }
        let container = self.container;
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| ComposerError::unknown_entity(id))?;
        refresh(entity, container);
        Ok(())
    }

    /// Change the output size and re-derive every entity's geometry.
    pub fn resize_container(&mut self, container: Resolution) {
        self.container = container;
        for id in self.z_order.ordered().to_vec() {
            if let Some(entity) = self.entities.get_mut(&id) {
                refresh(entity, container);
            }
        }
        tracing::info!(
            width = container.width,
            height = container.height,
            "Container resized"
        );
    }

    /// Release every source and forget all entities and strokes.
    ///
    /// Any active gesture is abandoned. The composer stays usable; dropping
    /// it does the same teardown.
    pub fn destroy(&mut self) {
        self.pointer.pointer_leave();

        let video: Vec<(EntityId, Entity)> = self.entities.drain().collect();
        for (id, mut entity) in video {
            self.z_order.remove(id);
            entity.release();
        }
        let audio: Vec<(EntityId, AudioEntity)> = self.audio.drain().collect();
        for (_, mut entity) in audio {
            entity.release();
        }
        self.drawing.clear();
        tracing::info!("Composer destroyed");
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Video entities bottom to top, then audio-only entities by id.
    pub fn list_entities(&self) -> Vec<EntityInfo> {
        let mut list: Vec<EntityInfo> = self
            .z_order
            .ranked()
            .filter_map(|(rank, id)| self.entities.get(&id).map(|e| e.info(Some(rank))))
            .collect();
        let mut audio: Vec<EntityInfo> = self.audio.values().map(AudioEntity::info).collect();
        audio.sort_by_key(|info| info.id);
        list.extend(audio);
        list
    }

    pub fn get_entity(&self, id: EntityId) -> ComposerResult<EntityInfo> {
        if let Some(entity) = self.entities.get(&id) {
            return Ok(entity.info(self.z_order.index_of(id)));
        }
        self.audio
            .get(&id)
            .map(AudioEntity::info)
            .ok_or_else(|| ComposerError::unknown_entity(id))
    }

    /// Ids of audio-only entities.
    pub fn audio_sources(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.audio.values().map(AudioEntity::id).collect();
        ids.sort();
        ids
    }

    /// Cursor for the last hover position.
    pub fn cursor(&self) -> CursorHint {
        self.pointer.cursor()
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.pointer.mode()
    }

    pub fn drawing(&self) -> &DrawingLayer {
        &self.drawing
    }

    /// Hit-test snapshot of every visible entity, in z-order.
    pub fn hit_targets(&self) -> Vec<HitTarget> {
        self.z_order
            .ranked()
            .filter_map(|(rank, id)| self.entities.get(&id)?.hit_target(rank))
            .collect()
    }

    // ── Interaction ─────────────────────────────────────────────────

    /// Switch between move-resize and draw. An active gesture is ended.
    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        let ended = self.pointer.set_mode(mode);
        self.apply_interaction(ended);
    }

    /// Merge a partial pen style; existing strokes keep theirs.
    pub fn set_draw_style(&mut self, patch: &DrawStylePatch) {
        self.drawing.set_style(patch);
    }

    pub fn clear_drawing(&mut self) {
        self.drawing.clear();
    }

    pub fn on_pointer_down(&mut self, point: Point2D) -> Option<InteractionEvent> {
        let targets = self.hit_targets();
        let event = self.pointer.pointer_down(point, &targets);
        self.apply_interaction(event)
    }

    pub fn on_pointer_move(&mut self, point: Point2D) -> Option<InteractionEvent> {
        let targets = self.hit_targets();
        let event = self.pointer.pointer_move(point, &targets);
        self.apply_interaction(event)
    }

    pub fn on_pointer_up(&mut self) -> Option<InteractionEvent> {
        let event = self.pointer.pointer_up();
        self.apply_interaction(event)
    }

    pub fn on_pointer_leave(&mut self) -> Option<InteractionEvent> {
        let event = self.pointer.pointer_leave();
        self.apply_interaction(event)
    }

    /// Feed one recorded or live pointer event.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Option<InteractionEvent> {
        let targets = self.hit_targets();
        let event = self.pointer.handle(event, &targets);
        self.apply_interaction(event)
    }

    pub fn on_click(&mut self, listener: impl FnMut(&ClickEvent) + Send + 'static) {
        self.pointer.on_click(listener);
    }

    pub fn on_drag(&mut self, listener: impl FnMut(&DragEvent) + Send + 'static) {
        self.pointer.on_drag(listener);
    }

    pub fn on_drag_end(&mut self, listener: impl FnMut(&DragEndEvent) + Send + 'static) {
        self.pointer.on_drag_end(listener);
    }

    pub fn on_move(&mut self, listener: impl FnMut(&MoveEvent) + Send + 'static) {
        self.pointer.on_move(listener);
    }

    /// Called with the new bottom-to-top order whenever the stack changes,
    /// so an external compositor can re-stack its layers.
    pub fn on_reorder(&mut self, listener: impl FnMut(&Vec<EntityId>) + Send + 'static) {
        self.reorder_observers.subscribe(listener);
    }

    fn notify_reorder(&mut self) {
        if self.reorder_observers.is_empty() {
            return;
        }
        let order = self.z_order.ordered().to_vec();
        self.reorder_observers.notify(&order);
    }

    fn apply_interaction(&mut self, event: Option<InteractionEvent>) -> Option<InteractionEvent> {
        let event = event?;
        match &event {
            InteractionEvent::Drag(drag) => {
                if let (Some(gesture), Some(target)) = (drag.gesture, drag.context.target) {
                    let patch = OptionsPatch::pinned(gesture.geometry);
                    if let Err(err) = self.update_entity(target.id, patch) {
                        tracing::debug!(entity = %target.id, error = %err, "Dropped drag update");
                    }
                }
            }
            InteractionEvent::Click(click) => {
                if let Some(id) = click.entity {
                    let handler = self
                        .entities
                        .get(&id)
                        .and_then(|e| e.options().on_click.clone());
                    if let Some(handler) = handler {
                        handler.call(id, click.point);
                    }
                }
            }
            InteractionEvent::StrokeStart(point) => {
                let now = self.clock.now_ms();
                self.drawing.begin_stroke(*point, now);
            }
            InteractionEvent::StrokePoint(point) => {
                self.drawing.extend_stroke(*point);
            }
            InteractionEvent::StrokeEnd => {
                self.drawing.end_stroke();
            }
            InteractionEvent::DragEnd(_) | InteractionEvent::Hover(_) => {}
        }
        Some(event)
    }

    // ── Draw tick ───────────────────────────────────────────────────

    /// Build the current frame without painting it.
    pub fn compose(&self) -> FrameComposition {
        let ordered = self
            .z_order
            .ordered()
            .iter()
            .filter_map(|id| self.entities.get(id));
        compose_frame(self.frame_index, self.clock.now_ms(), ordered, &self.drawing)
    }

    /// Paint one frame unconditionally.
    pub fn render(&mut self, surface: &mut dyn Surface) -> ComposerResult<FrameComposition> {
        let composition = self.compose();
        let entities = &self.entities;
        paint(&composition, surface, |id| entities.get(&id).map(Entity::source))?;
        self.frame_index += 1;
        Ok(composition)
    }

    /// Display-refresh hook. Sweeps expired strokes on the sweep cadence and
    /// paints only when the frame interval has elapsed. Returns whether a
    /// frame was painted.
    pub fn on_animation_frame(&mut self, surface: &mut dyn Surface) -> ComposerResult<bool> {
        let now = self.clock.now_ms();
        if self.sweep_rate.should_tick(now) {
            self.sweep_drawing();
        }
        if !self.frame_rate.should_tick(now) {
            return Ok(false);
        }
        self.render(surface)?;
        Ok(true)
    }

    /// Drop expired strokes now. Returns how many were removed.
    pub fn sweep_drawing(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.drawing.sweep(now)
    }

    /// Frames painted so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Target milliseconds between painted frames.
    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_rate.interval_ms()
    }

    /// Milliseconds between stroke sweeps.
    pub fn sweep_interval_ms(&self) -> u64 {
        self.sweep_rate.interval_ms()
    }
}

impl Drop for Composer {
    fn drop(&mut self) {
        if !self.entities.is_empty() || !self.audio.is_empty() {
            self.destroy();
        }
    }
}

/// Re-derive an entity's geometry. A source that has not reported its size
/// yet leaves the entity without geometry until `source_resized`.
fn refresh(entity: &mut Entity, container: Resolution) {
    match entity.recompute(container) {
        Ok(_) => {}
        Err(err) if err.is_geometry_not_ready() => {
            tracing::debug!(entity = %entity.id(), "Geometry deferred until source reports its size");
        }
        Err(err) => {
            tracing::warn!(entity = %entity.id(), error = %err, "Layout failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::source::StillSource;
    use crate::surface::RecordingSurface;
    use composer_common::ManualClock;
    use composer_layout_model::{Dimension, FixedGeometry, Mask, PositionMode, PositionModeKind};

    fn composer() -> (Composer, ManualClock) {
        let clock = ManualClock::new(0);
        let config = ComposerConfig {
            resolution: composer_common::config::OutputResolution {
                width: 600,
                height: 600,
            },
            ..ComposerConfig::default()
        };
        (Composer::with_clock(config, clock.clone()), clock)
    }

    fn fixed(x: f64, y: f64, w: f64, h: f64) -> EntityOptions {
        EntityOptions {
            position: PositionMode::Fixed(FixedGeometry::pinned(x, y, w, h)),
            draggable: true,
            resizable: true,
            ..EntityOptions::default()
        }
    }

    fn ranks(c: &Composer) -> Vec<(EntityId, Option<u32>)> {
        c.list_entities().iter().map(|e| (e.id, e.z_index)).collect()
    }

    #[test]
    fn test_add_assigns_dense_indices_and_remove_compacts() {
        let (mut c, _) = composer();
        let a = c.add_entity(StillSource::video(400.0, 300.0), EntityOptions::default());
        let b = c.add_entity(StillSource::video(400.0, 300.0), EntityOptions::default());
        let handle = StillSource::video(400.0, 300.0);
        let d = c.add_entity(handle.clone(), EntityOptions::default());
        assert_eq!(a.to_string(), "video_0");
        assert_eq!(ranks(&c), vec![(a, Some(1)), (b, Some(2)), (d, Some(3))]);

        c.remove_entity(b).unwrap();
        assert_eq!(ranks(&c), vec![(a, Some(1)), (d, Some(2))]);

        c.remove_entity(d).unwrap();
        assert!(handle.is_released());
        assert!(matches!(
            c.remove_entity(d),
            Err(ComposerError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_cover_layout_on_add() {
        let (mut c, _) = composer();
        let id = c.add_entity(StillSource::video(400.0, 300.0), EntityOptions::default());
        let display = c.get_entity(id).unwrap().display.unwrap();
        assert_eq!(display.display_resolution, Resolution::new(800.0, 600.0));
        assert_eq!(display.position.x, -100.0);
        assert_eq!(display.position.y, 0.0);
    }

    #[test]
    fn test_audio_source_has_no_index_or_geometry() {
        let (mut c, _) = composer();
        let v = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());
        let a = c.add_audio_source(StillSource::audio());
        let implicit = c.add_entity(StillSource::audio(), EntityOptions::default());

        assert_eq!(a.to_string(), "audio_0");
        assert_eq!(c.audio_sources(), vec![a, implicit]);
        assert_eq!(ranks(&c), vec![(v, Some(1)), (a, None), (implicit, None)]);
        assert!(c.get_entity(a).unwrap().display.is_none());
        assert!(c.move_up(a).is_err());
        c.remove_entity(a).unwrap();
        assert_eq!(c.audio_sources(), vec![implicit]);
    }

    #[test]
    fn test_audio_update_ignores_index_and_keeps_stack() {
        let (mut c, _) = composer();
        let v = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());
        let a = c.add_audio_source(StillSource::audio());

        let patch = OptionsPatch {
            mute: Some(true),
            ..OptionsPatch::new().index(1).x(5.0)
        };
        c.update_entity(a, patch).unwrap();

        let info = c.get_entity(a).unwrap();
        assert!(info.options.mute);
        assert_eq!(info.z_index, None);
        assert!(info.display.is_none());
        assert_eq!(ranks(&c), vec![(v, Some(1)), (a, None)]);
    }

    #[test]
    fn test_destroy_releases_every_source() {
        let (mut c, clock) = composer();
        let video = StillSource::video(100.0, 100.0);
        let audio = StillSource::audio();
        c.add_entity(video.clone(), fixed(0.0, 0.0, 100.0, 100.0));
        c.add_audio_source(audio.clone());
        c.set_interaction_mode(InteractionMode::Draw);
        c.on_pointer_down(Point2D::new(10.0, 10.0));
        clock.advance_ms(10);
        c.on_pointer_move(Point2D::new(20.0, 20.0));

        c.destroy();

        assert!(video.is_released());
        assert!(audio.is_released());
        assert!(c.list_entities().is_empty());
        assert!(c.hit_targets().is_empty());
        assert!(c.drawing().is_empty());

        let mut surface = RecordingSurface::new(c.container());
        c.render(&mut surface).unwrap();
        assert!(surface.painted_entities().is_empty());
    }

    #[test]
    fn test_drop_releases_sources() {
        let (mut c, _) = composer();
        let video = StillSource::video(100.0, 100.0);
        let audio = StillSource::audio();
        c.add_entity(video.clone(), EntityOptions::default());
        c.add_entity(audio.clone(), EntityOptions::default());

        drop(c);

        assert!(video.is_released());
        assert!(audio.is_released());
    }

    #[test]
    fn test_move_up_then_down_restores_order() {
        let (mut c, _) = composer();
        let a = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());
        let b = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());

        assert!(c.move_up(a).unwrap());
        assert_eq!(ranks(&c), vec![(b, Some(1)), (a, Some(2))]);
        assert!(!c.move_up(a).unwrap());
        assert!(c.move_down(a).unwrap());
        assert_eq!(ranks(&c), vec![(a, Some(1)), (b, Some(2))]);
    }

    #[test]
    fn test_update_with_index_reranks_and_without_keeps_order() {
        let (mut c, _) = composer();
        let a = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());
        let b = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());
        let d = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());

        c.update_entity(d, OptionsPatch::new().opacity(50)).unwrap();
        assert_eq!(ranks(&c), vec![(a, Some(1)), (b, Some(2)), (d, Some(3))]);

        c.update_entity(d, OptionsPatch::new().index(1)).unwrap();
        assert_eq!(ranks(&c), vec![(d, Some(1)), (a, Some(2)), (b, Some(3))]);
    }

    #[test]
    fn test_update_unknown_entity_fails() {
        let (mut c, _) = composer();
        let ghost = EntityId::new(EntityKind::Video, 42);
        let err = c.update_entity(ghost, OptionsPatch::new()).unwrap_err();
        assert!(matches!(err, ComposerError::UnknownEntity { .. }));
        assert!(c.get_entity(ghost).is_err());
        assert!(c.source_resized(ghost).is_err());
    }

    #[test]
    fn test_pending_source_is_laid_out_after_resize_report() {
        let (mut c, _) = composer();
        let source = StillSource::pending();
        let id = c.add_entity(source.clone(), EntityOptions::default());
        assert!(c.get_entity(id).unwrap().display.is_none());
        assert!(c.hit_targets().is_empty());
        assert_eq!(c.compose().entities().count(), 0);

        source.set_resolution(600.0, 300.0);
        c.source_resized(id).unwrap();
        let display = c.get_entity(id).unwrap().display.unwrap();
        assert_eq!(display.display_resolution, Resolution::new(1200.0, 600.0));
    }

    #[test]
    fn test_percent_width_tracks_container() {
        let (mut c, _) = composer();
        let patch = OptionsPatch::new()
            .position(PositionModeKind::Fixed)
            .width(Dimension::Percent(50.0))
            .height(Dimension::Percent(50.0));
        let id = c.add_entity(StillSource::video(100.0, 100.0), EntityOptions::default());
        c.update_entity(id, patch).unwrap();
        assert_eq!(
            c.get_entity(id).unwrap().display.unwrap().display_resolution,
            Resolution::new(300.0, 300.0)
        );

        c.resize_container(Resolution::new(1000.0, 800.0));
        assert_eq!(
            c.get_entity(id).unwrap().display.unwrap().display_resolution,
            Resolution::new(500.0, 400.0)
        );
    }

    #[test]
    fn test_drag_moves_topmost_entity_and_pins_it() {
        let (mut c, _) = composer();
        let low = c.add_entity(StillSource::video(100.0, 100.0), fixed(0.0, 0.0, 300.0, 300.0));
        let high = c.add_entity(StillSource::video(100.0, 100.0), fixed(100.0, 100.0, 100.0, 100.0));

        c.on_pointer_down(Point2D::new(150.0, 150.0));
        c.on_pointer_move(Point2D::new(170.0, 160.0));
        c.on_pointer_up();

        let moved = c.get_entity(high).unwrap();
        assert_eq!(moved.options.position.kind(), PositionModeKind::Fixed);
        let display = moved.display.unwrap();
        assert_eq!((display.position.x, display.position.y), (120.0, 110.0));
        assert_eq!(display.display_resolution, Resolution::new(100.0, 100.0));

        let untouched = c.get_entity(low).unwrap().display.unwrap();
        assert_eq!((untouched.position.x, untouched.position.y), (0.0, 0.0));
    }

    #[test]
    fn test_drag_on_cover_entity_switches_to_fixed() {
        let (mut c, _) = composer();
        let id = c.add_entity(
            StillSource::video(600.0, 600.0),
            EntityOptions {
                draggable: true,
                ..EntityOptions::default()
            },
        );
        c.on_pointer_down(Point2D::new(300.0, 300.0));
        c.on_pointer_move(Point2D::new(310.0, 300.0));
        c.on_pointer_leave();

        let info = c.get_entity(id).unwrap();
        assert_eq!(info.options.position.kind(), PositionModeKind::Fixed);
        assert_eq!(info.display.unwrap().position.x, 10.0);
    }

    #[test]
    fn test_click_invokes_entity_handler() {
        let (mut c, _) = composer();
        let clicked = Arc::new(Mutex::new(Vec::new()));
        let sink = clicked.clone();
        let id = c.add_entity(StillSource::video(100.0, 100.0), fixed(0.0, 0.0, 100.0, 100.0));
        c.update_entity(
            id,
            OptionsPatch::new().on_click(move |id, point| sink.lock().unwrap().push((id, point))),
        )
        .unwrap();

        c.on_pointer_down(Point2D::new(50.0, 50.0));
        c.on_pointer_up();
        // Outside every entity: no handler call.
        c.on_pointer_down(Point2D::new(500.0, 500.0));
        c.on_pointer_up();

        assert_eq!(*clicked.lock().unwrap(), vec![(id, Point2D::new(50.0, 50.0))]);
    }

    #[test]
    fn test_hidden_entity_is_neither_painted_nor_hit() {
        let (mut c, _) = composer();
        let id = c.add_entity(StillSource::video(100.0, 100.0), fixed(0.0, 0.0, 100.0, 100.0));
        c.update_entity(id, OptionsPatch::new().hidden(true)).unwrap();

        assert!(c.hit_targets().is_empty());
        let mut surface = RecordingSurface::new(c.container());
        c.render(&mut surface).unwrap();
        assert!(surface.painted_entities().is_empty());
    }

    #[test]
    fn test_render_paints_in_z_order() {
        let (mut c, _) = composer();
        let a = c.add_entity(StillSource::video(100.0, 100.0), fixed(0.0, 0.0, 50.0, 50.0));
        let b = c.add_entity(
            StillSource::video(100.0, 100.0),
            EntityOptions {
                mask: Mask::Circle,
                ..fixed(10.0, 10.0, 50.0, 50.0)
            },
        );
        c.move_up(a).unwrap();

        let mut surface = RecordingSurface::new(c.container());
        c.render(&mut surface).unwrap();
        assert_eq!(surface.painted_entities(), vec![b, a]);
        assert_eq!(c.frame_index(), 1);
    }

    #[test]
    fn test_draw_mode_creates_strokes_and_ignores_entities() {
        let (mut c, clock) = composer();
        let id = c.add_entity(StillSource::video(100.0, 100.0), fixed(0.0, 0.0, 100.0, 100.0));
        c.set_interaction_mode(InteractionMode::Draw);
        c.set_draw_style(&DrawStylePatch {
            auto_erase_delay_secs: Some(1.0),
            ..DrawStylePatch::default()
        });

        c.on_pointer_down(Point2D::new(50.0, 50.0));
        c.on_pointer_move(Point2D::new(60.0, 60.0));
        c.on_pointer_up();

        assert_eq!(c.drawing().len(), 1);
        let pos = c.get_entity(id).unwrap().display.unwrap().position;
        assert_eq!((pos.x, pos.y), (0.0, 0.0));

        clock.advance_ms(1500);
        assert_eq!(c.sweep_drawing(), 1);
        assert!(c.drawing().is_empty());
    }

    #[test]
    fn test_animation_frame_is_rate_limited() {
        let (mut c, clock) = composer();
        let mut surface = RecordingSurface::new(c.container());

        assert!(c.on_animation_frame(&mut surface).unwrap());
        clock.advance_ms(16);
        assert!(!c.on_animation_frame(&mut surface).unwrap());
        clock.advance_ms(24);
        assert!(c.on_animation_frame(&mut surface).unwrap());
        // A long stall paints once, not once per missed interval.
        clock.advance_ms(1000);
        assert!(c.on_animation_frame(&mut surface).unwrap());
        assert!(!c.on_animation_frame(&mut surface).unwrap());
        assert_eq!(surface.frame_count(), 3);
    }

    #[test]
    fn test_animation_frame_sweeps_on_its_own_cadence() {
        let (mut c, clock) = composer();
        let mut surface = RecordingSurface::new(c.container());
        c.set_interaction_mode(InteractionMode::Draw);
        c.set_draw_style(&DrawStylePatch {
            auto_erase_delay_secs: Some(0.5),
            ..DrawStylePatch::default()
        });
        c.on_animation_frame(&mut surface).unwrap();
        c.on_pointer_down(Point2D::new(1.0, 1.0));
        c.on_pointer_up();

        clock.advance_ms(600);
        c.on_animation_frame(&mut surface).unwrap();
        // Expired but not yet swept: kept, but not painted.
        assert_eq!(c.drawing().len(), 1);
        assert!(c.compose().instructions.is_empty());

        clock.advance_ms(400);
        c.on_animation_frame(&mut surface).unwrap();
        assert!(c.drawing().is_empty());
    }

    #[test]
    fn test_reorder_observer_sees_new_stack() {
        let (mut c, _) = composer();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        c.on_reorder(move |order| sink.lock().unwrap().push(order.clone()));

        let a = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());
        let b = c.add_entity(StillSource::video(10.0, 10.0), EntityOptions::default());
        c.move_down(b).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().unwrap(), &vec![b, a]);
        assert_eq!(seen.len(), 3);
    }
}
