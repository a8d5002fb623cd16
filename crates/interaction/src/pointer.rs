//! Pointer state machine.
//!
//! ```text
//!            down (hit or miss)          move (displaced)
//!   Idle ─────────────────────► Pressed ─────────────────► Dragging
//!    ▲                            │                          │
//!    │        up / leave: Click   │     up / leave: DragEnd  │
//!    └────────────────────────────┴──────────────────────────┘
//! ```
//!
//! In move-resize mode a drag produces pinned geometry for the pressed
//! entity (see [`crate::gesture`]). In draw mode the same phases become
//! stroke start/extend/end and entities are ignored. Idle moves only run
//! the hit tester to pick a cursor.

use std::fmt;

use composer_layout_model::{EntityId, InteractionMode, Point2D, PointerEvent, PointerEventKind};
use serde::Serialize;

use crate::gesture::{drag_geometry, DragContext, Gesture};
use crate::hit_test::{hit_test, Hit, HitTarget, Location, Locations, DEFAULT_BAND_PX};

/// Cursor affordance for the current hover target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorHint {
    #[default]
    Default,
    Grab,
    AllScroll,
    NsResize,
    EwResize,
}

impl CursorHint {
    /// CSS cursor keyword.
    pub fn as_css(&self) -> &'static str {
        match self {
            CursorHint::Default => "auto",
            CursorHint::Grab => "grab",
            CursorHint::AllScroll => "all-scroll",
            CursorHint::NsResize => "ns-resize",
            CursorHint::EwResize => "ew-resize",
        }
    }

    /// Cursor for hovering `hit`; resize handles override grab.
    pub fn for_hit(hit: Option<&Hit>) -> Self {
        let Some(hit) = hit else {
            return CursorHint::Default;
        };
        let locations = hit.locations;
        let mut cursor = CursorHint::Default;
        if hit.target.draggable && locations.contains(Location::Inside) {
            cursor = CursorHint::Grab;
        }
        if hit.target.resizable {
            let handle = [
                (Location::Circle, CursorHint::AllScroll),
                (Location::Top, CursorHint::NsResize),
                (Location::Left, CursorHint::EwResize),
                (Location::Bottom, CursorHint::NsResize),
                (Location::Right, CursorHint::EwResize),
            ]
            .into_iter()
            .find(|(location, _)| locations.contains(*location));
            if let Some((_, hint)) = handle {
                cursor = hint;
            }
        }
        cursor
    }
}

/// Press and release without movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// Press coordinate.
    pub point: Point2D,
    /// The clicked entity, when the press was inside one.
    pub entity: Option<EntityId>,
}

/// One pointer move of an active gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub point: Point2D,
    pub context: DragContext,
    /// Geometry to apply, if the gesture targets a movable/resizable entity.
    pub gesture: Option<Gesture>,
}

/// End of a gesture that moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEndEvent {
    pub entity: Option<EntityId>,
}

/// Pointer move with no button held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEvent {
    pub point: Point2D,
    pub hit: Option<Hit>,
    pub cursor: CursorHint,
}

/// Outcome of feeding one pointer event to the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    Click(ClickEvent),
    Drag(DragEvent),
    DragEnd(DragEndEvent),
    Hover(MoveEvent),
    StrokeStart(Point2D),
    StrokePoint(Point2D),
    StrokeEnd,
}

/// Listeners for one event kind, called in registration order.
pub struct ObserverList<E> {
    listeners: Vec<Box<dyn FnMut(&E) + Send>>,
}

impl<E> Default for ObserverList<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<E> ObserverList<E> {
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn notify(&mut self, event: &E) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerState {
    Idle,
    Pressed(DragContext),
    Dragging(DragContext),
}

/// Turns raw pointer phases into click/drag/hover/stroke events.
pub struct PointerStateMachine {
    mode: InteractionMode,
    state: PointerState,
    band: f64,
    cursor: CursorHint,
    click_observers: ObserverList<ClickEvent>,
    drag_observers: ObserverList<DragEvent>,
    drag_end_observers: ObserverList<DragEndEvent>,
    move_observers: ObserverList<MoveEvent>,
}

impl Default for PointerStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_BAND_PX)
    }
}

impl fmt::Debug for PointerStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerStateMachine")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("band", &self.band)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl PointerStateMachine {
    /// Create an idle machine in move-resize mode with the given handle band.
    pub fn new(band: f64) -> Self {
        Self {
            mode: InteractionMode::MoveResize,
            state: PointerState::Idle,
            band,
            cursor: CursorHint::Default,
            click_observers: ObserverList::default(),
            drag_observers: ObserverList::default(),
            drag_end_observers: ObserverList::default(),
            move_observers: ObserverList::default(),
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switch routing policy. An active gesture is ended first.
    pub fn set_mode(&mut self, mode: InteractionMode) -> Option<InteractionEvent> {
        if mode == self.mode {
            return None;
        }
        let ended = self.release();
        self.mode = mode;
        self.cursor = CursorHint::Default;
        tracing::debug!(?mode, "Interaction mode changed");
        ended
    }

    /// Cursor computed on the last idle move.
    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Context of the gesture in progress, if any.
    pub fn drag_context(&self) -> Option<&DragContext> {
        match &self.state {
            PointerState::Idle => None,
            PointerState::Pressed(ctx) | PointerState::Dragging(ctx) => Some(ctx),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging(_))
    }

    pub fn on_click(&mut self, listener: impl FnMut(&ClickEvent) + Send + 'static) {
        self.click_observers.subscribe(listener);
    }

    pub fn on_drag(&mut self, listener: impl FnMut(&DragEvent) + Send + 'static) {
        self.drag_observers.subscribe(listener);
    }

    pub fn on_drag_end(&mut self, listener: impl FnMut(&DragEndEvent) + Send + 'static) {
        self.drag_end_observers.subscribe(listener);
    }

    pub fn on_move(&mut self, listener: impl FnMut(&MoveEvent) + Send + 'static) {
        self.move_observers.subscribe(listener);
    }

    /// Dispatch any pointer event.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        targets: &[HitTarget],
    ) -> Option<InteractionEvent> {
        match event.kind {
            PointerEventKind::Down { x, y } => self.pointer_down(Point2D::new(x, y), targets),
            PointerEventKind::Move { x, y } => self.pointer_move(Point2D::new(x, y), targets),
            PointerEventKind::Up { .. } => self.pointer_up(),
            PointerEventKind::Leave => self.pointer_leave(),
        }
    }

    pub fn pointer_down(
        &mut self,
        point: Point2D,
        targets: &[HitTarget],
    ) -> Option<InteractionEvent> {
        if !matches!(self.state, PointerState::Idle) {
            // The previous release never arrived.
            tracing::debug!("Pointer down during active gesture; restarting");
        }

        match self.mode {
            InteractionMode::Draw => {
                self.state = PointerState::Pressed(DragContext {
                    target: None,
                    locations: Locations::empty(),
                    start: point,
                });
                Some(InteractionEvent::StrokeStart(point))
            }
            InteractionMode::MoveResize => {
                let hit = hit_test(point, targets, self.band);
                let ctx = DragContext {
                    target: hit.map(|h| h.target),
                    locations: hit.map(|h| h.locations).unwrap_or_default(),
                    start: point,
                };
                if let Some(hit) = &hit {
                    tracing::debug!(
                        entity = %hit.id(),
                        locations = ?hit.locations,
                        "Gesture pressed"
                    );
                }
                self.state = PointerState::Pressed(ctx);
                None
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        point: Point2D,
        targets: &[HitTarget],
    ) -> Option<InteractionEvent> {
        let ctx = match self.state {
            PointerState::Idle => return Some(self.hover(point, targets)),
            PointerState::Pressed(ctx) if ctx.start == point => return None,
            PointerState::Pressed(ctx) | PointerState::Dragging(ctx) => ctx,
        };
        self.state = PointerState::Dragging(ctx);

        match self.mode {
            InteractionMode::Draw => Some(InteractionEvent::StrokePoint(point)),
            InteractionMode::MoveResize => {
                let event = DragEvent {
                    point,
                    context: ctx,
                    gesture: drag_geometry(&ctx, point),
                };
                self.drag_observers.notify(&event);
                Some(InteractionEvent::Drag(event))
            }
        }
    }

    pub fn pointer_up(&mut self) -> Option<InteractionEvent> {
        self.release()
    }

    /// Leaving the surface ends any gesture exactly like a release.
    pub fn pointer_leave(&mut self) -> Option<InteractionEvent> {
        self.cursor = CursorHint::Default;
        self.release()
    }

    fn release(&mut self) -> Option<InteractionEvent> {
        let state = std::mem::replace(&mut self.state, PointerState::Idle);
        match (self.mode, state) {
            (_, PointerState::Idle) => None,
            (InteractionMode::Draw, _) => Some(InteractionEvent::StrokeEnd),
            (InteractionMode::MoveResize, PointerState::Pressed(ctx)) => {
                let entity = ctx
                    .target
                    .filter(|_| ctx.locations.contains(Location::Inside))
                    .map(|t| t.id);
                let event = ClickEvent {
                    point: ctx.start,
                    entity,
                };
                self.click_observers.notify(&event);
                Some(InteractionEvent::Click(event))
            }
            (InteractionMode::MoveResize, PointerState::Dragging(ctx)) => {
                let event = DragEndEvent {
                    entity: ctx.target.map(|t| t.id),
                };
                if let Some(id) = event.entity {
                    tracing::debug!(entity = %id, "Gesture ended");
                }
                self.drag_end_observers.notify(&event);
                Some(InteractionEvent::DragEnd(event))
            }
        }
    }

    fn hover(&mut self, point: Point2D, targets: &[HitTarget]) -> InteractionEvent {
        let hit = hit_test(point, targets, self.band);
        self.cursor = match self.mode {
            InteractionMode::MoveResize => CursorHint::for_hit(hit.as_ref()),
            InteractionMode::Draw => CursorHint::Default,
        };
        let event = MoveEvent {
            point,
            hit,
            cursor: self.cursor,
        };
        self.move_observers.notify(&event);
        InteractionEvent::Hover(event)
    }
}
