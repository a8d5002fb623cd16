//! Media Composer Interaction
//!
//! Everything between the raw pointer feed and entity geometry:
//! - **Z-Order:** Dense 1..N stacking ranks shared by painting and hit testing
//! - **Hit Testing:** Topmost-entity resolution with edge/annulus location tags
//! - **Pointer State Machine:** Click, drag-move, drag-resize and cursor hints
//! - **Drawing:** Freehand strokes with timed auto-erase
//!
//! This crate is pure computation: no I/O, no rendering. Time enters only as
//! millisecond values passed in by the caller.

pub mod arena;
pub mod drawing;
pub mod gesture;
pub mod pointer;
pub mod zorder;

pub use arena::Arena;
pub use drawing::{DrawStyle, DrawStylePatch, DrawingLayer, Stroke, StrokeId};
pub use gesture::{drag_geometry, DragContext, Gesture, GestureKind};
pub use hit_test::{hit_test, Hit, HitTarget, Location, Locations};
pub use pointer::{
    ClickEvent, CursorHint, DragEndEvent, DragEvent, InteractionEvent, MoveEvent, ObserverList,
    PointerStateMachine,
};
pub use zorder::ZOrderRegistry;
