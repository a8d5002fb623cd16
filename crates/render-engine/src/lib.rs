//! Media Composer Render Engine
//!
//! Ties the geometry engine, z-order, hit tester, pointer state machine and
//! drawing layer together behind a single [`Composer`], and paints frames
//! onto a host-provided [`Surface`].
//!
//! # Frame Pipeline
//!
//! ```text
//! MediaSource ──► Entity (options + display) ──┐
//!                                              ├── ascending z-order
//! ZOrderRegistry ──────────────────────────────┘         │
//!                                                        ├── circle clip / opacity
//! DrawingLayer (strokes + fade) ─────────────────────────┘         │
//!                                                                  ▼
//!                                                         FrameComposition
//!                                                                  │
//!                                                                  ▼
//!                                                               Surface
//! ```
//!
//! Hosts either call [`Composer::on_animation_frame`] from their refresh
//! callback or hand the composer to [`run_composer_loop`].

pub mod composer;
pub mod compositor;
pub mod driver;
pub mod entity;
pub mod source;
pub mod surface;

pub use composer::Composer;
pub use compositor::{compose_frame, paint, source_placement, DrawInstruction, FrameComposition};
pub use driver::{run_composer_loop, ComposerCommand, LoopOutcome};
pub use entity::{AudioEntity, Entity, EntityInfo};
pub use source::{MediaSource, StillSource};
pub use surface::{CircleClip, DrawOp, RecordingSurface, SourcePlacement, StrokePaint, Surface};
