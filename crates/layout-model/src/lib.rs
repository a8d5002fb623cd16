//! Media Composer Layout Model
//!
//! Defines the core data contracts of the composer:
//! - **Geometry:** Resolutions, positions, points and rectangles
//! - **Position modes:** `contain`, `cover` and `fixed` placement strategies
//! - **Layout:** The pure geometry engine turning a position mode into pixels
//! - **Options:** Per-entity user options and partial updates
//! - **Pointer:** The pointer-event feed consumed by the interaction layer
//!
//! All coordinates are container-space pixels. Nothing is normalized.

pub mod geometry;
pub mod layout;
pub mod options;
pub mod pointer;
pub mod position;

pub use geometry::*;
pub use layout::*;
pub use options::*;
pub use pointer::*;
pub use position::*;
