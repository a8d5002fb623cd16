//! Media sources: the opaque handles an entity owns.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use composer_layout_model::Resolution;

/// A live or still media handle owned exclusively by one entity.
///
/// Implementations wrap whatever the host uses for frames (a decoder, a
/// capture device, an image). The composer only needs its dimensions and a
/// way to release it on removal.
pub trait MediaSource: Send {
    /// Native pixel size, or `None` until the source has reported it.
    fn native_resolution(&self) -> Option<Resolution>;

    /// Whether the source carries a video track. Audio-only sources are
    /// never painted or hit-tested.
    fn has_video(&self) -> bool;

    /// Free the underlying resources. Called exactly once, on removal or
    /// when the composer is destroyed.
    fn release(&mut self);
}

/// A source with fixed (but externally adjustable) dimensions.
///
/// Clones share state, so a test or host can keep a handle to change the
/// reported resolution or observe release after the composer owns it.
#[derive(Debug, Clone)]
pub struct StillSource {
    width_bits: Arc<AtomicU64>,
    height_bits: Arc<AtomicU64>,
    video: bool,
    released: Arc<AtomicBool>,
}

impl StillSource {
    /// A video source of the given native size.
    pub fn video(width: f64, height: f64) -> Self {
        Self::with_parts(width, height, true)
    }

    /// A video source whose dimensions are not known yet.
    pub fn pending() -> Self {
        Self::with_parts(0.0, 0.0, true)
    }

    /// An audio-only source.
    pub fn audio() -> Self {
        Self::with_parts(0.0, 0.0, false)
    }

    fn with_parts(width: f64, height: f64, video: bool) -> Self {
        Self {
            width_bits: Arc::new(AtomicU64::new(width.to_bits())),
            height_bits: Arc::new(AtomicU64::new(height.to_bits())),
            video,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Report new native dimensions (e.g. after a device renegotiates).
    pub fn set_resolution(&self, width: f64, height: f64) {
        self.width_bits.store(width.to_bits(), Ordering::SeqCst);
        self.height_bits.store(height.to_bits(), Ordering::SeqCst);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl MediaSource for StillSource {
    fn native_resolution(&self) -> Option<Resolution> {
        let resolution = Resolution::new(
            f64::from_bits(self.width_bits.load(Ordering::SeqCst)),
            f64::from_bits(self.height_bits.load(Ordering::SeqCst)),
        );
        resolution.is_available().then_some(resolution)
    }

    fn has_video(&self) -> bool {
        self.video
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
