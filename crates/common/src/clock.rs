//! Clock and timing utilities for the draw loop and stroke expiry.
//!
//! Everything time-dependent in the composer (stroke start times, fade
//! alpha, frame gating) reads milliseconds from a [`TimeSource`] anchored at
//! composer start. Hosts use [`ComposerClock`]; tests and scripted replays
//! use [`ManualClock`] to step time deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic millisecond source.
pub trait TimeSource {
    /// Milliseconds elapsed since the source's epoch.
    fn now_ms(&self) -> u64;
}

/// A composer clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the composer started).
#[derive(Debug, Clone)]
pub struct ComposerClock {
    /// The instant the composer started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl ComposerClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Wall-clock time at composer start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Get seconds elapsed since composer start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl TimeSource for ComposerClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Move time forward by `ms`.
    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute time. Going backwards is ignored.
    pub fn set_ms(&self, ms: u64) {
        self.now_ms.fetch_max(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Convert milliseconds to fractional seconds.
pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

/// Tick gate for fixed-rate work (frames, sweeps).
///
/// A late tick fires once and re-anchors at the current time, so missed
/// intervals are skipped rather than replayed.
#[derive(Debug)]
pub struct RateController {
    target_interval_ms: u64,
    last_tick_ms: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self::with_interval_ms(1000 / u64::from(target_hz.max(1)))
    }

    /// Create a controller with an explicit interval.
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self {
            target_interval_ms: interval_ms,
            last_tick_ms: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ms: u64) -> bool {
        match self.last_tick_ms {
            None => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            Some(last) if current_ms >= last + self.target_interval_ms => {
                self.last_tick_ms = Some(current_ms);
                true
            }
            _ => false,
        }
    }

    /// Target interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.target_interval_ms
    }
}
