//! Shared control state for a driven run.
//!
//! [`RunControl`] is shared between the task driving [`run_program`] and
//! whatever issues commands to it (a signal handler, a UI, an observer).
//! Every control field is atomic, so the driving loop reads it without
//! locks.
//!
//! [`run_program`]: crate::runner::run_program

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::config::RunConfig;

/// Why a driven run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The engine finished: end of list reached or level won or lost.
    Completed,
    /// A stop was requested.
    OperatorStop,
    /// The configured step bound was hit.
    MaxTicksReached,
}

/// Shared run control state.
#[derive(Debug)]
pub struct RunControl {
    /// Whether the run is paused.
    paused: AtomicBool,

    /// Wakes the driving loop on resume or stop.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Playback speed in percent of nominal.
    speed_percent: AtomicU32,

    /// Whether the driver sleeps between steps.
    realtime: AtomicBool,

    /// Maximum number of engine steps (0 = unlimited).
    max_ticks: u64,
}

impl RunControl {
    /// Create a control state from configuration.
    pub fn new(config: &RunConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            speed_percent: AtomicU32::new(config.speed_percent.max(1)),
            realtime: AtomicBool::new(config.realtime),
            max_ticks: config.max_ticks,
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the run is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause before the next step.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume and wake the driving loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until resumed or stopped.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a stop. Also wakes a paused loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Speed
    // -----------------------------------------------------------------------

    /// Current playback speed in percent of nominal.
    pub fn speed_percent(&self) -> u32 {
        self.speed_percent.load(Ordering::Acquire)
    }

    /// Set the playback speed. Zero is rejected.
    ///
    /// Returns the previous speed, or `None` if the value was rejected.
    pub fn set_speed_percent(&self, percent: u32) -> Option<u32> {
        if percent == 0 {
            return None;
        }
        Some(self.speed_percent.swap(percent, Ordering::AcqRel))
    }

    /// Whether the driver sleeps between steps.
    pub fn is_realtime(&self) -> bool {
        self.realtime.load(Ordering::Acquire)
    }

    /// Turn sleeping between steps on or off.
    pub fn set_realtime(&self, realtime: bool) {
        self.realtime.store(realtime, Ordering::Release);
    }

    /// Scale a nominal delay by the current speed.
    pub fn scale(&self, nominal: Duration) -> Duration {
        let percent = self.speed_percent().max(1);
        nominal
            .checked_mul(100)
            .and_then(|d| d.checked_div(percent))
            .unwrap_or(nominal)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Whether `ticks` engine steps reach the configured bound.
    pub const fn tick_limit_reached(&self, ticks: u64) -> bool {
        self.max_ticks > 0 && ticks >= self.max_ticks
    }

    /// The configured step bound (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new(&RunConfig::default())
    }
}
