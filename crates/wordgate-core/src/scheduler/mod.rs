//! Interruption scheduling.
//!
//! Maintains the invariant that at most one pending wake signal exists,
//! keyed by [`INTERRUPTION_SLOT`]. Re-arming always replaces; it never
//! stacks a second signal.

mod timer;

pub use timer::TokioWakeTimer;

use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ScheduleError;
use crate::storage::ScheduleSettings;

/// The fixed key identifying the single process-wide wake-signal slot.
pub const INTERRUPTION_SLOT: &str = "interruption";

/// One-shot wake-signal facility.
///
/// Arming the same key twice replaces the pending signal (last-write-wins).
pub trait WakeTimer: Send + Sync {
    /// Arm a one-shot signal for `trigger_at` under `key`.
    fn arm(&self, key: &str, trigger_at: DateTime<Utc>) -> Result<(), ScheduleError>;

    /// Cancel the signal armed under `key`. Cancelling an empty slot is a no-op.
    fn cancel(&self, key: &str);

    /// Whether the host authorizes precise wake timing.
    fn can_schedule_exact(&self) -> bool;
}

/// What `schedule_next` did. Declines are outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ScheduleOutcome {
    Armed { trigger_at: DateTime<Utc> },
    /// Today is not in the active-day set.
    InactiveDay,
    /// The host has not authorized precise wake timing.
    Unauthorized,
    /// The configured interval is not positive.
    IntervalDisabled,
}

/// Computes and arms the next interruption trigger.
pub struct Scheduler {
    timer: Arc<dyn WakeTimer>,
}

impl Scheduler {
    pub fn new(timer: Arc<dyn WakeTimer>) -> Self {
        Self { timer }
    }

    /// Cancel any pending signal and, when settings allow it, arm the next
    /// one at `now + interval`.
    ///
    /// Declines silently (returning the reason) when today is inactive, when
    /// precise timing is not authorized, or when the interval is not
    /// positive; the caller decides whether to surface a permission request.
    ///
    /// # Errors
    /// Returns an error only if the wake facility fails to arm.
    pub fn schedule_next(
        &self,
        settings: &ScheduleSettings,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        debug!("attempting to schedule next interruption");
        self.timer.cancel(INTERRUPTION_SLOT);

        let today = Local::now().weekday();
        if !settings.active_days.contains(&today) {
            debug!(%today, "today is not an active day, skipping scheduling");
            return Ok(ScheduleOutcome::InactiveDay);
        }

        if !self.timer.can_schedule_exact() {
            warn!("exact wake timing not authorized, cannot schedule interruption");
            return Ok(ScheduleOutcome::Unauthorized);
        }

        let interval = settings.interval.duration();
        if interval <= chrono::Duration::zero() {
            warn!("interruption interval is not positive, not scheduling");
            return Ok(ScheduleOutcome::IntervalDisabled);
        }

        let trigger_at = Utc::now() + interval;
        self.timer.arm(INTERRUPTION_SLOT, trigger_at)?;
        debug!(%trigger_at, minutes = interval.num_minutes(), "next interruption scheduled");
        Ok(ScheduleOutcome::Armed { trigger_at })
    }

    /// Remove any pending wake signal. Always succeeds.
    pub fn cancel(&self) {
        self.timer.cancel(INTERRUPTION_SLOT);
        debug!("interruption wake signal cancelled");
    }
}
