//! In-process wake-signal facility backed by tokio timers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::WakeTimer;
use crate::error::ScheduleError;

/// Wake-signal facility that sleeps on a tokio task per armed slot and
/// reports fired keys over a channel.
///
/// Must be used from within a tokio runtime; arming outside one fails.
pub struct TokioWakeTimer {
    fired: mpsc::UnboundedSender<String>,
    slots: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioWakeTimer {
    /// Create the facility plus the receiver on which fired slot keys arrive.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (fired, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                fired,
                slots: Mutex::new(HashMap::new()),
            }),
            rx,
        )
    }

    /// Whether a signal is currently pending under `key`.
    pub fn is_armed(&self, key: &str) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.get(key).is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

impl WakeTimer for TokioWakeTimer {
    fn arm(&self, key: &str, trigger_at: DateTime<Utc>) -> Result<(), ScheduleError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ScheduleError::ArmFailed(e.to_string()))?;

        let delay = (trigger_at - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        let fired = self.fired.clone();
        let slot_key = key.to_string();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(key = %slot_key, "wake signal fired");
            let _ = fired.send(slot_key);
        });

        let mut slots = self
            .slots
            .lock()
            .map_err(|e| ScheduleError::ArmFailed(format!("slot table poisoned: {e}")))?;
        if let Some(previous) = slots.insert(key.to_string(), handle) {
            previous.abort();
        }
        Ok(())
    }

    fn cancel(&self, key: &str) {
        if let Ok(mut slots) = self.slots.lock() {
            if let Some(handle) = slots.remove(key) {
                handle.abort();
            }
        }
    }

    fn can_schedule_exact(&self) -> bool {
        // An in-process timer needs no host authorization.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn armed_signal_fires_with_key() {
        let (timer, mut fired) = TokioWakeTimer::new();
        timer
            .arm("test", Utc::now() + chrono::Duration::milliseconds(10))
            .unwrap();
        assert!(timer.is_armed("test"));
        assert_eq!(fired.recv().await.as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn rearming_replaces_previous_signal() {
        let (timer, mut fired) = TokioWakeTimer::new();
        timer
            .arm("slot", Utc::now() + chrono::Duration::milliseconds(20))
            .unwrap();
        timer
            .arm("slot", Utc::now() + chrono::Duration::milliseconds(40))
            .unwrap();

        assert_eq!(fired.recv().await.as_deref(), Some("slot"));
        // Only the replacement fires; the first task was aborted.
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        assert!(fired.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancel_empties_slot() {
        let (timer, mut fired) = TokioWakeTimer::new();
        timer
            .arm("slot", Utc::now() + chrono::Duration::milliseconds(20))
            .unwrap();
        timer.cancel("slot");
        assert!(!timer.is_armed("slot"));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(fired.try_recv().is_err());
    }
}
