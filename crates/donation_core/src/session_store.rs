use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use shared::{domain::SessionState, error::FlowError};
use tracing::{debug, warn};

pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A single get/set/clear storage slot.
pub trait SessionSlot: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, value: String);
    fn clear(&self);
}

#[derive(Default)]
pub struct InMemorySlot {
    value: Mutex<Option<String>>,
}

impl SessionSlot for InMemorySlot {
    fn get(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, value: String) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    fn clear(&self) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

pub struct SessionStore {
    slot: Arc<dyn SessionSlot>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(slot: Arc<dyn SessionSlot>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { slot, clock, ttl }
    }

    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(InMemorySlot::default()),
            clock,
            Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        )
    }

    /// Stamps `state` with the current time and writes it to the slot.
    pub fn save(&self, state: &mut SessionState) -> Result<(), FlowError> {
        state.captured_at = self.clock.now();
        let encoded =
            serde_json::to_string(state).map_err(|err| FlowError::Session(err.to_string()))?;
        self.slot.set(encoded);
        debug!(screen = %state.current_screen, "session state stored");
        Ok(())
    }

    /// Returns the stored record unless it is missing, unreadable or expired.
    pub fn load(&self) -> Option<SessionState> {
        let raw = self.slot.get()?;
        let state: SessionState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(error) => {
                warn!(%error, "discarding unreadable session record");
                self.slot.clear();
                return None;
            }
        };

        if state.is_expired(self.clock.now(), self.ttl) {
            debug!(captured_at = %state.captured_at, "session record expired");
            return None;
        }
        Some(state)
    }

    pub fn clear(&self) {
        self.slot.clear();
    }
}

#[cfg(test)]
#[path = "tests/session_store_tests.rs"]
mod tests;
