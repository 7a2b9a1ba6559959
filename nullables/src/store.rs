//! Nullable disabled-voter store: in-memory deny-list for testing.

use std::sync::Mutex;

use vanguard_roster::{DisabledVoter, DisabledVoterStore, RosterError};

/// An in-memory [`DisabledVoterStore`].
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullDisabledVoterStore {
    entries: Mutex<Vec<DisabledVoter>>,
}

impl NullDisabledVoterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an operator appending to the persisted list.
    pub fn append_external(&self, name: &str, reason: &str) {
        self.entries.lock().unwrap().push(DisabledVoter {
            name: name.to_string(),
            reason: reason.to_string(),
        });
    }
}

impl DisabledVoterStore for NullDisabledVoterStore {
    fn disabled(&self) -> Result<Vec<DisabledVoter>, RosterError> {
        Ok(self.entries.lock().unwrap().clone())
    }

    fn disable(&self, name: &str, reason: &str) -> Result<bool, RosterError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|d| d.name == name) {
            return Ok(false);
        }
        entries.push(DisabledVoter {
            name: name.to_string(),
            reason: reason.to_string(),
        });
        Ok(true)
    }
}
