//! Store access from async code.
//!
//! [`DisabledVoterStore`](crate::DisabledVoterStore) implementations touch the
//! filesystem synchronously, so async callers hand the call to tokio's
//! blocking pool instead of running it on a runtime worker.

use crate::RosterError;

/// Run `op` on the blocking pool and wait for its result.
pub async fn on_blocking_pool<T, F>(op: F) -> Result<T, RosterError>
where
    F: FnOnce() -> Result<T, RosterError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| RosterError::Blocking(e.to_string()))?
}
