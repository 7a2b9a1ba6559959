//! Dispatch engine.
//!
//! Each eligible post gets exactly one vote task, keyed by its slug. A task
//! waits out a randomized front-running delay, re-validates against a fresh
//! content snapshot, then walks its working voter set submitting votes and
//! classifying each outcome:
//!
//! ```text
//! Dedup-Check -> Initial-Wait -> Re-Validate -> Voter-Loop -> Done
//! ```
//!
//! The task frees its slug when it finishes, whatever the reason.

pub mod backoff;
pub mod config;
pub mod engine;
pub mod registry;

pub use backoff::Backoff;
pub use config::DispatchConfig;
pub use engine::{Dispatch, DispatchEngine, EngineParts, TaskEnd, TaskReport, VoteJob, WaitOffset};
pub use registry::{TaskGuard, TaskRegistry};
