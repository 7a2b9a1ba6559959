//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the engine (the ledger, wall-clock time,
//! randomness, and the disabled-voter file) sits behind a trait. This crate
//! provides in-memory implementations that:
//! - return scripted, deterministic values
//! - record what the engine asked of them for later assertions
//! - never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;
pub mod random;
pub mod store;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use random::NullRandom;
pub use store::NullDisabledVoterStore;
