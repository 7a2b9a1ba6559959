//! Controlled voter accounts and their permanent deny-list.
//!
//! The roster is loaded once at startup and never changes. Disablement is
//! kept outside the roster in a [`DisabledVoterStore`], which is re-read on
//! every query so that operators (or other processes) can append to it while
//! the engine runs.

pub mod blocking;
pub mod disabled;
pub mod error;
pub mod roster;

pub use blocking::on_blocking_pool;
pub use disabled::{DisabledVoter, DisabledVoterStore, FileDisabledVoterStore};
pub use error::RosterError;
pub use roster::{Voter, VoterRoster};
