//! Voting-power ledger.
//!
//! Voting power recharges linearly at 20 % per day. The ledger only stores
//! each account's power as of its last vote, so the current value is a
//! projection: `stored + elapsed * rate`, clamped to 100 %. Anything that
//! would have been above 100 % is reported as wasted and discarded.

pub mod ledger;
pub mod projection;

pub use ledger::{PowerSummary, PowerThresholds, VotingPowerLedger};
pub use projection::{project, Projection, RECHARGE_PER_DAY, RECHARGE_PER_SEC};
