//! Pure recharge arithmetic.

use vanguard_types::VotingPower;

/// Recharge per day in hundredths of a percent (20 %).
pub const RECHARGE_PER_DAY: f64 = 2_000.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Recharge per second in hundredths of a percent.
pub const RECHARGE_PER_SEC: f64 = RECHARGE_PER_DAY / SECONDS_PER_DAY;

/// Result of projecting stored power forward in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub current: VotingPower,
    /// Recharge above 100 % that was lost, in hundredths of a percent.
    pub wasted: f64,
}

/// Project `stored` power forward by `elapsed_secs`.
pub fn project(stored: VotingPower, elapsed_secs: u64) -> Projection {
    let full = f64::from(VotingPower::FULL.hundredths());
    let raw =
        f64::from(stored.hundredths()) + elapsed_secs as f64 * RECHARGE_PER_DAY / SECONDS_PER_DAY;
    let wasted = (raw - full).max(0.0);
    let current = VotingPower::new(raw.min(full).floor() as u16);
    Projection { current, wasted }
}
