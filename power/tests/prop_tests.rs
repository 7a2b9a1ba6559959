use proptest::prelude::*;

use vanguard_power::{project, PowerThresholds};
use vanguard_types::{VoteWeight, VotingPower};

proptest! {
    /// Projection never drops below the stored value and never exceeds 100 %.
    #[test]
    fn projection_is_bounded(stored in 0u16..=10_000, elapsed in 0u64..10_000_000) {
        let stored = VotingPower::new(stored);
        let p = project(stored, elapsed);
        prop_assert!(p.current >= stored);
        prop_assert!(p.current <= VotingPower::FULL);
        prop_assert!(p.wasted >= 0.0);
    }

    /// Projection is monotonically non-decreasing in elapsed time.
    #[test]
    fn projection_is_monotonic(stored in 0u16..=10_000, a in 0u64..5_000_000, b in 0u64..5_000_000) {
        let stored = VotingPower::new(stored);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(project(stored, lo).current <= project(stored, hi).current);
    }

    /// The lowered threshold applies exactly to full-strength votes.
    #[test]
    fn threshold_lowered_only_for_full_weight(
        minimum in 0u16..=10_000,
        reserve in 0u16..=10_000,
        weight in 0u16..=10_000,
    ) {
        let thresholds = PowerThresholds {
            minimum: VotingPower::new(minimum),
            reserve: VotingPower::new(reserve),
        };
        let expected = if weight >= 10_000 {
            VotingPower::new(minimum.saturating_sub(reserve))
        } else {
            VotingPower::new(minimum)
        };
        prop_assert_eq!(thresholds.for_weight(VoteWeight::new(weight)), expected);
    }
}
