//! Testing helpers.

use crate::team::{TeamProfile, TeamStats};

/// A validated team with the given xG statistics, playing in the `"test"` season.
pub fn team(name: &str, avg_xg_for: f64, xg_efficiency: f64, defensive_efficiency: f64) -> TeamProfile {
    TeamProfile::new(
        name,
        "test",
        TeamStats::new(avg_xg_for, xg_efficiency, defensive_efficiency),
    )
    .unwrap()
}

/// Asserts that `actual` lies within `tolerance` of `expected`, as a fraction of `expected`.
pub fn assert_within_fraction(expected: f64, actual: f64, tolerance: f64) {
    let deviation = (actual - expected).abs() / expected.abs();
    assert!(
        deviation <= tolerance,
        "{actual} deviates from {expected} by {:.3}%, exceeding {:.3}%",
        deviation * 100.0,
        tolerance * 100.0
    );
}
