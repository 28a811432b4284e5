//! Errors raised by the core. All of them are input validation failures, detected before any
//! simulation work is done.

use thiserror::Error;

use crate::domain::Side;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidTeam {
    #[error("team name cannot be empty")]
    EmptyName,

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("{0}")]
    InvalidTeam(#[from] InvalidTeam),

    #[error("{side} expected goals must lie within 0..={}, got {lambda}", crate::xg::MAX_EXPECTED_GOALS)]
    InvalidLambda { side: Side, lambda: f64 },

    #[error("number of trials must be at least 1, got {0}")]
    InvalidTrials(u64),

    #[error("number of shards must be at least 1, got {0}")]
    InvalidShards(usize),

    #[error("goal counts must lie within 0..={}, got {home}-{away}", u16::MAX)]
    InvalidScore { home: i64, away: i64 },

    #[error("simulation interrupted after {completed} trials")]
    Interrupted { completed: u64 },
}
