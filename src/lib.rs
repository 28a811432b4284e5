//! Monte Carlo simulation of soccer match outcomes from season-level Expected Goals (xG) profiles.
//! Derives per-match goal rates from each team's xG statistics and a venue condition, then plays
//! the match out many times under independent Poisson scoring to estimate outcome, scoreline and
//! goal-distribution probabilities. Exact scoreline probabilities are available alongside for
//! cross-checking.

pub mod domain;
pub mod error;
pub mod file;
pub mod mc;
pub mod poisson;
pub mod print;
pub mod scoregrid;
pub mod stats;
pub mod team;
pub mod xg;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
