//! Monte Carlo simulation of match outcomes.
//!
//! Each trial draws home and away goals from independent Poisson distributions whose means are
//! fixed for the whole run. Trials may be sharded across threads; every shard owns its tally and
//! its own independently seeded generator, and the shard tallies are merged in shard order once
//! all shards complete.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tinyrand::{Rand, Seeded, StdRand};
use tracing::debug;

use crate::domain::Score;
use crate::error::SimulationError;
use crate::poisson;
use crate::stats::{SimulationResult, Tally};
use crate::team::TeamProfile;
use crate::xg::{ExpectedGoals, Fixture, Venue};


pub const DEFAULT_TRIALS: u64 = 10_000;

/// Number of trials played between successive checks of the cancellation flag and deadline.
pub const CANCEL_CHECK_INTERVAL: u64 = 1_024;

/// Realises a single match.
#[inline(always)]
pub fn simulate_one_match(home_lambda: f64, away_lambda: f64, rand: &mut impl Rand) -> Score {
    let home = poisson::sample(home_lambda, rand);
    let away = poisson::sample(away_lambda, rand);
    Score { home, away }
}

/// Runs `trials` simulations of `home` hosting `away` using a default-configured engine.
pub fn run_simulations(
    home: &TeamProfile,
    away: &TeamProfile,
    trials: u64,
    venue: Venue,
) -> Result<SimulationResult, SimulationError> {
    MonteCarloEngine::default()
        .with_trials(trials)
        .simulate(&Fixture::new(home, away, venue))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub trials: u64,
    pub shards: usize,
    pub seed: Option<u64>,
}
impl Config {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.trials == 0 {
            return Err(SimulationError::InvalidTrials(self.trials));
        }
        if self.shards == 0 {
            return Err(SimulationError::InvalidShards(self.shards));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            shards: 1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonteCarloEngine {
    config: Config,
    cancel: Option<Arc<AtomicBool>>,
    timeout: Option<Duration>,
}
impl MonteCarloEngine {
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.config.trials = trials;
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.config.shards = shards;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Aborts the run with [SimulationError::Interrupted] once `cancel` is raised.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Aborts the run with [SimulationError::Interrupted] once `timeout` elapses.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn trials(&self) -> u64 {
        self.config.trials
    }

    pub fn shards(&self) -> usize {
        self.config.shards
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn simulate(&self, fixture: &Fixture) -> Result<SimulationResult, SimulationError> {
        self.config.validate()?;
        let expected_goals = fixture.try_expected_goals()?;
        debug!(
            "simulating {} v {} ({}): expected goals {:.3}-{:.3}",
            fixture.home.display_name(),
            fixture.away.display_name(),
            fixture.venue,
            expected_goals.home,
            expected_goals.away
        );
        let tally = self.simulate_lambdas(&expected_goals)?;
        SimulationResult::from_tally(
            fixture.home.display_name(),
            fixture.away.display_name(),
            fixture.venue,
            expected_goals,
            tally,
        )
    }

    /// Simulates directly from a pair of goal rates, returning the raw tally.
    pub fn simulate_lambdas(&self, expected_goals: &ExpectedGoals) -> Result<Tally, SimulationError> {
        self.config.validate()?;
        expected_goals.validate()?;

        let seed = self.config.seed.unwrap_or_else(clock_seed);
        let mut seeder = StdRand::seed(seed);
        let seeds: Vec<_> = (0..self.config.shards).map(|_| seeder.next_u64()).collect();
        let allocations = allocate(self.config.trials, self.config.shards);
        // a deadline beyond the representable range never trips
        let deadline = self
            .timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));
        debug!(
            "running {} trials across {} shards, seed: {seed}",
            self.config.trials, self.config.shards
        );

        let start_time = Instant::now();
        let shard_outcomes: Vec<_> = allocations
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(&trials, &seed)| {
                self.run_shard(expected_goals, trials, StdRand::seed(seed), deadline)
            })
            .collect();

        let mut tally = Tally::default();
        let mut interrupted = false;
        for outcome in &shard_outcomes {
            tally += &outcome.tally;
            interrupted |= outcome.interrupted;
        }
        let elapsed = start_time.elapsed();
        if interrupted {
            debug!(
                "interrupted after {} trials, {:.3}s",
                tally.trials,
                elapsed.as_millis() as f64 / 1_000.
            );
            return Err(SimulationError::Interrupted {
                completed: tally.trials,
            });
        }
        debug!(
            "simulation complete: {} trials took {:.3}s",
            tally.trials,
            elapsed.as_millis() as f64 / 1_000.
        );
        Ok(tally)
    }

    fn run_shard(
        &self,
        expected_goals: &ExpectedGoals,
        trials: u64,
        mut rand: StdRand,
        deadline: Option<Instant>,
    ) -> ShardOutcome {
        let mut tally = Tally::default();
        let mut remaining = trials;
        while remaining > 0 {
            if self.is_interrupted(deadline) {
                return ShardOutcome {
                    tally,
                    interrupted: true,
                };
            }
            let batch = u64::min(remaining, CANCEL_CHECK_INTERVAL);
            for _ in 0..batch {
                tally.record(simulate_one_match(
                    expected_goals.home,
                    expected_goals.away,
                    &mut rand,
                ));
            }
            remaining -= batch;
        }
        ShardOutcome {
            tally,
            interrupted: false,
        }
    }

    fn is_interrupted(&self, deadline: Option<Instant>) -> bool {
        let cancelled = self
            .cancel
            .as_ref()
            .map(|cancel| cancel.load(Ordering::Relaxed))
            .unwrap_or(false);
        cancelled || deadline.map(|deadline| Instant::now() >= deadline).unwrap_or(false)
    }
}

impl Default for MonteCarloEngine {
    fn default() -> Self {
        Self::from(Config::default())
    }
}

impl From<Config> for MonteCarloEngine {
    fn from(config: Config) -> Self {
        Self {
            config,
            cancel: None,
            timeout: None,
        }
    }
}

struct ShardOutcome {
    tally: Tally,
    interrupted: bool,
}

/// Splits `trials` as evenly as possible across `shards`, front-loading the remainder.
fn allocate(trials: u64, shards: usize) -> Vec<u64> {
    let base = trials / shards as u64;
    let remainder = trials % shards as u64;
    (0..shards as u64)
        .map(|shard| if shard < remainder { base + 1 } else { base })
        .collect()
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(u64::MAX)
}
