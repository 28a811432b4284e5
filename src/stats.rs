//! Aggregation of simulated matches: the running [Tally] kept while trials are being played, and
//! the immutable [SimulationResult] derived from it.

use std::ops::AddAssign;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::domain::{MatchOutcome, Score, Side};
use crate::error::SimulationError;
use crate::xg::{ExpectedGoals, Venue};

/// Number of scorelines retained in [SimulationResult::most_common_scores].
pub const MOST_COMMON_SCORES: usize = 10;

/// Occurrence counts of individual goal tallies for one side, indexed by the number of goals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoalDistribution {
    counts: Vec<u64>,
}
impl GoalDistribution {
    #[inline]
    pub fn record(&mut self, goals: u16) {
        let index = goals as usize;
        if index >= self.counts.len() {
            self.counts.resize(index + 1, 0);
        }
        self.counts[index] += 1;
    }

    pub fn count(&self, goals: u16) -> u64 {
        self.counts.get(goals as usize).copied().unwrap_or(0)
    }

    /// Highest goal tally observed, if any.
    pub fn max_goals(&self) -> Option<u16> {
        self.counts
            .iter()
            .rposition(|&count| count > 0)
            .map(|index| index as u16)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Nonzero `(goals, count)` pairs in ascending order of goals.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(goals, &count)| (goals as u16, count))
    }

    /// Relative frequencies for goal tallies `0..=max_goals`.
    pub fn probabilities(&self, max_goals: u16, trials: u64) -> Vec<f64> {
        (0..=max_goals)
            .map(|goals| self.count(goals) as f64 / trials as f64)
            .collect()
    }
}

impl AddAssign<&GoalDistribution> for GoalDistribution {
    fn add_assign(&mut self, rhs: &GoalDistribution) {
        if rhs.counts.len() > self.counts.len() {
            self.counts.resize(rhs.counts.len(), 0);
        }
        for (count, &other) in self.counts.iter_mut().zip(rhs.counts.iter()) {
            *count += other;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreCount {
    pub score: Score,
    pub count: u64,
}

/// Scoreline occurrence counts, kept in the order each scoreline was first encountered.
#[derive(Debug, Clone, Default)]
pub struct ScoreFrequencies {
    score_to_index: FxHashMap<Score, usize>,
    counts: Vec<ScoreCount>,
}
impl ScoreFrequencies {
    #[inline]
    pub fn record(&mut self, score: Score) {
        self.add(score, 1);
    }

    fn add(&mut self, score: Score, count: u64) {
        match self.score_to_index.get(&score) {
            Some(&index) => self.counts[index].count += count,
            None => {
                self.score_to_index.insert(score, self.counts.len());
                self.counts.push(ScoreCount { score, count });
            }
        }
    }

    pub fn count(&self, score: &Score) -> u64 {
        self.score_to_index
            .get(score)
            .map(|&index| self.counts[index].count)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| entry.count).sum()
    }

    /// All counts in first-encountered order.
    pub fn items(&self) -> &[ScoreCount] {
        &self.counts
    }

    /// Counts keyed by the `"{home}-{away}"` string form of the score.
    pub fn to_string_map(&self) -> FxHashMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.score.to_string(), entry.count))
            .collect()
    }

    /// Up to `limit` entries ordered by count, descending. Equal counts keep their
    /// first-encountered order.
    pub fn most_common(&self, limit: usize) -> Vec<ScoreCount> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted.truncate(limit);
        sorted
    }
}

impl PartialEq for ScoreFrequencies {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl AddAssign<&ScoreFrequencies> for ScoreFrequencies {
    fn add_assign(&mut self, rhs: &ScoreFrequencies) {
        for entry in &rhs.counts {
            self.add(entry.score, entry.count);
        }
    }
}

/// Running counters accumulated over a batch of trials. Tallies from independent shards are
/// merged with `+=`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub trials: u64,
    pub home_wins: u64,
    pub away_wins: u64,
    pub draws: u64,
    pub home_goals: u64,
    pub away_goals: u64,
    pub scores: ScoreFrequencies,
    pub home_goal_counts: GoalDistribution,
    pub away_goal_counts: GoalDistribution,
}
impl Tally {
    #[inline]
    pub fn record(&mut self, score: Score) {
        self.trials += 1;
        match score.outcome() {
            MatchOutcome::HomeWin => self.home_wins += 1,
            MatchOutcome::AwayWin => self.away_wins += 1,
            MatchOutcome::Draw => self.draws += 1,
        }
        self.home_goals += score.home as u64;
        self.away_goals += score.away as u64;
        self.scores.record(score);
        self.home_goal_counts.record(score.home);
        self.away_goal_counts.record(score.away);
    }

    pub fn outcome_count(&self, outcome: MatchOutcome) -> u64 {
        match outcome {
            MatchOutcome::HomeWin => self.home_wins,
            MatchOutcome::Draw => self.draws,
            MatchOutcome::AwayWin => self.away_wins,
        }
    }
}

impl AddAssign<&Tally> for Tally {
    fn add_assign(&mut self, rhs: &Tally) {
        self.trials += rhs.trials;
        self.home_wins += rhs.home_wins;
        self.away_wins += rhs.away_wins;
        self.draws += rhs.draws;
        self.home_goals += rhs.home_goals;
        self.away_goals += rhs.away_goals;
        self.scores += &rhs.scores;
        self.home_goal_counts += &rhs.home_goal_counts;
        self.away_goal_counts += &rhs.away_goal_counts;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbableScore {
    pub score: Score,
    pub count: u64,
    pub probability: f64,
}

/// The outcome of a Monte Carlo run. Counts are exact; averages and probabilities are derived from
/// them over [SimulationResult::trials].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub home_team: String,
    pub away_team: String,
    pub venue: Venue,
    pub expected_goals: ExpectedGoals,
    pub trials: u64,
    pub home_wins: u64,
    pub away_wins: u64,
    pub draws: u64,
    pub home_goals: u64,
    pub away_goals: u64,
    pub avg_home_goals: f64,
    pub avg_away_goals: f64,
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
    pub scores: ScoreFrequencies,
    pub home_goal_counts: GoalDistribution,
    pub away_goal_counts: GoalDistribution,
    pub most_common_scores: Vec<ProbableScore>,
}
impl SimulationResult {
    /// Derives the result from a completed tally, which must cover at least one trial.
    pub fn from_tally(
        home_team: String,
        away_team: String,
        venue: Venue,
        expected_goals: ExpectedGoals,
        tally: Tally,
    ) -> Result<Self, SimulationError> {
        if tally.trials == 0 {
            return Err(SimulationError::InvalidTrials(0));
        }
        let trials = tally.trials as f64;
        let most_common_scores = tally
            .scores
            .most_common(MOST_COMMON_SCORES)
            .into_iter()
            .map(|entry| ProbableScore {
                score: entry.score,
                count: entry.count,
                probability: entry.count as f64 / trials,
            })
            .collect();
        Ok(Self {
            home_team,
            away_team,
            venue,
            expected_goals,
            trials: tally.trials,
            home_wins: tally.home_wins,
            away_wins: tally.away_wins,
            draws: tally.draws,
            home_goals: tally.home_goals,
            away_goals: tally.away_goals,
            avg_home_goals: tally.home_goals as f64 / trials,
            avg_away_goals: tally.away_goals as f64 / trials,
            home_win_prob: tally.home_wins as f64 / trials,
            draw_prob: tally.draws as f64 / trials,
            away_win_prob: tally.away_wins as f64 / trials,
            scores: tally.scores,
            home_goal_counts: tally.home_goal_counts,
            away_goal_counts: tally.away_goal_counts,
            most_common_scores,
        })
    }

    pub fn outcome_prob(&self, outcome: MatchOutcome) -> f64 {
        match outcome {
            MatchOutcome::HomeWin => self.home_win_prob,
            MatchOutcome::Draw => self.draw_prob,
            MatchOutcome::AwayWin => self.away_win_prob,
        }
    }

    pub fn score_prob(&self, score: &Score) -> f64 {
        self.scores.count(score) as f64 / self.trials as f64
    }

    pub fn goal_counts(&self, side: Side) -> &GoalDistribution {
        match side {
            Side::Home => &self.home_goal_counts,
            Side::Away => &self.away_goal_counts,
        }
    }

    pub fn avg_goals(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.avg_home_goals,
            Side::Away => self.avg_away_goals,
        }
    }

    pub fn most_likely_score(&self) -> Option<&ProbableScore> {
        self.most_common_scores.first()
    }
}
