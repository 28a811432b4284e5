//! Closed-form scoreline probabilities under the independent Poisson model. These are the exact
//! counterparts of the Monte Carlo estimates and are used to cross-check them.

use std::ops::{Index, IndexMut};

use crate::domain::{MatchOutcome, Score};
use crate::error::SimulationError;
use crate::poisson;
use crate::team::TeamProfile;
use crate::xg::{Fixture, Venue};

/// Probability of the match finishing exactly `home_goals`-`away_goals`.
pub fn score_probability(
    home: &TeamProfile,
    away: &TeamProfile,
    home_goals: u16,
    away_goals: u16,
    venue: Venue,
) -> Result<f64, SimulationError> {
    let expected_goals = Fixture::new(home, away, venue).try_expected_goals()?;
    Ok(poisson::univariate(home_goals, expected_goals.home)
        * poisson::univariate(away_goals, expected_goals.away))
}

/// As [score_probability], for goal counts arriving as signed integers (e.g. parsed user input).
/// Counts outside the `u16` range are rejected.
pub fn score_probability_signed(
    home: &TeamProfile,
    away: &TeamProfile,
    home_goals: i64,
    away_goals: i64,
    venue: Venue,
) -> Result<f64, SimulationError> {
    let invalid = || SimulationError::InvalidScore {
        home: home_goals,
        away: away_goals,
    };
    let home_goals = u16::try_from(home_goals).map_err(|_| invalid())?;
    let away_goals = u16::try_from(away_goals).map_err(|_| invalid())?;
    score_probability(home, away, home_goals, away_goals, venue)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbs {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}
impl OutcomeProbs {
    pub fn get(&self, outcome: MatchOutcome) -> f64 {
        match outcome {
            MatchOutcome::HomeWin => self.home_win,
            MatchOutcome::Draw => self.draw,
            MatchOutcome::AwayWin => self.away_win,
        }
    }

    pub fn sum(&self) -> f64 {
        self.home_win + self.draw + self.away_win
    }
}

/// A square grid of exact scoreline probabilities, truncated at `max_goals` for either side.
/// Rows are home goals; columns are away goals.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGrid {
    probs: Vec<f64>,
    dim: usize,
}
impl ScoreGrid {
    pub fn allocate(max_goals: u16) -> Self {
        let dim = max_goals as usize + 1;
        Self {
            probs: vec![0.0; dim * dim],
            dim,
        }
    }

    pub fn from_univariate_poisson(home_rate: f64, away_rate: f64, max_goals: u16) -> Self {
        let mut scoregrid = Self::allocate(max_goals);
        let home_probs: Vec<_> = (0..=max_goals)
            .map(|goals| poisson::univariate(goals, home_rate))
            .collect();
        let away_probs: Vec<_> = (0..=max_goals)
            .map(|goals| poisson::univariate(goals, away_rate))
            .collect();
        for (home_goals, &home_prob) in home_probs.iter().enumerate() {
            for (away_goals, &away_prob) in away_probs.iter().enumerate() {
                scoregrid[(home_goals, away_goals)] = home_prob * away_prob;
            }
        }
        scoregrid
    }

    pub fn from_fixture(fixture: &Fixture, max_goals: u16) -> Result<Self, SimulationError> {
        let expected_goals = fixture.try_expected_goals()?;
        Ok(Self::from_univariate_poisson(
            expected_goals.home,
            expected_goals.away,
            max_goals,
        ))
    }

    pub fn max_goals(&self) -> u16 {
        (self.dim - 1) as u16
    }

    /// Probability of `score`; zero outside the grid.
    pub fn prob(&self, score: &Score) -> f64 {
        let (home, away) = (score.home as usize, score.away as usize);
        if home < self.dim && away < self.dim {
            self[(home, away)]
        } else {
            0.0
        }
    }

    /// Total probability captured by the grid. Approaches 1 as `max_goals` grows.
    pub fn mass(&self) -> f64 {
        self.probs.iter().sum()
    }

    pub fn outcome_probs(&self) -> OutcomeProbs {
        let mut outcome_probs = OutcomeProbs {
            home_win: 0.0,
            draw: 0.0,
            away_win: 0.0,
        };
        for home in 0..self.dim {
            for away in 0..self.dim {
                let prob = self[(home, away)];
                match home.cmp(&away) {
                    std::cmp::Ordering::Greater => outcome_probs.home_win += prob,
                    std::cmp::Ordering::Less => outcome_probs.away_win += prob,
                    std::cmp::Ordering::Equal => outcome_probs.draw += prob,
                }
            }
        }
        outcome_probs
    }

    /// Expected home and away goals implied by the grid.
    pub fn expectations(&self) -> (f64, f64) {
        let (mut home_expectation, mut away_expectation) = (0.0, 0.0);
        for home in 0..self.dim {
            for away in 0..self.dim {
                let prob = self[(home, away)];
                home_expectation += home as f64 * prob;
                away_expectation += away as f64 * prob;
            }
        }
        (home_expectation, away_expectation)
    }

    /// Scorelines in descending order of probability.
    pub fn ranked(&self) -> Vec<(Score, f64)> {
        let mut ranked: Vec<_> = (0..self.dim)
            .flat_map(|home| (0..self.dim).map(move |away| (home, away)))
            .map(|(home, away)| (Score::new(home as u16, away as u16), self[(home, away)]))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl Index<(usize, usize)> for ScoreGrid {
    type Output = f64;

    #[inline]
    fn index(&self, (home, away): (usize, usize)) -> &Self::Output {
        assert!(
            home < self.dim && away < self.dim,
            "score {home}-{away} outside a grid of {} goals",
            self.dim - 1
        );
        &self.probs[home * self.dim + away]
    }
}

impl IndexMut<(usize, usize)> for ScoreGrid {
    #[inline]
    fn index_mut(&mut self, (home, away): (usize, usize)) -> &mut Self::Output {
        assert!(
            home < self.dim && away < self.dim,
            "score {home}-{away} outside a grid of {} goals",
            self.dim - 1
        );
        &mut self.probs[home * self.dim + away]
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;
    use crate::testing::team;

    #[test]
    fn score_probability_neutral() {
        let a = team("A", 1.8, 1.0, 1.0);
        let b = team("B", 1.8, 1.0, 1.0);
        let prob = score_probability(&a, &b, 2, 1, Venue::Neutral).unwrap();
        assert_float_absolute_eq!(0.0797, prob, 1e-4);
        assert_float_relative_eq!(
            poisson::univariate(2, 1.8) * poisson::univariate(1, 1.8),
            prob
        );
    }

    #[test]
    fn score_probability_home_and_away() {
        let a = team("A", 1.8, 1.0, 1.0);
        let b = team("B", 1.8, 1.0, 1.0);
        let prob = score_probability(&a, &b, 0, 0, Venue::HomeAndAway).unwrap();
        assert_float_relative_eq!(f64::exp(-2.592) * f64::exp(-1.25), prob);
    }

    #[test]
    fn score_probability_rejects_invalid_input() {
        let a = team("A", 1.8, 1.0, 1.0);
        let mut b = team("B", 1.8, 1.0, 1.0);
        assert_eq!(
            Err(SimulationError::InvalidScore { home: -1, away: 0 }),
            score_probability_signed(&a, &b, -1, 0, Venue::Neutral)
        );
        assert_eq!(
            Err(SimulationError::InvalidScore { home: 2, away: -3 }),
            score_probability_signed(&a, &b, 2, -3, Venue::Neutral)
        );
        assert_eq!(
            Err(SimulationError::InvalidScore {
                home: 70_000,
                away: 1
            }),
            score_probability_signed(&a, &b, 70_000, 1, Venue::Neutral)
        );
        assert_eq!(
            "goal counts must lie within 0..=65535, got 70000-1",
            score_probability_signed(&a, &b, 70_000, 1, Venue::Neutral)
                .unwrap_err()
                .to_string()
        );
        assert_eq!(
            score_probability(&a, &b, 2, 3, Venue::Neutral),
            score_probability_signed(&a, &b, 2, 3, Venue::Neutral)
        );

        b.stats.defensive_efficiency = 0.0;
        assert!(matches!(
            score_probability(&a, &b, 1, 1, Venue::Neutral),
            Err(SimulationError::InvalidTeam(_))
        ));
    }

    #[test]
    fn grid_matches_pointwise_probability() {
        let a = team("A", 1.6, 1.1, 0.9);
        let b = team("B", 1.3, 0.95, 1.2);
        let fixture = Fixture::new(&a, &b, Venue::HomeAndAway);
        let scoregrid = ScoreGrid::from_fixture(&fixture, 8).unwrap();
        assert_eq!(8, scoregrid.max_goals());
        for home in 0..=8 {
            for away in 0..=8 {
                assert_float_relative_eq!(
                    score_probability(&a, &b, home, away, Venue::HomeAndAway).unwrap(),
                    scoregrid.prob(&Score::new(home, away)),
                    1e-12
                );
            }
        }
        assert_eq!(0.0, scoregrid.prob(&Score::new(9, 0)));
    }

    #[test]
    fn grid_mass_and_outcomes() {
        let scoregrid = ScoreGrid::from_univariate_poisson(1.8, 1.8, 20);
        assert_float_absolute_eq!(1.0, scoregrid.mass(), 1e-9);
        let outcome_probs = scoregrid.outcome_probs();
        assert_float_absolute_eq!(1.0, outcome_probs.sum(), 1e-9);
        assert_float_relative_eq!(outcome_probs.home_win, outcome_probs.away_win, 1e-9);
        assert!(outcome_probs.draw > 0.2 && outcome_probs.draw < 0.3);
        let (home_expectation, away_expectation) = scoregrid.expectations();
        assert_float_relative_eq!(1.8, home_expectation, 1e-6);
        assert_float_relative_eq!(1.8, away_expectation, 1e-6);
    }

    #[test]
    fn grid_ranked() {
        let scoregrid = ScoreGrid::from_univariate_poisson(2.592, 1.25, 10);
        let ranked = scoregrid.ranked();
        assert_eq!(121, ranked.len());
        assert!(ranked.windows(2).all(|pair| pair[0].1 >= pair[1].1));
        assert_eq!(Score::new(2, 1), ranked[0].0);
    }

    #[test]
    #[should_panic = "score 3-0 outside a grid of 2 goals"]
    fn grid_index_out_of_bounds() {
        let scoregrid = ScoreGrid::allocate(2);
        let _ = scoregrid[(3, 0)];
    }
}
