//! Derivation of per-match expected goals (λ) from season-level xG statistics.
//!
//! The home advantage is applied twice for a non-neutral fixture: once to the attacking side's xG
//! and once, in the opposite sense, to the defending side's efficiency. For two identical teams this
//! compounds into a ~2.07× home/away swing rather than 1.2× or 1.44×. The arithmetic below keeps
//! that behaviour exactly, including the order of operations.

use serde::{Deserialize, Serialize};

use crate::domain::Side;
use crate::error::SimulationError;
use crate::team::TeamProfile;

/// Multiplier applied to the home side's attack and defence at a non-neutral venue.
pub const HOME_ADVANTAGE: f64 = 1.2;

/// Upper bound on a side's expected goals. Simulated goal tallies are `u16`, so means must stay far
/// below the point where draws would saturate.
pub const MAX_EXPECTED_GOALS: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Venue {
    #[default]
    HomeAndAway,
    Neutral,
}
impl Venue {
    pub fn from_neutral(neutral: bool) -> Self {
        if neutral {
            Venue::Neutral
        } else {
            Venue::HomeAndAway
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Venue::Neutral)
    }

    /// The factor applied to the home side: 1.0 at a neutral venue.
    pub fn home_advantage_factor(&self) -> f64 {
        match self {
            Venue::HomeAndAway => HOME_ADVANTAGE,
            Venue::Neutral => 1.0,
        }
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Venue::HomeAndAway => write!(f, "Home/Away"),
            Venue::Neutral => write!(f, "Neutral Venue"),
        }
    }
}

/// Expected goals for `team` when facing `opponent`.
///
/// Assumes validated profiles; a zero `opponent.stats.defensive_efficiency` yields a non-finite
/// result, which [ExpectedGoals::validate] rejects.
pub fn expected_goals(team: &TeamProfile, opponent: &TeamProfile, is_home: bool, venue: Venue) -> f64 {
    let mut base_xg = team.stats.avg_xg_for;
    if !venue.is_neutral() {
        if is_home {
            base_xg *= HOME_ADVANTAGE;
        } else {
            base_xg /= HOME_ADVANTAGE;
        }
    }

    let xg_with_efficiency = base_xg * team.stats.xg_efficiency;

    let mut opponent_defensive_factor = opponent.stats.defensive_efficiency;
    if !venue.is_neutral() {
        if is_home {
            // away defence weakened
            opponent_defensive_factor /= HOME_ADVANTAGE;
        } else {
            // home defence strengthened
            opponent_defensive_factor *= HOME_ADVANTAGE;
        }
    }

    xg_with_efficiency / opponent_defensive_factor
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}
impl ExpectedGoals {
    pub fn new(home: f64, away: f64) -> Self {
        Self { home, away }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        validate_lambda(Side::Home, self.home)?;
        validate_lambda(Side::Away, self.away)?;
        Ok(())
    }

    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }
}

fn validate_lambda(side: Side, lambda: f64) -> Result<(), SimulationError> {
    if (0.0..=MAX_EXPECTED_GOALS).contains(&lambda) {
        Ok(())
    } else {
        Err(SimulationError::InvalidLambda { side, lambda })
    }
}

/// A match context: who plays at home, who travels and whether the venue is neutral.
#[derive(Clone, Copy, Debug)]
pub struct Fixture<'a> {
    pub home: &'a TeamProfile,
    pub away: &'a TeamProfile,
    pub venue: Venue,
}
impl<'a> Fixture<'a> {
    pub fn new(home: &'a TeamProfile, away: &'a TeamProfile, venue: Venue) -> Self {
        Self { home, away, venue }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        self.home.stats.validate()?;
        self.away.stats.validate()?;
        Ok(())
    }

    /// Both sides' expected goals, computed from a single home-advantage factor.
    pub fn expected_goals(&self) -> ExpectedGoals {
        let factor = self.venue.home_advantage_factor();
        let neutral = self.venue.is_neutral();

        let home_xg_with_efficiency = self.home.stats.avg_xg_for * factor * self.home.stats.xg_efficiency;
        let mut away_defensive_factor = self.away.stats.defensive_efficiency;
        if !neutral {
            away_defensive_factor *= 1.0 / factor;
        }
        let home = home_xg_with_efficiency / away_defensive_factor;

        let mut away_xg = self.away.stats.avg_xg_for;
        if !neutral {
            away_xg /= factor;
        }
        let away_xg_with_efficiency = away_xg * self.away.stats.xg_efficiency;
        let mut home_defensive_factor = self.home.stats.defensive_efficiency;
        if !neutral {
            home_defensive_factor *= factor;
        }
        let away = away_xg_with_efficiency / home_defensive_factor;

        ExpectedGoals { home, away }
    }

    /// Validates the fixture and derives λ for both sides, rejecting non-finite rates.
    pub fn try_expected_goals(&self) -> Result<ExpectedGoals, SimulationError> {
        self.validate()?;
        let expected_goals = self.expected_goals();
        expected_goals.validate()?;
        Ok(expected_goals)
    }
}
