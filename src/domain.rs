//! Core vocabulary shared by the simulator and the exact model: sides, scores and match outcomes.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use strum_macros::{EnumCount, EnumIter};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub home: u16,
    pub away: u16,
}
impl Score {
    pub fn new(home: u16, away: u16) -> Self {
        Self { home, away }
    }

    pub fn nil_all() -> Self {
        Self { home: 0, away: 0 }
    }

    pub fn total(&self) -> u32 {
        self.home as u32 + self.away as u32
    }

    #[inline(always)]
    pub fn outcome(&self) -> MatchOutcome {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => MatchOutcome::HomeWin,
            std::cmp::Ordering::Less => MatchOutcome::AwayWin,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

impl FromStr for Score {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (home, away) = s
            .split_once('-')
            .context("score must be in the form 'home-away'")?;
        let (home, away) = (home.trim(), away.trim());
        if home.is_empty() || away.is_empty() {
            bail!("score must be in the form 'home-away'");
        }
        Ok(Self {
            home: home.parse()?,
            away: away.parse()?,
        })
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EnumCount, EnumIter, Serialize, Deserialize)]
pub enum MatchOutcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Display for MatchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchOutcome::HomeWin => write!(f, "Home Win"),
            MatchOutcome::Draw => write!(f, "Draw"),
            MatchOutcome::AwayWin => write!(f, "Away Win"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn outcome() {
        assert_eq!(MatchOutcome::HomeWin, Score::new(2, 1).outcome());
        assert_eq!(MatchOutcome::AwayWin, Score::new(0, 3).outcome());
        assert_eq!(MatchOutcome::Draw, Score::new(1, 1).outcome());
        assert_eq!(MatchOutcome::Draw, Score::nil_all().outcome());
    }

    #[test]
    fn outcomes_enumerated() {
        assert_eq!(3, MatchOutcome::COUNT);
        assert_eq!(
            vec![MatchOutcome::HomeWin, MatchOutcome::Draw, MatchOutcome::AwayWin],
            MatchOutcome::iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn score_display() {
        assert_eq!("2-1", format!("{}", Score::new(2, 1)));
        assert_eq!("0-0", Score::nil_all().to_string());
        assert_eq!(7, Score::new(3, 4).total());
    }

    #[test]
    fn score_from_str() {
        assert_eq!(Score::new(2, 1), Score::from_str("2-1").unwrap());
        assert_eq!(Score::new(10, 0), Score::from_str(" 10 - 0 ").unwrap());

        assert_eq!(
            "score must be in the form 'home-away'",
            Score::from_str("21").err().unwrap().to_string()
        );
        assert_eq!(
            "score must be in the form 'home-away'",
            Score::from_str("2-").err().unwrap().to_string()
        );
        assert_eq!(
            "invalid digit found in string",
            Score::from_str("x-1").err().unwrap().to_string()
        );
    }
}
