//! Team profiles: season-level xG statistics plus optional descriptive metadata, and a [Roster]
//! for looking teams up once they have been loaded.
//!
//! A [TeamProfile] can only be obtained through validation, either via [TeamProfile::new] or by
//! deserializing a [TeamRecord]. The fields remain public for reading; the simulator re-checks
//! [TeamStats::validate] on entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::InvalidTeam;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamStats {
    /// Average expected goals created per match.
    pub avg_xg_for: f64,

    /// Average expected goals conceded per match. Descriptive only.
    pub avg_xg_against: f64,

    /// Actual goals scored over xG created. Above 1 for over-performing attacks.
    pub xg_efficiency: f64,

    /// Divides the opponent's scoring rate; a higher value is a stronger defence.
    pub defensive_efficiency: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches_played: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draws: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub losses: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals_for: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals_against: Option<u32>,

    /// Average possession, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possession: Option<f64>,
}
impl TeamStats {
    pub fn new(avg_xg_for: f64, xg_efficiency: f64, defensive_efficiency: f64) -> Self {
        Self {
            avg_xg_for,
            xg_efficiency,
            defensive_efficiency,
            ..Self::default()
        }
    }

    pub fn with_avg_xg_against(mut self, avg_xg_against: f64) -> Self {
        self.avg_xg_against = avg_xg_against;
        self
    }

    pub fn with_record(mut self, wins: u32, draws: u32, losses: u32) -> Self {
        self.wins = Some(wins);
        self.draws = Some(draws);
        self.losses = Some(losses);
        self.matches_played = Some(wins + draws + losses);
        self
    }

    pub fn with_goals(mut self, goals_for: u32, goals_against: u32) -> Self {
        self.goals_for = Some(goals_for);
        self.goals_against = Some(goals_against);
        self
    }

    pub fn validate(&self) -> Result<(), InvalidTeam> {
        non_negative("avg_xg_for", self.avg_xg_for)?;
        non_negative("avg_xg_against", self.avg_xg_against)?;
        positive("xg_efficiency", self.xg_efficiency)?;
        positive("defensive_efficiency", self.defensive_efficiency)?;
        if let Some(possession) = self.possession {
            non_negative("possession", possession)?;
        }
        Ok(())
    }

    pub fn avg_goals_for(&self) -> Option<f64> {
        per_match(self.goals_for, self.matches_played)
    }

    pub fn avg_goals_against(&self) -> Option<f64> {
        per_match(self.goals_against, self.matches_played)
    }

    /// The season record in `{W}W-{D}D-{L}L` form, if known.
    pub fn record(&self) -> Option<String> {
        match (self.wins, self.draws, self.losses) {
            (Some(wins), Some(draws), Some(losses)) => Some(format!("{wins}W-{draws}D-{losses}L")),
            _ => None,
        }
    }
}

fn per_match(total: Option<u32>, matches_played: Option<u32>) -> Option<f64> {
    match (total, matches_played) {
        (Some(total), Some(matches_played)) if matches_played > 0 => {
            Some(total as f64 / matches_played as f64)
        }
        _ => None,
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), InvalidTeam> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidTeam::NotFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), InvalidTeam> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(InvalidTeam::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), InvalidTeam> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(InvalidTeam::NotPositive { field, value });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notable_players: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The unvalidated wire form of a team, as it appears in a teams file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    pub season: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    pub stats: TeamStats,
    #[serde(flatten)]
    pub metadata: TeamMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TeamRecord", into = "TeamRecord")]
pub struct TeamProfile {
    pub name: String,
    pub season: String,
    pub league: Option<String>,
    pub stats: TeamStats,
    pub metadata: TeamMetadata,
}
impl TeamProfile {
    pub fn new(
        name: impl Into<String>,
        season: impl Into<String>,
        stats: TeamStats,
    ) -> Result<Self, InvalidTeam> {
        Self::try_from(TeamRecord {
            name: name.into(),
            season: season.into(),
            league: None,
            stats,
            metadata: TeamMetadata::default(),
        })
    }

    pub fn with_league(mut self, league: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self
    }

    pub fn with_metadata(mut self, metadata: TeamMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.season)
    }
}

impl TryFrom<TeamRecord> for TeamProfile {
    type Error = InvalidTeam;

    fn try_from(record: TeamRecord) -> Result<Self, Self::Error> {
        if record.name.trim().is_empty() {
            return Err(InvalidTeam::EmptyName);
        }
        record.stats.validate()?;
        Ok(Self {
            name: record.name,
            season: record.season,
            league: record.league,
            stats: record.stats,
            metadata: record.metadata,
        })
    }
}

impl From<TeamProfile> for TeamRecord {
    fn from(profile: TeamProfile) -> Self {
        Self {
            name: profile.name,
            season: profile.season,
            league: profile.league,
            stats: profile.stats,
            metadata: profile.metadata,
        }
    }
}

/// Top-level layout of a teams file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamsFile {
    pub teams: Vec<TeamProfile>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roster {
    teams: Vec<TeamProfile>,
}
impl Roster {
    pub fn teams(&self) -> &[TeamProfile] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Locates a team by name (case-insensitive) and season (exact).
    pub fn find(&self, name: &str, season: &str) -> Option<&TeamProfile> {
        self.teams
            .iter()
            .find(|team| team.name.eq_ignore_ascii_case(name) && team.season == season)
    }

    pub fn by_league<'a>(&'a self, league: &'a str) -> impl Iterator<Item = &'a TeamProfile> + 'a {
        self.teams.iter().filter(move |team| {
            team.league
                .as_deref()
                .map(|team_league| team_league.eq_ignore_ascii_case(league))
                .unwrap_or(false)
        })
    }

    pub fn by_season<'a>(&'a self, season: &'a str) -> impl Iterator<Item = &'a TeamProfile> + 'a {
        self.teams.iter().filter(move |team| team.season == season)
    }

    /// Teams grouped by name in alphabetical order, each group sorted newest season first.
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&TeamProfile>> {
        let mut groups: BTreeMap<&str, Vec<&TeamProfile>> = BTreeMap::new();
        for team in &self.teams {
            groups.entry(team.name.as_str()).or_default().push(team);
        }
        for seasons in groups.values_mut() {
            seasons.sort_by(|a, b| b.season.cmp(&a.season));
        }
        groups
    }

    /// Averages the xG statistics across all teams. `None` if the roster is empty.
    pub fn summarise(&self) -> Option<XgSummary> {
        if self.teams.is_empty() {
            return None;
        }
        let mean = |f: fn(&TeamStats) -> f64| {
            self.teams.iter().map(|team| f(&team.stats)).sum::<f64>() / self.teams.len() as f64
        };

        let (xg, goals): (Vec<_>, Vec<_>) = self
            .teams
            .iter()
            .filter_map(|team| {
                team.stats
                    .avg_goals_for()
                    .map(|goals| (team.stats.avg_xg_for, goals))
            })
            .unzip();

        Some(XgSummary {
            avg_xg_for: mean(|stats| stats.avg_xg_for),
            avg_xg_against: mean(|stats| stats.avg_xg_against),
            avg_xg_efficiency: mean(|stats| stats.xg_efficiency),
            avg_defensive_efficiency: mean(|stats| stats.defensive_efficiency),
            xg_goals_correlation: correlation(&xg, &goals),
        })
    }
}

impl From<Vec<TeamProfile>> for Roster {
    fn from(teams: Vec<TeamProfile>) -> Self {
        Self { teams }
    }
}

impl From<TeamsFile> for Roster {
    fn from(file: TeamsFile) -> Self {
        Self::from(file.teams)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct XgSummary {
    pub avg_xg_for: f64,
    pub avg_xg_against: f64,
    pub avg_xg_efficiency: f64,
    pub avg_defensive_efficiency: f64,

    /// Pearson correlation between xG created and actual goals scored per match, taken over the
    /// teams whose goal record is known. `None` when undefined.
    pub xg_goals_correlation: Option<f64>,
}

fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;

    fn team(name: &str, season: &str, league: &str, stats: TeamStats) -> TeamProfile {
        TeamProfile::new(name, season, stats)
            .unwrap()
            .with_league(league)
    }

    fn sample_roster() -> Roster {
        Roster::from(vec![
            team(
                "Manchester United",
                "2024-2025",
                "Premier League",
                TeamStats::new(1.4, 0.9, 1.0)
                    .with_avg_xg_against(1.5)
                    .with_record(10, 8, 20)
                    .with_goals(44, 54),
            ),
            team(
                "Real Madrid",
                "2021-2022",
                "La Liga",
                TeamStats::new(2.1, 1.2, 1.3)
                    .with_avg_xg_against(0.9)
                    .with_record(26, 8, 4)
                    .with_goals(80, 31),
            ),
            team(
                "Manchester United",
                "2022-2023",
                "Premier League",
                TeamStats::new(1.8, 1.0, 1.1)
                    .with_avg_xg_against(1.2)
                    .with_record(23, 6, 9)
                    .with_goals(58, 43),
            ),
        ])
    }

    #[test]
    fn validation() {
        assert!(TeamStats::new(1.8, 1.0, 1.0).validate().is_ok());
        assert!(TeamStats::new(0.0, 1.0, 1.0).validate().is_ok());
        assert_eq!(
            Err(InvalidTeam::NotPositive {
                field: "defensive_efficiency",
                value: 0.0
            }),
            TeamStats::new(1.8, 1.0, 0.0).validate()
        );
        assert_eq!(
            Err(InvalidTeam::NotPositive {
                field: "xg_efficiency",
                value: -0.5
            }),
            TeamStats::new(1.8, -0.5, 1.0).validate()
        );
        assert_eq!(
            Err(InvalidTeam::Negative {
                field: "avg_xg_for",
                value: -1.0
            }),
            TeamStats::new(-1.0, 1.0, 1.0).validate()
        );
        assert!(matches!(
            TeamStats::new(f64::INFINITY, 1.0, 1.0).validate(),
            Err(InvalidTeam::NotFinite {
                field: "avg_xg_for",
                ..
            })
        ));
        assert_eq!(
            Err(InvalidTeam::EmptyName),
            TeamProfile::new(" ", "2024-2025", TeamStats::new(1.0, 1.0, 1.0))
        );
    }

    #[test]
    fn derived_stats() {
        let stats = TeamStats::new(1.8, 1.0, 1.1)
            .with_record(23, 6, 9)
            .with_goals(57, 38);
        assert_eq!(Some(38), stats.matches_played);
        assert_float_relative_eq!(1.5, stats.avg_goals_for().unwrap());
        assert_float_relative_eq!(1.0, stats.avg_goals_against().unwrap());
        assert_eq!(Some("23W-6D-9L".to_string()), stats.record());

        let stats = TeamStats::new(1.8, 1.0, 1.1);
        assert_eq!(None, stats.avg_goals_for());
        assert_eq!(None, stats.record());
    }

    #[test]
    fn display_name() {
        let team = TeamProfile::new("Arsenal", "2023-2024", TeamStats::new(1.9, 1.1, 1.2)).unwrap();
        assert_eq!("Arsenal (2023-2024)", team.display_name());
    }

    #[test]
    fn deserialize_validates() {
        let json = r#"{
            "name": "Arsenal",
            "season": "2023-2024",
            "league": "Premier League",
            "coach": "Mikel Arteta",
            "notable_players": ["Saka", "Ødegaard"],
            "stats": {
                "avg_xg_for": 2.0,
                "avg_xg_against": 0.8,
                "xg_efficiency": 1.1,
                "defensive_efficiency": 1.3,
                "matches_played": 38,
                "goals_for": 91
            }
        }"#;
        let team: TeamProfile = serde_json::from_str(json).unwrap();
        assert_eq!("Arsenal", team.name);
        assert_eq!(Some("Mikel Arteta"), team.metadata.coach.as_deref());
        assert_eq!(2, team.metadata.notable_players.len());
        assert_eq!(Some(38), team.stats.matches_played);
        assert_eq!(None, team.stats.wins);

        let json = r#"{
            "name": "Arsenal",
            "season": "2023-2024",
            "stats": {
                "avg_xg_for": 2.0,
                "avg_xg_against": 0.8,
                "xg_efficiency": 1.1,
                "defensive_efficiency": 0.0
            }
        }"#;
        let err = serde_json::from_str::<TeamProfile>(json).err().unwrap();
        assert!(
            err.to_string()
                .contains("defensive_efficiency must be positive, got 0"),
            "{err}"
        );
    }

    #[test]
    fn find() {
        let roster = sample_roster();
        assert_eq!(3, roster.len());
        assert!(!roster.is_empty());
        let team = roster.find("manchester united", "2022-2023").unwrap();
        assert_float_relative_eq!(1.8, team.stats.avg_xg_for);
        assert!(roster.find("Manchester United", "2020-2021").is_none());
        assert!(roster.find("Liverpool", "2022-2023").is_none());
    }

    #[test]
    fn filters() {
        let roster = sample_roster();
        assert_eq!(2, roster.by_league("premier league").count());
        assert_eq!(1, roster.by_league("La Liga").count());
        assert_eq!(0, roster.by_league("Serie A").count());
        assert_eq!(1, roster.by_season("2021-2022").count());
    }

    #[test]
    fn grouped() {
        let roster = sample_roster();
        let groups = roster.grouped();
        assert_eq!(
            vec!["Manchester United", "Real Madrid"],
            groups.keys().copied().collect::<Vec<_>>()
        );
        let seasons: Vec<_> = groups["Manchester United"]
            .iter()
            .map(|team| team.season.as_str())
            .collect();
        assert_eq!(vec!["2024-2025", "2022-2023"], seasons);
    }

    #[test]
    fn summarise() {
        assert_eq!(None, Roster::default().summarise());

        let summary = sample_roster().summarise().unwrap();
        assert_float_relative_eq!(5.3 / 3.0, summary.avg_xg_for);
        assert_float_relative_eq!(3.6 / 3.0, summary.avg_xg_against);
        assert_float_relative_eq!(3.1 / 3.0, summary.avg_xg_efficiency);
        assert_float_relative_eq!(3.4 / 3.0, summary.avg_defensive_efficiency);
        let correlation = summary.xg_goals_correlation.unwrap();
        assert!(correlation > 0.9 && correlation <= 1.0, "{correlation}");
    }

    #[test]
    fn correlation_edge_cases() {
        assert_eq!(None, correlation(&[1.0], &[2.0]));
        assert_eq!(None, correlation(&[1.0, 1.0], &[2.0, 3.0]));
        assert_float_relative_eq!(1.0, correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap());
        assert_float_relative_eq!(-1.0, correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap());
    }
}
