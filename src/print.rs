//! Console tables for simulation results and team rosters.

use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};
use strum::IntoEnumIterator;

use crate::domain::{MatchOutcome, Side};
use crate::scoregrid::ScoreGrid;
use crate::stats::SimulationResult;
use crate::team::{Roster, XgSummary};

pub fn tabulate_overview(result: &SimulationResult) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(Left)),
            Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "".into(),
                result.home_team.clone().into(),
                result.away_team.clone().into(),
            ],
        ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Expected goals".into(),
            format!("{:.3}", result.expected_goals.home).into(),
            format!("{:.3}", result.expected_goals.away).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Average goals".into(),
            format!("{:.3}", result.avg_home_goals).into(),
            format!("{:.3}", result.avg_away_goals).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Wins".into(),
            format!("{}", result.home_wins).into(),
            format!("{}", result.away_wins).into(),
        ],
    ));
    table
}

/// Simulated outcome probabilities, alongside their exact counterparts from `scoregrid`.
pub fn tabulate_outcomes(result: &SimulationResult, scoregrid: &ScoreGrid) -> Table {
    let exact = scoregrid.outcome_probs();
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(Left)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Outcome".into(),
                "Count".into(),
                "Simulated".into(),
                "Exact".into(),
            ],
        ));
    for outcome in MatchOutcome::iter() {
        let count = match outcome {
            MatchOutcome::HomeWin => result.home_wins,
            MatchOutcome::Draw => result.draws,
            MatchOutcome::AwayWin => result.away_wins,
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{outcome}").into(),
                format!("{count}").into(),
                format!("{:.2}%", result.outcome_prob(outcome) * 100.0).into(),
                format!("{:.2}%", exact.get(outcome) * 100.0).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_most_common(result: &SimulationResult, scoregrid: &ScoreGrid) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Score".into(),
                "Count".into(),
                "Simulated".into(),
                "Exact".into(),
            ],
        ));
    for probable in &result.most_common_scores {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", probable.score).into(),
                format!("{}", probable.count).into(),
                format!("{:.2}%", probable.probability * 100.0).into(),
                format!("{:.2}%", scoregrid.prob(&probable.score) * 100.0).into(),
            ],
        ));
    }
    table
}

/// Per-side goal counts, from zero up to the highest tally observed on either side.
pub fn tabulate_goal_distribution(result: &SimulationResult) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Goals".into(),
                "Home".into(),
                "".into(),
                "Away".into(),
                "".into(),
            ],
        ));
    let max_goals = [Side::Home, Side::Away]
        .into_iter()
        .filter_map(|side| result.goal_counts(side).max_goals())
        .max()
        .unwrap_or(0);
    for goals in 0..=max_goals {
        let mut row_cells = vec![format!("{goals}").into()];
        for side in [Side::Home, Side::Away] {
            let count = result.goal_counts(side).count(goals);
            row_cells.push(format!("{count}").into());
            row_cells.push(format!("{:.2}%", count as f64 / result.trials as f64 * 100.0).into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

pub fn tabulate_roster(roster: &Roster) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20)).with(Left)),
            Col::new(Styles::default().with(MinWidth(10)).with(Left)),
            Col::new(Styles::default().with(MinWidth(15)).with(Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Team".into(),
                "Season".into(),
                "League".into(),
                "xG for".into(),
                "xG ag.".into(),
                "xG eff.".into(),
                "Def eff.".into(),
                "Record".into(),
            ],
        ));
    for (name, seasons) in roster.grouped() {
        for team in seasons {
            table.push_row(Row::new(
                Styles::default(),
                vec![
                    name.into(),
                    team.season.clone().into(),
                    team.league.clone().unwrap_or_default().into(),
                    format!("{:.2}", team.stats.avg_xg_for).into(),
                    format!("{:.2}", team.stats.avg_xg_against).into(),
                    format!("{:.2}", team.stats.xg_efficiency).into(),
                    format!("{:.2}", team.stats.defensive_efficiency).into(),
                    team.stats.record().unwrap_or_default().into(),
                ],
            ));
        }
    }
    table
}

pub fn tabulate_xg_summary(summary: &XgSummary) -> Table {
    let rows = [
        ("Average xG for", format!("{:.3}", summary.avg_xg_for)),
        ("Average xG against", format!("{:.3}", summary.avg_xg_against)),
        ("Average xG efficiency", format!("{:.3}", summary.avg_xg_efficiency)),
        (
            "Average defensive efficiency",
            format!("{:.3}", summary.avg_defensive_efficiency),
        ),
        (
            "xG/goals correlation",
            summary
                .xg_goals_correlation
                .map(|correlation| format!("{correlation:.3}"))
                .unwrap_or_else(|| "-".into()),
        ),
    ];
    let mut table = Table::default().with_cols(vec![
        Col::new(Styles::default().with(MinWidth(10)).with(Left)),
        Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
    ]);
    for (label, value) in rows {
        table.push_row(Row::new(Styles::default(), vec![label.into(), value.into()]));
    }
    table
}
