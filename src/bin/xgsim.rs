use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use xgsim::file::load_roster;
use xgsim::mc::{MonteCarloEngine, DEFAULT_TRIALS};
use xgsim::print;
use xgsim::scoregrid::{score_probability, score_probability_signed, ScoreGrid};
use xgsim::team::{Roster, TeamProfile};
use xgsim::xg::{Fixture, Venue};

/// Scores beyond this tally are treated as negligible by the exact grid.
const MAX_GRID_GOALS: u16 = 15;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the team data from
    #[clap(short = 'f', long, default_value = "data/teams.json")]
    file: PathBuf,

    /// name of the home team
    #[clap(long)]
    home: Option<String>,

    /// name of the away team
    #[clap(long)]
    away: Option<String>,

    /// season of the home team (latest if omitted)
    #[clap(long = "home-season")]
    home_season: Option<String>,

    /// season of the away team (latest if omitted)
    #[clap(long = "away-season")]
    away_season: Option<String>,

    /// play at a neutral venue
    #[clap(long)]
    neutral: bool,

    /// number of simulated matches
    #[clap(short = 'n', long, default_value_t = DEFAULT_TRIALS)]
    trials: u64,

    /// number of parallel shards
    #[clap(short = 's', long, default_value_t = 1)]
    shards: usize,

    /// seed for the random number generator
    #[clap(long)]
    seed: Option<u64>,

    /// list the available teams and exit
    #[clap(long)]
    list: bool,

    /// print only the outcome probabilities
    #[clap(long)]
    brief: bool,

    /// exact probability of a specific score, in the form 'home-away'
    #[clap(long)]
    score: Option<String>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if !self.list && (self.home.is_none() || self.away.is_none()) {
            bail!("either --list or both --home and --away must be specified");
        }
        if self.trials == 0 {
            bail!("number of trials must be positive");
        }
        if self.shards == 0 {
            bail!("number of shards must be positive");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let roster = load_roster(&args.file)?;
    if args.list {
        info!(
            "{} teams:\n{}",
            roster.len(),
            Console::default().render(&print::tabulate_roster(&roster))
        );
        if let Some(summary) = roster.summarise() {
            info!(
                "xG summary:\n{}",
                Console::default().render(&print::tabulate_xg_summary(&summary))
            );
        }
        return Ok(());
    }

    let home = resolve_team(&roster, args.home.as_deref(), args.home_season.as_deref())?;
    let away = resolve_team(&roster, args.away.as_deref(), args.away_season.as_deref())?;
    let venue = Venue::from_neutral(args.neutral);
    let fixture = Fixture::new(home, away, venue);

    let mut engine = MonteCarloEngine::default()
        .with_trials(args.trials)
        .with_shards(args.shards);
    if let Some(seed) = args.seed {
        engine = engine.with_seed(seed);
    }
    let result = engine.simulate(&fixture)?;
    let scoregrid = ScoreGrid::from_fixture(&fixture, MAX_GRID_GOALS)?;

    info!(
        "{} v {} ({venue}), {} trials:\n{}",
        result.home_team,
        result.away_team,
        result.trials,
        Console::default().render(&print::tabulate_overview(&result))
    );
    info!(
        "outcomes:\n{}",
        Console::default().render(&print::tabulate_outcomes(&result, &scoregrid))
    );

    if let Some(most_likely) = result.most_likely_score() {
        let exact = score_probability(
            home,
            away,
            most_likely.score.home,
            most_likely.score.away,
            venue,
        )?;
        info!(
            "most likely score: {} (simulated {:.2}%, exact {:.2}%)",
            most_likely.score,
            most_likely.probability * 100.0,
            exact * 100.0
        );
    }

    if !args.brief {
        info!(
            "most common scores:\n{}",
            Console::default().render(&print::tabulate_most_common(&result, &scoregrid))
        );
        info!(
            "goal distribution:\n{}",
            Console::default().render(&print::tabulate_goal_distribution(&result))
        );
    }

    if let Some(score) = &args.score {
        let (home_goals, away_goals) = parse_signed_score(score)?;
        let exact = score_probability_signed(home, away, home_goals, away_goals, venue)?;
        info!(
            "probability of {home_goals}-{away_goals}: {:.4}%",
            exact * 100.0
        );
    }
    Ok(())
}

/// Locates the named team, taking its latest season unless `season` is given.
fn resolve_team<'a>(
    roster: &'a Roster,
    name: Option<&str>,
    season: Option<&str>,
) -> anyhow::Result<&'a TeamProfile> {
    let name = name.ok_or_else(|| anyhow!("team name not specified"))?;
    match season {
        Some(season) => roster
            .find(name, season)
            .with_context(|| format!("no team '{name}' in season '{season}'")),
        None => roster
            .teams()
            .iter()
            .filter(|team| team.name.eq_ignore_ascii_case(name))
            .max_by(|a, b| a.season.cmp(&b.season))
            .with_context(|| format!("no team '{name}'")),
    }
}

/// Splits a `home-away` score, allowing either side to carry a leading minus sign.
fn parse_signed_score(score: &str) -> anyhow::Result<(i64, i64)> {
    let score = score.trim();
    let separator = score
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(index, _)| index)
        .context("score must be in the form 'home-away'")?;
    let (home, away) = (&score[..separator], &score[separator + 1..]);
    Ok((home.trim().parse()?, away.trim().parse()?))
}
