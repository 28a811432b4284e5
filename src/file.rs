//! Loading of teams files.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::from_reader;
use tracing::debug;

use crate::team::{Roster, TeamsFile};

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, io::Error> {
    let file = File::open(path)?;
    Ok(from_reader(io::BufReader::new(file))?)
}

pub trait FromJsonFile<D> {
    fn from_json_file(path: impl AsRef<Path>) -> Result<D, io::Error>;
}

impl<D: DeserializeOwned> FromJsonFile<D> for D {
    fn from_json_file(path: impl AsRef<Path>) -> Result<D, io::Error> {
        read_json(path)
    }
}

/// Loads and validates every team in the teams file at `path`.
pub fn load_roster(path: impl AsRef<Path>) -> anyhow::Result<Roster> {
    let path = path.as_ref();
    let teams_file = TeamsFile::from_json_file(path)
        .with_context(|| format!("failed to load teams from {}", path.display()))?;
    let roster = Roster::from(teams_file);
    debug!("loaded {} teams from {}", roster.len(), path.display());
    Ok(roster)
}
