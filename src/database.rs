//! Chord Database
//!
//! Read-only model of a chords-db instrument file: instrument geometry plus,
//! per musical key, the chord definitions with their alternate positions.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::diagram::Fret;
use crate::instrument::InstrumentInfo;

/// Errors when loading a chord database
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database file could not be read.
    #[error("failed to read chord database: {0}")]
    Io(#[from] std::io::Error),

    /// The content is not a valid chords-db document.
    #[error("invalid chord database: {0}")]
    Json(#[from] serde_json::Error),
}

/// One fingering of a chord, arrays ordered from the lowest string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Fret per string, relative to `base_fret`.
    pub frets: Vec<Fret>,
    /// Finger number per string, `0` for none.
    pub fingers: Vec<u8>,
    /// Relative frets held by a barre.
    #[serde(default)]
    pub barres: Vec<u8>,
    /// Fret represented by the top row of the diagram.
    pub base_fret: u8,
    /// Whether the barre acts as a capo.
    #[serde(default)]
    pub capo: bool,
}

/// A named chord with its alternate positions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChordDefinition {
    /// Musical key, e.g. `"C"` or `"Csharp"`.
    pub key: String,
    /// Chord quality, e.g. `"major"` or `"m9"`.
    pub suffix: String,
    /// Alternate fingerings, the most common first.
    pub positions: Vec<Position>,
}

impl ChordDefinition {
    /// Number of alternate positions available for paging.
    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }
}

/// A chord database for a single instrument.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChordDatabase {
    /// Instrument geometry.
    pub main: InstrumentInfo,
    /// Named tunings, lowest string first.
    #[serde(default)]
    pub tunings: BTreeMap<String, Vec<String>>,
    /// Keys present in `chords`, in display order.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Every suffix used by the database.
    #[serde(default)]
    pub suffixes: Vec<String>,
    /// Definitions grouped by key.
    pub chords: BTreeMap<String, Vec<ChordDefinition>>,
}

impl ChordDatabase {
    /// Parse a database from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, DatabaseError> {
        let db: ChordDatabase = serde_json::from_str(json)?;
        db.log_loaded();
        Ok(db)
    }

    /// Parse a database from a reader yielding JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatabaseError> {
        let db: ChordDatabase = serde_json::from_reader(reader)?;
        db.log_loaded();
        Ok(db)
    }

    /// Load a database from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    fn log_loaded(&self) {
        log::debug!(
            "loaded {} chord definitions for {} ({} strings)",
            self.definitions().count(),
            self.main.name,
            self.main.strings
        );
    }

    /// Instrument geometry.
    pub fn instrument(&self) -> &InstrumentInfo {
        &self.main
    }

    /// Look up a chord by exact key and suffix.
    pub fn find(&self, key: &str, suffix: &str) -> Option<&ChordDefinition> {
        self.chords.get(key)?.iter().find(|chord| chord.suffix == suffix)
    }

    /// Number of positions of a chord, `None` when the chord is unknown.
    pub fn num_positions(&self, key: &str, suffix: &str) -> Option<usize> {
        self.find(key, suffix).map(ChordDefinition::num_positions)
    }

    /// Every definition in the database, grouped by key in key order.
    pub fn definitions(&self) -> impl Iterator<Item = &ChordDefinition> {
        self.chords.values().flatten()
    }
}
