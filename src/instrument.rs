//! Instrument
//!
//! String counts and diagram sizes for the fretted instruments a chord
//! database covers.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while configuring a converter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An invalid argument was provided to a builder.
    #[error("invalid argument `{arg}`: {msg}")]
    InvalidArgument {
        /// The name of the invalid argument.
        arg: &'static str,
        /// A description of the invalid argument.
        msg: String,
    },

    /// The instrument name is not one of the known presets.
    #[error("unknown instrument `{0}`")]
    UnknownInstrument(String),
}

/// Diagram geometry of one instrument, as found in a database `main` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentInfo {
    /// Instrument name, e.g. `"guitar"`.
    pub name: String,
    /// Number of strings.
    pub strings: usize,
    /// Fret rows shown on a diagram by default.
    pub frets_on_chord: u8,
    /// Number of chords in the database, when recorded.
    #[serde(default)]
    pub number_of_chords: usize,
}

/// Instruments with built-in presets
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Instrument {
    /// Six-string guitar
    Guitar,
    /// Four-string ukulele
    Ukulele,
    /// Mandolin, four courses
    Mandolin,
}

impl Instrument {
    /// Number of strings (courses for the mandolin).
    pub const fn num_strings(self) -> usize {
        match self {
            Instrument::Guitar => 6,
            Instrument::Ukulele | Instrument::Mandolin => 4,
        }
    }

    /// Fret rows shown on a diagram by default.
    pub const fn default_num_frets(self) -> u8 {
        4
    }

    /// Lower-case name used as database identifier.
    pub const fn name(self) -> &'static str {
        match self {
            Instrument::Guitar => "guitar",
            Instrument::Ukulele => "ukulele",
            Instrument::Mandolin => "mandolin",
        }
    }

    /// Geometry of the preset, without a chord count.
    pub fn info(self) -> InstrumentInfo {
        InstrumentInfo {
            name: self.name().to_string(),
            strings: self.num_strings(),
            frets_on_chord: self.default_num_frets(),
            number_of_chords: 0,
        }
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guitar" => Ok(Instrument::Guitar),
            "ukulele" => Ok(Instrument::Ukulele),
            "mandolin" => Ok(Instrument::Mandolin),
            _ => Err(ConfigError::UnknownInstrument(s.to_string())),
        }
    }
}
