//! Diagram
//!
//! The description handed to a fretboard renderer: which fret each string
//! sounds, where barres lie, which fret the top row shows and the label
//! printed under each string.

use std::fmt::Display;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

/// Symbol used for a muted string, both in user patterns and in rendered output.
pub const MUTED_SYMBOL: &str = "x";

/// Fret value on a single string.
///
/// Database files store a muted string as `-1`; rendered output uses `"x"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "i16")]
pub enum Fret {
    /// Pressed at the given fret, `0` being the open string.
    Fretted(u8),
    /// Not sounded.
    Muted,
}

impl Fret {
    /// The fret number, or `None` for a muted string.
    pub const fn fretted(self) -> Option<u8> {
        match self {
            Fret::Fretted(fret) => Some(fret),
            Fret::Muted => None,
        }
    }

    /// `true` when the string is not sounded.
    pub const fn is_muted(self) -> bool {
        matches!(self, Fret::Muted)
    }
}

impl TryFrom<i16> for Fret {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Fret::Muted),
            v => u8::try_from(v)
                .map(Fret::Fretted)
                .map_err(|_| format!("fret value {v} is neither -1 (muted) nor in 0..=255")),
        }
    }
}

impl Serialize for Fret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fret::Fretted(fret) => serializer.serialize_u8(*fret),
            Fret::Muted => serializer.serialize_str(MUTED_SYMBOL),
        }
    }
}

impl Display for Fret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fret::Fretted(fret) => write!(f, "{fret}"),
            Fret::Muted => f.write_str(MUTED_SYMBOL),
        }
    }
}

/// One `[string, fret]` entry of a diagram; serialized as a two-element array.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StringFret {
    /// 1-based string number, string 1 being the highest pitched.
    pub string: usize,
    /// Fret played on that string.
    pub fret: Fret,
}

impl StringFret {
    /// Pair a string number with a fret.
    pub const fn new(string: usize, fret: Fret) -> Self {
        StringFret { string, fret }
    }
}

impl Serialize for StringFret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.string)?;
        tuple.serialize_element(&self.fret)?;
        tuple.end()
    }
}

/// A finger laid flat across a range of strings at one fret.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarreSpan {
    /// String where the barre starts (inclusive).
    pub from_string: usize,
    /// String where the barre ends (inclusive).
    pub to_string: usize,
    /// Fret the barre presses, relative to the diagram position.
    pub fret: u8,
}

/// Read access shared by every diagram kind, as consumed by a renderer.
pub trait FretboardDiagram {
    /// Explicit `[string, fret]` entries. Strings drawn by a barre may be absent.
    fn chord(&self) -> &[StringFret];

    /// Fret shown at the top row of the diagram.
    fn position(&self) -> u8;

    /// Barres in drawing order.
    fn barres(&self) -> &[BarreSpan];

    /// One label per string, lowest string first.
    fn tuning(&self) -> &[String];

    /// Number of fret rows to draw, when the diagram dictates it.
    fn num_frets(&self) -> Option<u8> {
        None
    }

    /// Position suitable for display; the nut position `0` is shown as `1`.
    fn display_position(&self) -> u8 {
        self.position().max(1)
    }
}

/// Diagram derived from a chord database position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbDiagram {
    /// Explicit string/fret entries, excluding strings matched by a barre fret.
    pub chord: Vec<StringFret>,
    /// Base fret of the database position.
    pub position: u8,
    /// Barres recorded on the position.
    pub barres: Vec<BarreSpan>,
    /// Finger numbers, blank for open or muted strings.
    pub tuning: Vec<String>,
}

impl FretboardDiagram for DbDiagram {
    fn chord(&self) -> &[StringFret] {
        &self.chord
    }

    fn position(&self) -> u8 {
        self.position
    }

    fn barres(&self) -> &[BarreSpan] {
        &self.barres
    }

    fn tuning(&self) -> &[String] {
        &self.tuning
    }
}

/// Diagram derived from a user-written fret pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDiagram {
    /// One entry per pattern fret, highest string number first.
    pub chord: Vec<StringFret>,
    /// Requested or computed position; `0` means the nut.
    pub position: u8,
    /// Barres delimited by `_` markers.
    pub barres: Vec<BarreSpan>,
    /// Blank labels, one per string.
    pub tuning: Vec<String>,
    /// Fret rows needed to show every fret of the shape.
    pub num_frets: u8,
}

impl UserDiagram {
    /// Write the diagram back as a separated fret pattern, barre markers included.
    ///
    /// Converting the result at the diagram's `position` yields this diagram again.
    pub fn to_pattern(&self) -> String {
        let mut tokens: Vec<String> = self.chord.iter().map(|entry| entry.fret.to_string()).collect();
        let slot_of = |string: usize| self.chord.iter().position(|entry| entry.string == string);

        // insert from the back so earlier slot indices stay valid
        let mut markers: Vec<usize> = Vec::with_capacity(self.barres.len() * 2);
        for barre in &self.barres {
            if let (Some(open), Some(close)) = (slot_of(barre.from_string), slot_of(barre.to_string)) {
                markers.push(open);
                markers.push(close + 1);
            }
        }
        markers.sort_unstable();
        for &at in markers.iter().rev() {
            tokens.insert(at, "_".to_string());
        }
        tokens.join(" ")
    }
}

impl FretboardDiagram for UserDiagram {
    fn chord(&self) -> &[StringFret] {
        &self.chord
    }

    fn position(&self) -> u8 {
        self.position
    }

    fn barres(&self) -> &[BarreSpan] {
        &self.barres
    }

    fn tuning(&self) -> &[String] {
        &self.tuning
    }

    fn num_frets(&self) -> Option<u8> {
        Some(self.num_frets)
    }
}

/// Either kind of diagram, serialized with the shape of the wrapped value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Diagram {
    /// Built from a chord database position.
    Database(DbDiagram),
    /// Built from a user fret pattern.
    UserDefined(UserDiagram),
}

impl Diagram {
    fn inner(&self) -> &dyn FretboardDiagram {
        match self {
            Diagram::Database(diagram) => diagram,
            Diagram::UserDefined(diagram) => diagram,
        }
    }
}

impl FretboardDiagram for Diagram {
    fn chord(&self) -> &[StringFret] {
        self.inner().chord()
    }

    fn position(&self) -> u8 {
        self.inner().position()
    }

    fn barres(&self) -> &[BarreSpan] {
        self.inner().barres()
    }

    fn tuning(&self) -> &[String] {
        self.inner().tuning()
    }

    fn num_frets(&self) -> Option<u8> {
        self.inner().num_frets()
    }
}

impl From<DbDiagram> for Diagram {
    fn from(diagram: DbDiagram) -> Self {
        Diagram::Database(diagram)
    }
}

impl From<UserDiagram> for Diagram {
    fn from(diagram: UserDiagram) -> Self {
        Diagram::UserDefined(diagram)
    }
}
