//! Chooser
//!
//! Renderer-side decisions that do not involve drawing: which converter a
//! chord goes through, which alternate position is shown and how the chord
//! name is labelled.

use thiserror::Error;

use crate::database::ChordDefinition;
use crate::db_chord::{convert_db_position, LookupRangeError};
use crate::diagram::Diagram;
use crate::instrument::{ConfigError, InstrumentInfo};
use crate::user_chord::{PatternError, UserChord, UserChordConverter};

/// Errors when building a diagram for a chord
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiagramError {
    /// The user pattern could not be parsed.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The database position does not exist.
    #[error(transparent)]
    Lookup(#[from] LookupRangeError),

    /// The instrument geometry is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Where the fingering of a chord comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChordSource<'a> {
    /// A pattern written by the user.
    UserDefined(&'a UserChord),
    /// A database definition at a zero-based position index.
    Database {
        /// The chord definition.
        definition: &'a ChordDefinition,
        /// Index into `definition.positions`.
        position: usize,
    },
}

/// Build the diagram of a chord for an instrument.
///
/// User patterns take precedence over the database: they are converted with
/// the instrument's string count and default fret rows.
pub fn build_diagram(source: ChordSource<'_>, instrument: &InstrumentInfo) -> Result<Diagram, DiagramError> {
    let diagram = match source {
        ChordSource::UserDefined(chord) => {
            let converter = UserChordConverter::for_instrument(instrument)?;
            Diagram::UserDefined(converter.convert(chord)?)
        }
        ChordSource::Database {
            definition,
            position,
        } => Diagram::Database(convert_db_position(definition, position)?),
    };
    Ok(diagram)
}

/// Paging state over the alternate positions of a database chord.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PositionChooser {
    current: usize,
    count: usize,
}

impl PositionChooser {
    /// Page through `count` positions starting at zero-based `start`.
    pub fn for_positions(count: usize, start: usize) -> Self {
        PositionChooser {
            current: start.min(count.saturating_sub(1)),
            count,
        }
    }

    /// Show a single, explicitly requested 1-based position without paging.
    pub fn pinned(one_based: usize) -> Self {
        PositionChooser {
            current: one_based.saturating_sub(1),
            count: 0,
        }
    }

    /// Zero-based index of the shown position.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of positions to page through; `0` when pinned.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether paging controls should be drawn.
    pub fn shows_controls(&self) -> bool {
        self.count > 0
    }

    /// Whether a later position exists.
    pub fn has_next(&self) -> bool {
        self.current + 1 < self.count
    }

    /// Whether an earlier position exists.
    pub fn has_prev(&self) -> bool {
        self.current > 0 && self.count > 0
    }

    /// Move to the next position. Returns `false` when already at the last one.
    pub fn next_position(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Move to the previous position. Returns `false` when already at the first one.
    pub fn prev_position(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// 1-based label of the shown position.
    pub fn label(&self) -> String {
        (self.current + 1).to_string()
    }

    /// Source for the shown position of `definition`.
    pub fn source<'a>(&self, definition: &'a ChordDefinition) -> ChordSource<'a> {
        ChordSource::Database {
            definition,
            position: self.current,
        }
    }
}

/// Chord symbol as displayed above a diagram.
///
/// Drops everything from the first `.` and then from the first `@`, so
/// `"Am@2"` and `"C.x32010"` show as `"Am"` and `"C"`.
pub fn display_name(symbol: &str) -> &str {
    let name = symbol.split('.').next().unwrap_or(symbol);
    name.split('@').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Position;
    use crate::diagram::{Fret, FretboardDiagram};
    use crate::instrument::Instrument;

    fn two_positions() -> ChordDefinition {
        let position = |base_fret| Position {
            frets: vec![Fret::Fretted(0); 4],
            fingers: vec![0; 4],
            barres: Vec::new(),
            base_fret,
            capo: false,
        };
        ChordDefinition {
            key: "C".to_string(),
            suffix: "major".to_string(),
            positions: vec![position(1), position(5)],
        }
    }

    #[test]
    fn user_pattern_uses_instrument_geometry() {
        let chord = UserChord::new("0003", 0);
        let diagram = build_diagram(ChordSource::UserDefined(&chord), &Instrument::Ukulele.info()).unwrap();
        assert_eq!(diagram.tuning().len(), 4);
        assert_eq!(diagram.num_frets(), Some(4));
        assert_eq!(diagram.display_position(), 1);
    }

    #[test]
    fn database_chord_at_chosen_position() {
        let definition = two_positions();
        let mut chooser = PositionChooser::for_positions(definition.num_positions(), 0);
        assert!(chooser.next_position());

        let diagram = build_diagram(chooser.source(&definition), &Instrument::Ukulele.info()).unwrap();
        assert_eq!(diagram.position(), 5);
        assert_eq!(diagram.num_frets(), None);
    }

    #[test]
    fn errors_propagate() {
        let definition = two_positions();
        let source = ChordSource::Database {
            definition: &definition,
            position: 2,
        };
        assert_eq!(
            build_diagram(source, &Instrument::Guitar.info()),
            Err(DiagramError::Lookup(LookupRangeError { index: 2, available: 2 }))
        );

        let chord = UserChord::new("3?", 0);
        assert!(matches!(
            build_diagram(ChordSource::UserDefined(&chord), &Instrument::Guitar.info()),
            Err(DiagramError::Pattern(PatternError::InvalidSymbol { .. }))
        ));

        let mut broken = Instrument::Guitar.info();
        broken.strings = 0;
        assert!(matches!(
            build_diagram(ChordSource::UserDefined(&chord), &broken),
            Err(DiagramError::Config(_))
        ));
    }

    #[test]
    fn chooser_stops_at_both_ends() {
        let mut chooser = PositionChooser::for_positions(3, 0);
        assert!(chooser.shows_controls());
        assert!(!chooser.has_prev());
        assert!(!chooser.prev_position());
        assert!(chooser.next_position());
        assert!(chooser.next_position());
        assert!(!chooser.has_next());
        assert!(!chooser.next_position());
        assert_eq!(chooser.current(), 2);
        assert_eq!(chooser.label(), "3");
        assert!(chooser.prev_position());
        assert_eq!(chooser.current(), 1);
    }

    #[test]
    fn start_is_clamped_into_range() {
        let chooser = PositionChooser::for_positions(2, 9);
        assert_eq!(chooser.current(), 1);
        assert_eq!(PositionChooser::for_positions(0, 3).current(), 0);
    }

    #[test]
    fn pinned_position_disables_paging() {
        let mut chooser = PositionChooser::pinned(3);
        assert_eq!(chooser.current(), 2);
        assert_eq!(chooser.count(), 0);
        assert!(!chooser.shows_controls());
        assert!(!chooser.next_position());
        assert!(!chooser.prev_position());
        assert_eq!(chooser.label(), "3");
    }

    #[test]
    fn display_name_strips_suffixes() {
        assert_eq!(display_name("Am"), "Am");
        assert_eq!(display_name("Am@2"), "Am");
        assert_eq!(display_name("C.x32010"), "C");
        assert_eq!(display_name("G7.320001@3"), "G7");
        assert_eq!(display_name(""), "");
    }
}
