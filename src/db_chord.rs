//! Database Chord Converter
//!
//! Turns one position of a pre-authored chord definition into a diagram.
//! Source arrays run from the lowest string; diagrams number strings from the
//! highest, so the fret array is read in reverse.

use thiserror::Error;

use crate::database::ChordDefinition;
use crate::diagram::{BarreSpan, DbDiagram, Fret, StringFret};

/// The requested position index does not exist on the chord.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("position index {index} out of range for chord with {available} positions")]
pub struct LookupRangeError {
    /// The requested zero-based index.
    pub index: usize,
    /// Number of positions the chord offers.
    pub available: usize,
}

/// Convert the position at `position_index` of `definition` into a diagram.
///
/// Returns `Err(LookupRangeError)` when the index is past the last position;
/// callers are expected to check [`ChordDefinition::num_positions`] first.
pub fn convert_db_position(
    definition: &ChordDefinition,
    position_index: usize,
) -> Result<DbDiagram, LookupRangeError> {
    let position = definition
        .positions
        .get(position_index)
        .ok_or(LookupRangeError {
            index: position_index,
            available: definition.positions.len(),
        })?;

    let frets: Vec<Fret> = position.frets.iter().rev().copied().collect();

    let barres: Vec<BarreSpan> = position
        .barres
        .iter()
        .filter_map(|&fret| {
            let span = barre_span(&frets, fret);
            if span.is_none() {
                log::debug!(
                    "{}{}: barre at fret {fret} matches no string, dropped",
                    definition.key,
                    definition.suffix
                );
            }
            span
        })
        .collect();

    // exclusion is by fret value, not by barre range
    let chord = frets
        .iter()
        .enumerate()
        .filter(|(_, fret)| {
            !barres
                .iter()
                .any(|barre| fret.fretted() == Some(barre.fret))
        })
        .map(|(idx, &fret)| StringFret::new(idx + 1, fret))
        .collect();

    // labels are drawn left to right from the lowest string, the source order
    let tuning = position.fingers.iter().map(|&finger| finger_label(finger)).collect();

    Ok(DbDiagram {
        chord,
        position: position.base_fret,
        barres,
        tuning,
    })
}

/// Span between the first and last string carrying `fret`.
fn barre_span(frets: &[Fret], fret: u8) -> Option<BarreSpan> {
    let target = Fret::Fretted(fret);
    let first = frets.iter().position(|&f| f == target)?;
    let last = frets.iter().rposition(|&f| f == target)?;
    Some(BarreSpan {
        from_string: last + 1,
        to_string: first + 1,
        fret,
    })
}

fn finger_label(finger: u8) -> String {
    if finger > 0 {
        finger.to_string()
    } else {
        String::new()
    }
}
