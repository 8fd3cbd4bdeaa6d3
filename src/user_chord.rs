//! User Chord Converter
//!
//! Parses free-form fret patterns such as `"x32010"`, `"x 12 14 14 13 x"` or
//! `"_335533_"` into diagrams. Patterns are written from the lowest string;
//! `x` mutes a string and a pair of `_` markers encloses a barre. When no
//! position is requested, shapes that do not fit the default fret window, or
//! that start above the third fret, are redrawn from their lowest fret.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagram::{BarreSpan, Fret, StringFret, UserDiagram};
use crate::instrument::{ConfigError, InstrumentInfo};

/// Fret rows drawn when no instrument says otherwise.
pub const DEFAULT_NUM_FRETS: u8 = 4;

const DEFAULT_NUM_STRINGS: usize = 6;

/// Highest starting fret still drawn from the nut.
const MAX_NUT_FRET: u8 = 3;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+|x|_").expect("token pattern is valid"));

/// Errors when parsing a user fret pattern
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// Nothing in the pattern could be read as a fret or marker.
    #[error("could not parse fret string: {0:?}")]
    Unparseable(String),

    /// A dense pattern contains a character other than a digit, `x` or `_`.
    #[error("unexpected symbol {symbol:?} at position {index} of fret string")]
    InvalidSymbol {
        /// The offending character.
        symbol: char,
        /// Character position within the pattern.
        index: usize,
    },

    /// A fret number is too large to be a fret.
    #[error("fret `{token}` is out of range")]
    FretOutOfRange {
        /// The token as written.
        token: String,
    },

    /// The pattern names more strings than the instrument has.
    #[error("fret string has {got} frets for a {expected}-string instrument")]
    TooManyFrets {
        /// Strings on the instrument.
        expected: usize,
        /// Frets in the pattern.
        got: usize,
    },
}

/// A chord written by the user as a fret pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChord {
    /// Fret pattern, lowest string first.
    pub frets: String,
    /// Fret shown at the top of the diagram; `0` computes it from the shape.
    pub position: u8,
}

impl UserChord {
    /// Create a pattern with a requested position.
    pub fn new(frets: impl Into<String>, position: u8) -> Self {
        UserChord {
            frets: frets.into(),
            position,
        }
    }
}

/// One lexed slot of a pattern
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Slot {
    Fret(u8),
    Muted,
    BarreMarker,
}

impl Slot {
    fn from_token(token: &str) -> Result<Slot, PatternError> {
        match token {
            "x" => Ok(Slot::Muted),
            "_" => Ok(Slot::BarreMarker),
            digits => digits
                .parse::<u8>()
                .map(Slot::Fret)
                .map_err(|_| PatternError::FretOutOfRange {
                    token: digits.to_string(),
                }),
        }
    }

    fn from_char(index: usize, symbol: char) -> Result<Slot, PatternError> {
        match symbol {
            'x' => Ok(Slot::Muted),
            '_' => Ok(Slot::BarreMarker),
            c => c
                .to_digit(10)
                .map(|digit| Slot::Fret(digit as u8))
                .ok_or(PatternError::InvalidSymbol { symbol, index }),
        }
    }

    const fn fret(self) -> Option<Fret> {
        match self {
            Slot::Fret(fret) => Some(Fret::Fretted(fret)),
            Slot::Muted => Some(Fret::Muted),
            Slot::BarreMarker => None,
        }
    }
}

/// Split a pattern into slots.
///
/// Patterns containing whitespace or commas are read as separated tokens and
/// may use multi-digit frets; anything else is one slot per character.
fn lex(pattern: &str) -> Result<Vec<Slot>, PatternError> {
    let separated = pattern.chars().any(|c| c.is_whitespace() || c == ',');
    let slots = if separated {
        TOKEN
            .find_iter(pattern)
            .map(|m| Slot::from_token(m.as_str()))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        pattern
            .chars()
            .enumerate()
            .map(|(index, symbol)| Slot::from_char(index, symbol))
            .collect::<Result<Vec<_>, _>>()?
    };

    if slots.is_empty() {
        return Err(PatternError::Unparseable(pattern.to_string()));
    }
    Ok(slots)
}

/// Barres enclosed by marker pairs. Only two or four markers describe barres.
fn extract_barres(slots: &[Slot], num_strings: usize) -> Vec<BarreSpan> {
    let markers: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| **slot == Slot::BarreMarker)
        .map(|(idx, _)| idx)
        .collect();

    match markers.len() {
        0 => Vec::new(),
        2 | 4 => markers
            .chunks_exact(2)
            .filter_map(|pair| barre_between(slots, &markers, pair[0], pair[1], num_strings))
            .collect(),
        n => {
            log::warn!("ignoring {n} barre markers, expected 2 or 4");
            Vec::new()
        }
    }
}

fn barre_between(
    slots: &[Slot],
    markers: &[usize],
    open: usize,
    close: usize,
    num_strings: usize,
) -> Option<BarreSpan> {
    // the barre fret is the first fret inside the markers
    let fret = match slots.get(open + 1) {
        Some(Slot::Fret(fret)) => *fret,
        other => {
            log::debug!("barre opened at slot {open} is followed by {other:?}, dropped");
            return None;
        }
    };

    // markers before a slot do not count towards its string number
    let string_of = |slot: usize| {
        let preceding = markers.iter().take_while(|&&m| m < slot).count();
        num_strings
            .checked_sub(slot - preceding)
            .filter(|string| (1..=num_strings).contains(string))
    };

    let span = BarreSpan {
        from_string: string_of(open + 1)?,
        to_string: string_of(close - 1)?,
        fret,
    };
    Some(span)
}

/// Shift a fretted value so that `origin` becomes the first row.
const fn shift(fret: u8, origin: u8) -> u8 {
    if fret > 0 {
        fret - origin + 1
    } else {
        fret
    }
}

/// Builder for `UserChordConverter`
pub struct UserChordConverterBuilder {
    num_strings: usize,
    default_num_frets: u8,
}

impl UserChordConverterBuilder {
    /// Create a new builder for a six-string instrument with 4 fret rows
    pub fn new() -> Self {
        UserChordConverterBuilder {
            num_strings: DEFAULT_NUM_STRINGS,
            default_num_frets: DEFAULT_NUM_FRETS,
        }
    }

    /// Set the number of strings of the instrument.
    pub fn num_strings(mut self, value: usize) -> Self {
        self.num_strings = value;
        self
    }

    /// Set the number of fret rows a diagram shows by default.
    pub fn default_num_frets(mut self, value: u8) -> Self {
        self.default_num_frets = value;
        self
    }

    /// Build the `UserChordConverter`
    pub fn build(self) -> Result<UserChordConverter, ConfigError> {
        if self.num_strings == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "num_strings",
                msg: "must be >= 1".to_string(),
            });
        }
        if self.default_num_frets == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "default_num_frets",
                msg: "must be >= 1".to_string(),
            });
        }
        Ok(UserChordConverter {
            num_strings: self.num_strings,
            default_num_frets: self.default_num_frets,
        })
    }
}

impl Default for UserChordConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts user fret patterns for one instrument
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserChordConverter {
    num_strings: usize,
    default_num_frets: u8,
}

impl UserChordConverter {
    /// Return a builder to customize string count and fret rows
    pub fn builder() -> UserChordConverterBuilder {
        UserChordConverterBuilder::new()
    }

    /// Create a converter for a six-string instrument with 4 fret rows
    pub fn new() -> Self {
        UserChordConverter {
            num_strings: DEFAULT_NUM_STRINGS,
            default_num_frets: DEFAULT_NUM_FRETS,
        }
    }

    /// Create a converter matching an instrument's geometry.
    pub fn for_instrument(info: &InstrumentInfo) -> Result<Self, ConfigError> {
        Self::builder()
            .num_strings(info.strings)
            .default_num_frets(info.frets_on_chord)
            .build()
    }

    /// Number of strings of the instrument.
    pub fn num_strings(&self) -> usize {
        self.num_strings
    }

    /// Fret rows shown by default.
    pub fn default_num_frets(&self) -> u8 {
        self.default_num_frets
    }

    /// Convert a user pattern into a diagram.
    ///
    /// Returns:
    /// - `Err(Unparseable)` if no fret or marker can be read.
    /// - `Err(InvalidSymbol)` for unknown characters in a dense pattern.
    /// - `Err(FretOutOfRange)` for frets above 255.
    /// - `Err(TooManyFrets)` if there are more frets than strings.
    pub fn convert(&self, chord: &UserChord) -> Result<UserDiagram, PatternError> {
        let slots = lex(&chord.frets)?;

        let mut frets: Vec<Fret> = slots.iter().filter_map(|slot| slot.fret()).collect();
        if frets.len() > self.num_strings {
            return Err(PatternError::TooManyFrets {
                expected: self.num_strings,
                got: frets.len(),
            });
        }

        let mut barres = extract_barres(&slots, self.num_strings);

        let mut position = chord.position;
        if position == 0 {
            if let Some(origin) = self.compaction_origin(&frets) {
                log::debug!("drawing {:?} from fret {origin}", chord.frets);
                position = origin;
                frets = frets
                    .iter()
                    .map(|&fret| match fret {
                        Fret::Fretted(f) => Fret::Fretted(shift(f, origin)),
                        Fret::Muted => Fret::Muted,
                    })
                    .collect();
                barres = barres
                    .into_iter()
                    .map(|barre| BarreSpan {
                        fret: shift(barre.fret, origin),
                        ..barre
                    })
                    .collect();
            }
        }

        let num_frets = frets
            .iter()
            .filter_map(|fret| fret.fretted())
            .max()
            .map_or(self.default_num_frets, |highest| {
                highest.max(self.default_num_frets)
            });

        let chord = frets
            .into_iter()
            .enumerate()
            .map(|(idx, fret)| StringFret::new(self.num_strings - idx, fret))
            .collect();

        Ok(UserDiagram {
            chord,
            position,
            barres,
            tuning: vec![String::new(); self.num_strings],
            num_frets,
        })
    }

    /// Lowest pressed fret, when the shape has to be drawn from there.
    fn compaction_origin(&self, frets: &[Fret]) -> Option<u8> {
        let (min, max) = frets
            .iter()
            .filter_map(|fret| fret.fretted())
            .filter(|&fret| fret > 0)
            .fold(None, |bounds, fret| match bounds {
                None => Some((fret, fret)),
                Some((lo, hi)) => Some((u8::min(lo, fret), u8::max(hi, fret))),
            })?;

        let span = max - min + 1;
        (span > self.default_num_frets || min > MAX_NUT_FRET).then_some(min)
    }
}

impl Default for UserChordConverter {
    fn default() -> Self {
        UserChordConverter::new()
    }
}

/// Convert a user pattern for an instrument with `num_strings` strings.
///
/// Shorthand for a [`UserChordConverter`] built with the same values, without
/// validating them.
pub fn convert_user_pattern(
    chord: &UserChord,
    num_strings: usize,
    default_num_frets: u8,
) -> Result<UserDiagram, PatternError> {
    UserChordConverter {
        num_strings,
        default_num_frets,
    }
    .convert(chord)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(frets: &str, position: u8) -> UserDiagram {
        convert_user_pattern(&UserChord::new(frets, position), 6, DEFAULT_NUM_FRETS).unwrap()
    }

    fn entries(pairs: &[(usize, Option<u8>)]) -> Vec<StringFret> {
        pairs
            .iter()
            .map(|&(string, fret)| StringFret::new(string, fret.map_or(Fret::Muted, Fret::Fretted)))
            .collect()
    }

    #[test]
    fn dense_open_chord() {
        let diagram = convert("320013", 1);
        assert_eq!(
            diagram.chord,
            entries(&[(6, Some(3)), (5, Some(2)), (4, Some(0)), (3, Some(0)), (2, Some(1)), (1, Some(3))])
        );
        assert_eq!(diagram.position, 1);
        assert!(diagram.barres.is_empty());
        assert_eq!(diagram.tuning, vec![""; 6]);
        assert_eq!(diagram.num_frets, 4);
    }

    #[test]
    fn muted_strings() {
        let diagram = convert("x32010", 1);
        assert_eq!(
            diagram.chord,
            entries(&[(6, None), (5, Some(3)), (4, Some(2)), (3, Some(0)), (2, Some(1)), (1, Some(0))])
        );
    }

    #[test]
    fn single_barre() {
        let diagram = convert("_335533_", 1);
        assert_eq!(
            diagram.barres,
            vec![BarreSpan { from_string: 6, to_string: 1, fret: 3 }]
        );
        assert_eq!(
            diagram.chord,
            entries(&[(6, Some(3)), (5, Some(3)), (4, Some(5)), (3, Some(5)), (2, Some(3)), (1, Some(3))])
        );
        assert_eq!(diagram.num_frets, 5);
    }

    #[test]
    fn double_barre() {
        let diagram = convert("_3333__55_", 1);
        assert_eq!(
            diagram.barres,
            vec![
                BarreSpan { from_string: 6, to_string: 3, fret: 3 },
                BarreSpan { from_string: 2, to_string: 1, fret: 5 },
            ]
        );
        assert_eq!(diagram.chord.len(), 6);
    }

    #[test]
    fn barre_in_the_middle_of_a_pattern() {
        let diagram = convert("x_3555_x", 3);
        assert_eq!(
            diagram.barres,
            vec![BarreSpan { from_string: 5, to_string: 2, fret: 3 }]
        );
    }

    #[test]
    fn odd_marker_count_yields_no_barres() {
        let diagram = convert("_335533", 1);
        assert!(diagram.barres.is_empty());
        assert_eq!(diagram.chord.len(), 6);

        let diagram = convert("_33_5_533", 1);
        assert!(diagram.barres.is_empty());
    }

    #[test]
    fn barre_opening_on_muted_string_is_dropped() {
        let diagram = convert("_x33333_", 1);
        assert!(diagram.barres.is_empty());
    }

    #[test]
    fn separated_pattern_allows_multi_digit_frets() {
        let diagram = convert("x, 12, 14, 14, 13, x", 12);
        assert_eq!(
            diagram.chord,
            entries(&[(6, None), (5, Some(12)), (4, Some(14)), (3, Some(14)), (2, Some(13)), (1, None)])
        );
        assert_eq!(diagram.num_frets, 14);
    }

    #[test]
    fn low_shape_stays_at_nut() {
        let diagram = convert("x2x132", 0);
        assert_eq!(diagram.position, 0);
        assert_eq!(diagram.chord[1], StringFret::new(5, Fret::Fretted(2)));
        assert_eq!(diagram.num_frets, 4);
    }

    #[test]
    fn open_and_muted_shape_stays_at_nut() {
        let diagram = convert("x000x0", 0);
        assert_eq!(diagram.position, 0);
        assert_eq!(diagram.num_frets, 4);
    }

    #[test]
    fn high_shape_is_compacted() {
        let diagram = convert("x 7 9 9 8 7", 0);
        assert_eq!(diagram.position, 7);
        assert_eq!(
            diagram.chord,
            entries(&[(6, None), (5, Some(1)), (4, Some(3)), (3, Some(3)), (2, Some(2)), (1, Some(1))])
        );
        assert_eq!(diagram.num_frets, 4);
    }

    #[test]
    fn wide_shape_is_compacted_from_lowest_fret() {
        let diagram = convert("2x0007", 0);
        assert_eq!(diagram.position, 2);
        assert_eq!(
            diagram.chord,
            entries(&[(6, Some(1)), (5, None), (4, Some(0)), (3, Some(0)), (2, Some(0)), (1, Some(6))])
        );
        assert_eq!(diagram.num_frets, 6);
    }

    #[test]
    fn compaction_moves_barre_fret() {
        let diagram = convert("_ 7 7 9 9 8 7 _", 0);
        assert_eq!(diagram.position, 7);
        assert_eq!(
            diagram.barres,
            vec![BarreSpan { from_string: 6, to_string: 1, fret: 1 }]
        );
    }

    #[test]
    fn requested_position_is_kept() {
        let diagram = convert("x 7 9 9 8 7", 5);
        assert_eq!(diagram.position, 5);
        assert_eq!(diagram.chord[1], StringFret::new(5, Fret::Fretted(7)));
        assert_eq!(diagram.num_frets, 9);
    }

    #[test]
    fn fewer_frets_than_strings() {
        let diagram = convert("32", 1);
        assert_eq!(diagram.chord, entries(&[(6, Some(3)), (5, Some(2))]));
        assert_eq!(diagram.tuning.len(), 6);
    }

    #[test]
    fn parse_errors() {
        let err = |frets: &str| convert_user_pattern(&UserChord::new(frets, 0), 6, 4).unwrap_err();
        assert_eq!(err(""), PatternError::Unparseable(String::new()));
        assert_eq!(err(" , "), PatternError::Unparseable(" , ".to_string()));
        assert_eq!(err("32a013"), PatternError::InvalidSymbol { symbol: 'a', index: 2 });
        assert_eq!(
            err("3 2 999"),
            PatternError::FretOutOfRange { token: "999".to_string() }
        );
        assert_eq!(err("3200130"), PatternError::TooManyFrets { expected: 6, got: 7 });
    }

    #[test]
    fn builder_validates_geometry() {
        let converter = UserChordConverter::builder()
            .num_strings(4)
            .default_num_frets(5)
            .build()
            .unwrap();
        assert_eq!(converter.num_strings(), 4);
        assert_eq!(converter.default_num_frets(), 5);

        assert_eq!(
            UserChordConverter::builder().num_strings(0).build(),
            Err(ConfigError::InvalidArgument {
                arg: "num_strings",
                msg: "must be >= 1".to_string(),
            })
        );
        assert!(UserChordConverter::builder().default_num_frets(0).build().is_err());
    }

    #[test]
    fn four_string_instrument() {
        let converter = UserChordConverter::builder().num_strings(4).build().unwrap();
        let diagram = converter.convert(&UserChord::new("0003", 1)).unwrap();
        assert_eq!(
            diagram.chord,
            entries(&[(4, Some(0)), (3, Some(0)), (2, Some(0)), (1, Some(3))])
        );
        assert_eq!(diagram.tuning.len(), 4);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn pattern(frets: &[Option<u8>], barre: Option<(usize, usize)>) -> String {
            let mut tokens: Vec<String> = frets
                .iter()
                .map(|fret| fret.map_or_else(|| "x".to_string(), |f| f.to_string()))
                .collect();
            if let Some((a, b)) = barre {
                let (lo, hi) = (a.min(b), a.max(b));
                tokens.insert(hi + 1, "_".to_string());
                tokens.insert(lo, "_".to_string());
            }
            tokens.join(" ")
        }

        proptest! {
            #[test]
            fn reconverting_output_is_stable(
                frets in prop::collection::vec(prop::option::weighted(0.85, 0u8..16), 6),
                barre in prop::option::of((0usize..6, 0usize..6)),
            ) {
                let first = convert(&pattern(&frets, barre), 0);
                let again = convert(&first.to_pattern(), first.position);

                prop_assert_eq!(&again.chord, &first.chord);
                prop_assert_eq!(&again.barres, &first.barres);
                prop_assert_eq!(again.num_frets, first.num_frets);
                prop_assert_eq!(again.position, first.position);
            }

            #[test]
            fn compaction_only_for_wide_or_high_shapes(
                frets in prop::collection::vec(prop::option::weighted(0.85, 0u8..16), 6),
            ) {
                let diagram = convert(&pattern(&frets, None), 0);
                let pressed: Vec<u8> = frets.iter().flatten().copied().filter(|&f| f > 0).collect();
                let expected = match (pressed.iter().min(), pressed.iter().max()) {
                    (Some(&min), Some(&max)) if max - min + 1 > DEFAULT_NUM_FRETS || min > 3 => min,
                    _ => 0,
                };
                prop_assert_eq!(diagram.position, expected);
                prop_assert!(diagram.num_frets >= DEFAULT_NUM_FRETS);
                prop_assert_eq!(diagram.tuning.len(), 6);
            }

            #[test]
            fn barre_ends_are_valid_strings(
                frets in prop::collection::vec(prop::option::weighted(0.85, 0u8..16), 6),
                barre in (0usize..6, 0usize..6),
            ) {
                let diagram = convert(&pattern(&frets, Some(barre)), 1);
                for span in &diagram.barres {
                    prop_assert!((1..=6).contains(&span.from_string));
                    prop_assert!((1..=6).contains(&span.to_string));
                    prop_assert!(span.from_string >= span.to_string);
                }
            }
        }
    }
}
