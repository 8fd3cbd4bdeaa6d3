//! # chord_diagram
//!
//! Turn chords into fretboard diagram descriptions: per-string frets, barres,
//! the fret shown at the top row and per-string finger labels, ready for a
//! generic chord-box renderer.
//!
//! Two converters feed the same output shape:
//! - [`convert_db_position`] for pre-authored chords from a chords-db database,
//! - [`UserChordConverter`] for free-form patterns like `"x32010"` or `"_335533_"`.
//!
//! ## Example
//! ```rust
//! use chord_diagram::{FretboardDiagram, UserChord, UserChordConverter};
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1) Configure a converter for the instrument
//!     let converter = UserChordConverter::builder()
//!         .num_strings(6)
//!         .default_num_frets(4)
//!         .build()?;
//!
//!     // 2) Convert a pattern, letting the converter pick the position
//!     let diagram = converter.convert(&UserChord::new("x 7 9 9 8 7", 0))?;
//!     assert_eq!(diagram.position(), 7);
//!
//!     // 3) Hand the description to a renderer
//!     println!("{}", serde_json::to_string(&diagram)?);
//!     Ok(())
//! }
//! # run().unwrap();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

/// Shared diagram output.
pub use diagram::{BarreSpan, DbDiagram, Diagram, Fret, FretboardDiagram, StringFret, UserDiagram};

/// Chord database model.
pub use database::{ChordDatabase, ChordDefinition, DatabaseError, Position};

/// Database chord conversion.
pub use db_chord::{convert_db_position, LookupRangeError};

/// User pattern conversion.
pub use user_chord::{
    convert_user_pattern, PatternError, UserChord, UserChordConverter, UserChordConverterBuilder,
    DEFAULT_NUM_FRETS,
};

/// Instrument presets and configuration errors.
pub use instrument::{ConfigError, Instrument, InstrumentInfo};

/// Converter selection and position paging.
pub use chooser::{build_diagram, display_name, ChordSource, DiagramError, PositionChooser};

/// Diagram description types.
pub mod diagram;

/// Chord database module.
pub mod database;

/// Database chord conversion module.
pub mod db_chord;

/// User pattern conversion module.
pub mod user_chord;

/// Instrument geometry module.
pub mod instrument;

/// Converter selection module.
pub mod chooser;
