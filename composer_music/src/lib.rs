// Scale-constrained AI melody composer.
//
// Takes a short command such as "compose C minor", asks a language model for
// a melody restricted to that scale, repairs whatever comes back so it is
// guaranteed to be in key and in range, and writes it out as a MIDI file.
//
// Architecture:
// - theory.rs:   Note-name table, scale interval patterns, scale-note set
//                enumeration and nearest-pitch lookup
// - command.rs:  `compose <note> <scale>` parsing into a `CompositionRequest`
// - prompt.rs:   Constraint-bearing prompt construction
// - generate.rs: Backend adapter; calls a `CompletionBackend` and parses the
//                embedded JSON array into note candidates
// - note.rs:     Raw `NoteCandidate` and validated `NoteEvent`
// - validate.rs: Scale repair (snap, root at both ends, clamps) and the final
//                piano-range clamp
// - midi.rs:     Single-track SMF output and output filenames
// - compose.rs:  The request pipeline and `CompositionResult`
// - config.rs:   `ComposerConfig`, loaded from optional JSON
// - error.rs:    `ComposeError`
//
// The completion backend lives in the `composer_llm` crate.

pub mod command;
pub mod compose;
pub mod config;
pub mod error;
pub mod generate;
pub mod midi;
pub mod note;
pub mod prompt;
pub mod theory;
pub mod validate;

pub use compose::{
    CompositionDetails, CompositionResult, Composer, compose_from_command,
};
pub use config::ComposerConfig;
pub use error::ComposeError;
