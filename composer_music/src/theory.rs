// Note-name and scale arithmetic.
//
// Everything here is fixed lookup data plus small pure functions over it:
// - Note-name table: canonical spellings (C, C#, Db, ...) to semitone 0-11.
//   Enharmonic spellings share a semitone. The reverse direction uses an
//   explicit sharps-preferred table so the chosen name never depends on
//   iteration order.
// - Scale interval patterns for the six supported scales.
// - `enumerate_scale`, which expands a root + scale into the concrete MIDI
//   pitches (the "scale-note set") used both to instruct the model and to
//   repair its output.
//
// Used by prompt.rs to build the constraint list and by validate.rs for
// membership checks and nearest-pitch repair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIDI pitch of the root's base octave for C (middle C).
pub const BASE_OCTAVE_C: u8 = 60;

/// Every accepted spelling and its semitone above C.
const NOTE_NAMES: [(&str, u8); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

/// Canonical spelling per semitone (sharps preferred).
const CANONICAL_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    #[error("unknown note: {0}")]
    UnknownNote(String),
    #[error("unknown scale: {0}")]
    UnknownScale(String),
}

/// Clean up a user-typed note name: trim, map `♯`/`♭` to `#`/`b`, and
/// uppercase the first character. Everything after the first character is
/// left as-is, so `"c#"` becomes `"C#"` and `"db"` becomes `"Db"`.
///
/// Empty or all-whitespace input is returned unchanged; the later
/// `semitone_of` lookup is what rejects it.
pub fn normalize(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return name.to_string();
    }
    let ascii = trimmed.replace('♯', "#").replace('♭', "b");
    let mut chars = ascii.chars();
    let first: String = chars.next().map(char::to_uppercase).into_iter().flatten().collect();
    first + chars.as_str()
}

/// Semitone (0-11) of a canonical note name.
pub fn semitone_of(name: &str) -> Result<u8, TheoryError> {
    NOTE_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, semitone)| semitone)
        .ok_or_else(|| TheoryError::UnknownNote(name.to_string()))
}

/// Canonical name for a semitone. Values above 11 wrap by octave.
pub fn name_of(semitone: u8) -> &'static str {
    CANONICAL_NAMES[(semitone % 12) as usize]
}

/// MIDI pitch of a (possibly unnormalized) note name in the base octave,
/// C = 60 through B = 71.
pub fn root_pitch(name: &str) -> Result<u8, TheoryError> {
    let canonical = normalize(name);
    semitone_of(&canonical)
        .map(|semitone| BASE_OCTAVE_C + semitone)
        .map_err(|_| TheoryError::UnknownNote(name.trim().to_string()))
}

/// The supported scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scale {
    Major,
    Minor,
    HarmonicMinor,
    MelodicMinor,
    Pentatonic,
    Blues,
}

/// Style hint used for scales without a dedicated description.
pub const GENERIC_CHARACTER: &str = "Musical and expressive";

impl Scale {
    pub const ALL: [Scale; 6] = [
        Scale::Major,
        Scale::Minor,
        Scale::HarmonicMinor,
        Scale::MelodicMinor,
        Scale::Pentatonic,
        Scale::Blues,
    ];

    /// Semitone offsets from the root, ascending, starting at 0.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Scale::Pentatonic => &[0, 2, 4, 7, 9],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }

    /// Lowercase command-line name, e.g. `"harmonic-minor"`.
    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::HarmonicMinor => "harmonic-minor",
            Scale::MelodicMinor => "melodic-minor",
            Scale::Pentatonic => "pentatonic",
            Scale::Blues => "blues",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Scale> {
        let name = name.trim();
        Scale::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Mood and phrasing guidance for the model.
    pub fn character(self) -> &'static str {
        match self {
            Scale::Major => "Happy, bright, uplifting feeling. Use confident, forward motion.",
            Scale::Minor => {
                "Sad, melancholic, introspective feeling. Use descending phrases and softer dynamics."
            }
            Scale::HarmonicMinor => {
                "Exotic, dramatic, Middle-Eastern feeling. Emphasize the raised 7th scale degree."
            }
            Scale::MelodicMinor => {
                "Smooth, sophisticated, jazz-like feeling. Use flowing, stepwise motion."
            }
            Scale::Pentatonic => "Simple, folk-like, universal feeling. Very singable and memorable.",
            Scale::Blues => {
                "Bluesy, soulful, emotional feeling. Use blue notes and expressive phrasing."
            }
        }
    }

    /// Comma-separated list of all scale names, for usage text.
    pub fn names_list() -> String {
        Scale::ALL.map(Scale::name).join(", ")
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scale::from_name(s).ok_or_else(|| TheoryError::UnknownScale(s.to_string()))
    }
}

/// Style hint for an arbitrary scale name; unknown names get the generic one.
pub fn character_of(scale_name: &str) -> &'static str {
    Scale::from_name(scale_name).map_or(GENERIC_CHARACTER, Scale::character)
}

/// The concrete pitches a melody may use, plus the root they start from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleNotes {
    root: u8,
    pitches: Vec<u8>,
}

impl ScaleNotes {
    /// Root pitch (also the first element of `pitches`).
    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    pub fn contains(&self, pitch: u8) -> bool {
        self.pitches.contains(&pitch)
    }

    /// The member closest to `pitch`. On a tie, the member found first in a
    /// left-to-right scan wins. A NaN input yields the first member.
    pub fn nearest(&self, pitch: f64) -> u8 {
        let mut best = self.root;
        let mut best_distance = f64::INFINITY;
        for &candidate in &self.pitches {
            let distance = (f64::from(candidate) - pitch).abs();
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }
        best
    }
}

/// Expand a root and scale into ascending MIDI pitches across `octaves`
/// octaves, starting from the root's base octave (C = 60).
///
/// Unknown scale names fall back to major; unknown roots are an error.
/// `octaves` below 1 is treated as 1, and pitches past 127 are dropped.
pub fn enumerate_scale(
    root_name: &str,
    scale_name: &str,
    octaves: u8,
) -> Result<ScaleNotes, TheoryError> {
    let root = root_pitch(root_name)?;
    let scale = Scale::from_name(scale_name).unwrap_or(Scale::Major);

    let mut pitches = Vec::with_capacity(scale.intervals().len() * octaves.max(1) as usize);
    for octave in 0..octaves.max(1) {
        for &interval in scale.intervals() {
            let pitch = u16::from(root) + u16::from(interval) + 12 * u16::from(octave);
            if pitch <= 127 {
                pitches.push(pitch as u8);
            }
        }
    }

    Ok(ScaleNotes { root, pitches })
}
