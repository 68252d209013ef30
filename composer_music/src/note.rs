// Note records at the two ends of validation.
//
// `NoteCandidate` is what the model sends back: every field optional and
// numeric values kept as `f64`, since the payload is untrusted and may carry
// `60.0`, `"0.5"`, `null`, or omit fields entirely. A field that is neither a
// number nor a numeric string reads as unset, so one bad value costs that
// field its default instead of failing the whole melody. `NoteEvent` is the
// validated form consumed by midi.rs.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// One raw note record parsed from model output. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct NoteCandidate {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pitch: Option<f64>,
    /// Length in beats.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub velocity: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Numbers pass through, numeric strings are parsed, anything else
/// (null, bools, objects, junk text) becomes `None`.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Number(n) => Some(n),
        LenientNumber::Text(s) => s.trim().parse().ok(),
        LenientNumber::Other(_) => None,
    })
}

impl NoteCandidate {
    pub fn new(pitch: f64, duration: f64, velocity: f64) -> Self {
        NoteCandidate {
            pitch: Some(pitch),
            duration: Some(duration),
            velocity: Some(velocity),
        }
    }
}

/// A validated note, ready for MIDI output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// MIDI note number.
    pub pitch: u8,
    /// Length in beats.
    pub duration: f64,
    /// MIDI velocity.
    pub velocity: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_tolerates_missing_and_extra_fields() {
        let json = r#"[{"pitch": 60.0, "velocity": null, "lyric": "la"}, {}]"#;
        let notes: Vec<NoteCandidate> = serde_json::from_str(json).unwrap();
        assert_eq!(notes[0].pitch, Some(60.0));
        assert_eq!(notes[0].duration, None);
        assert_eq!(notes[0].velocity, None);
        assert_eq!(notes[1], NoteCandidate::default());
    }

    #[test]
    fn candidate_accepts_integer_values() {
        let json = r#"{"pitch": 63, "duration": 1, "velocity": 80}"#;
        let note: NoteCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(note, NoteCandidate::new(63.0, 1.0, 80.0));
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let json = r#"{"pitch": "62", "duration": " 0.5 ", "velocity": "80"}"#;
        let note: NoteCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(note, NoteCandidate::new(62.0, 0.5, 80.0));
    }

    #[test]
    fn wrongly_typed_fields_read_as_unset() {
        let json = r#"[{"pitch": 60, "duration": "long", "velocity": true},
                       {"pitch": [61], "duration": {"beats": 1}, "velocity": 70}]"#;
        let notes: Vec<NoteCandidate> = serde_json::from_str(json).unwrap();
        assert_eq!(notes[0].pitch, Some(60.0));
        assert_eq!(notes[0].duration, None);
        assert_eq!(notes[0].velocity, None);
        assert_eq!(notes[1].pitch, None);
        assert_eq!(notes[1].duration, None);
        assert_eq!(notes[1].velocity, Some(70.0));
    }
}
