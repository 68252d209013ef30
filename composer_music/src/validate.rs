// Repair and clamping of generated notes.
//
// Two independent passes run over every melody:
//
// 1. `repair_to_scale` works against the request's scale-note set. Pitches
//    outside the set snap to the nearest member (first member wins a tie),
//    the first and last notes are forced onto the root, and duration and
//    velocity are clamped to the same ranges the prompt advertises.
// 2. `clamp_to_piano_range` is the last-mile guard before MIDI output: it
//    ignores scale membership and simply keeps pitch inside the 88-key range
//    and duration/velocity inside playable bounds.
//
// The second pass is not redundant with the first; it is applied to whatever
// reaches the writer, however it got there.

use tracing::warn;

use crate::note::{NoteCandidate, NoteEvent};
use crate::theory::ScaleNotes;

/// Shortest and longest allowed note, in beats.
pub const DURATION_RANGE: (f64, f64) = (0.25, 4.0);
pub const DEFAULT_DURATION: f64 = 1.0;

/// Velocity bounds applied during scale repair.
pub const SCALE_VELOCITY_RANGE: (u8, u8) = (50, 100);
pub const DEFAULT_SCALE_VELOCITY: u8 = 75;

/// Lowest and highest piano key (A0 to C8).
pub const PIANO_RANGE: (u8, u8) = (21, 108);
/// Velocity bounds applied by the final clamp.
pub const FINAL_VELOCITY_RANGE: (u8, u8) = (40, 127);
pub const DEFAULT_FINAL_VELOCITY: u8 = 80;
/// Pitch substituted for an unset (zero) pitch by the final clamp.
pub const DEFAULT_PITCH: u8 = 60;

/// Treat missing, zero, and non-finite values as unset.
fn value_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => default,
    }
}

fn clamp_duration(duration: f64) -> f64 {
    let duration = if duration.is_finite() && duration != 0.0 {
        duration
    } else {
        DEFAULT_DURATION
    };
    duration.clamp(DURATION_RANGE.0, DURATION_RANGE.1)
}

fn clamp_velocity(velocity: f64, (low, high): (u8, u8)) -> u8 {
    velocity.round().clamp(f64::from(low), f64::from(high)) as u8
}

/// Resolve a candidate pitch against the scale. A missing pitch resolves to
/// the first member, which is the root.
fn repair_pitch(index: usize, pitch: Option<f64>, scale: &ScaleNotes) -> u8 {
    let Some(pitch) = pitch else {
        warn!(index, root = scale.root(), "note had no pitch, using root");
        return scale.root();
    };
    if pitch.fract() == 0.0 && (0.0..=127.0).contains(&pitch) && scale.contains(pitch as u8) {
        return pitch as u8;
    }
    let fixed = scale.nearest(pitch);
    warn!(index, from = pitch, to = fixed, "fixed note not in scale");
    fixed
}

/// Snap every candidate into the scale and clamp duration/velocity. The
/// first and last notes always land on the root.
pub fn repair_to_scale(candidates: &[NoteCandidate], scale: &ScaleNotes) -> Vec<NoteEvent> {
    let last = candidates.len().saturating_sub(1);
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let mut pitch = repair_pitch(index, candidate.pitch, scale);
            if index == 0 || index == last {
                pitch = scale.root();
            }
            NoteEvent {
                pitch,
                duration: clamp_duration(value_or(candidate.duration, DEFAULT_DURATION)),
                velocity: clamp_velocity(
                    value_or(candidate.velocity, f64::from(DEFAULT_SCALE_VELOCITY)),
                    SCALE_VELOCITY_RANGE,
                ),
            }
        })
        .collect()
}

/// Final safety clamp: pitch into the piano range, duration and velocity
/// into playable bounds. Zero values count as unset and take defaults.
pub fn clamp_to_piano_range(notes: &mut [NoteEvent]) {
    for note in notes {
        let pitch = if note.pitch == 0 {
            DEFAULT_PITCH
        } else {
            note.pitch
        };
        note.pitch = pitch.clamp(PIANO_RANGE.0, PIANO_RANGE.1);
        note.duration = clamp_duration(note.duration);
        let velocity = if note.velocity == 0 {
            DEFAULT_FINAL_VELOCITY
        } else {
            note.velocity
        };
        note.velocity = velocity.clamp(FINAL_VELOCITY_RANGE.0, FINAL_VELOCITY_RANGE.1);
    }
}
