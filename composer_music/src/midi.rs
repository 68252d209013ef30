// MIDI output for validated melodies.
//
// Converts a note sequence into a Standard MIDI File (SMF) and writes it to
// the output directory. The file is format 0 (single track): track name,
// tempo, time signature, then a NoteOn/NoteOff pair per note in input order,
// then end-of-track. Notes are strictly sequential with no rests.
//
// Durations are not written verbatim. Each note's beat length is mapped onto
// the symbolic vocabulary (whole, half, quarter, eighth, sixteenth) by
// `NoteLength::from_beats`, and the symbol's tick length is what lands in the
// file.
//
// Uses the `midly` crate for MIDI writing.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use thiserror::Error;
use tracing::info;

use crate::note::NoteEvent;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// All notes go out on the first channel.
const CHANNEL: u8 = 0;

const TRACK_NAME: &[u8] = b"Melody";

/// Symbolic note lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLength {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl NoteLength {
    /// Map a beat count onto a symbol. Thresholds are checked longest first;
    /// anything under a sixteenth (including NaN) becomes an eighth.
    pub fn from_beats(beats: f64) -> NoteLength {
        if beats >= 4.0 {
            NoteLength::Whole
        } else if beats >= 2.0 {
            NoteLength::Half
        } else if beats >= 1.0 {
            NoteLength::Quarter
        } else if beats >= 0.5 {
            NoteLength::Eighth
        } else if beats >= 0.25 {
            NoteLength::Sixteenth
        } else {
            NoteLength::Eighth
        }
    }

    pub fn ticks(self) -> u32 {
        let quarter = u32::from(TICKS_PER_QUARTER);
        match self {
            NoteLength::Whole => quarter * 4,
            NoteLength::Half => quarter * 2,
            NoteLength::Quarter => quarter,
            NoteLength::Eighth => quarter / 2,
            NoteLength::Sixteenth => quarter / 4,
        }
    }
}

/// Per-file settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiOptions {
    pub tempo_bpm: u16,
    /// (numerator, denominator); the denominator must be a power of two.
    pub time_signature: (u8, u8),
}

impl Default for MidiOptions {
    fn default() -> Self {
        MidiOptions {
            tempo_bpm: 120,
            time_signature: (4, 4),
        }
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode MIDI data: {0}")]
    Encode(std::io::Error),
    #[error("failed to write {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn event(delta: u32, kind: TrackEventKind<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind,
    }
}

/// Convert a melody to an in-memory single-track SMF.
pub fn melody_to_smf(notes: &[NoteEvent], options: &MidiOptions) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut track: Track<'static> = Vec::with_capacity(notes.len() * 2 + 4);
    let channel = u4::new(CHANNEL);

    let tempo_microseconds = 60_000_000 / u32::from(options.tempo_bpm.max(1));
    track.push(event(
        0,
        TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
    ));
    let (numerator, denominator) = options.time_signature;
    track.push(event(
        0,
        TrackEventKind::Meta(MetaMessage::TimeSignature(
            numerator,
            denominator.max(1).trailing_zeros() as u8,
            24,
            8,
        )),
    ));
    track.push(event(
        0,
        TrackEventKind::Meta(MetaMessage::TrackName(TRACK_NAME)),
    ));

    for note in notes {
        let key = u7::new(note.pitch.min(127));
        let vel = u7::new(note.velocity.min(127));
        track.push(event(
            0,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            },
        ));
        track.push(event(
            NoteLength::from_beats(note.duration).ticks(),
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel },
            },
        ));
    }

    track.push(event(0, TrackEventKind::Meta(MetaMessage::EndOfTrack)));
    smf.tracks.push(track);
    smf
}

/// Encode a melody as SMF bytes.
pub fn melody_to_bytes(notes: &[NoteEvent], options: &MidiOptions) -> Result<Vec<u8>, WriteError> {
    let smf = melody_to_smf(notes, options);
    let mut buf = Vec::new();
    smf.write_std(&mut buf).map_err(WriteError::Encode)?;
    Ok(buf)
}

/// Encode a melody and write it to `<output_dir>/<filename>`, creating the
/// directory if needed. Returns the written path.
pub fn write_melody(
    notes: &[NoteEvent],
    filename: &str,
    options: &MidiOptions,
    output_dir: &Path,
) -> Result<PathBuf, WriteError> {
    let bytes = melody_to_bytes(notes, options)?;

    std::fs::create_dir_all(output_dir).map_err(|source| WriteError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(filename);
    std::fs::write(&path, &bytes).map_err(|source| WriteError::WriteFile {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), bytes = bytes.len(), notes = notes.len(), "wrote MIDI file");
    Ok(path)
}

/// `melody_<root>_<scale>_AI_<timestamp>.mid`, with the timestamp at minute
/// resolution and colons/dots replaced by dashes. Two requests for the same
/// root and scale in the same minute share a name.
pub fn generate_filename(root: &str, scale: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.format("%Y-%m-%dT%H:%M").to_string().replace([':', '.'], "-");
    format!("melody_{root}_{scale}_AI_{timestamp}.mid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note(pitch: u8, duration: f64, velocity: u8) -> NoteEvent {
        NoteEvent {
            pitch,
            duration,
            velocity,
        }
    }

    #[test]
    fn duration_symbol_thresholds() {
        let cases = [
            (4.0, NoteLength::Whole),
            (3.9, NoteLength::Half),
            (2.0, NoteLength::Half),
            (1.9, NoteLength::Quarter),
            (1.0, NoteLength::Quarter),
            (0.9, NoteLength::Eighth),
            (0.5, NoteLength::Eighth),
            (0.3, NoteLength::Sixteenth),
            (0.25, NoteLength::Sixteenth),
            (0.1, NoteLength::Eighth),
        ];
        for (beats, expected) in cases {
            assert_eq!(NoteLength::from_beats(beats), expected, "beats {beats}");
        }
        assert_eq!(NoteLength::from_beats(f64::NAN), NoteLength::Eighth);
    }

    #[test]
    fn ticks_follow_beat_lengths() {
        let cases = [
            (4.0, 1920),
            (2.0, 960),
            (1.0, 480),
            (0.5, 240),
            (0.25, 120),
        ];
        for (beats, ticks) in cases {
            assert_eq!(NoteLength::from_beats(beats).ticks(), ticks, "beats {beats}");
        }
    }

    #[test]
    fn smf_layout() {
        let notes = [note(60, 1.0, 75), note(63, 2.0, 80), note(60, 4.0, 70)];
        let smf = melody_to_smf(&notes, &MidiOptions::default());
        assert_eq!(smf.header.format, Format::SingleTrack);
        assert_eq!(smf.tracks.len(), 1);

        let track = &smf.tracks[0];
        // 3 meta events + 2 per note + end of track
        assert_eq!(track.len(), 3 + 6 + 1);
        assert_eq!(
            track[0].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000)))
        );
        assert_eq!(
            track[1].kind,
            TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8))
        );
        assert_eq!(
            track[4].kind,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(60),
                    vel: u7::new(75),
                },
            }
        );
        assert_eq!(track[4].delta.as_int(), 480);
        assert_eq!(track[6].delta.as_int(), 960);
        assert_eq!(track[8].delta.as_int(), 1920);
        assert_eq!(
            track.last().unwrap().kind,
            TrackEventKind::Meta(MetaMessage::EndOfTrack)
        );
    }

    #[test]
    fn bytes_parse_back() {
        let notes = [note(62, 0.5, 90), note(62, 0.25, 90)];
        let bytes = melody_to_bytes(&notes, &MidiOptions::default()).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 1);
        assert_eq!(smf.tracks[0].len(), 3 + 4 + 1);
    }

    #[test]
    fn write_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let path = write_melody(
            &[note(60, 1.0, 80)],
            "test.mid",
            &MidiOptions::default(),
            &out,
        )
        .unwrap();
        assert_eq!(path, out.join("test.mid"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"MThd"));
    }

    #[test]
    fn write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();
        let err = write_melody(&[note(60, 1.0, 80)], "x.mid", &MidiOptions::default(), &blocker)
            .unwrap_err();
        assert!(matches!(err, WriteError::CreateDir { .. }));
    }

    #[test]
    fn filename_has_minute_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 5, 42).unwrap();
        assert_eq!(
            generate_filename("c", "minor", now),
            "melody_c_minor_AI_2026-10-16T09-05.mid"
        );
    }
}
