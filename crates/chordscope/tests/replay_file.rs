//! Replaying MIDI files from disk, end to end.

use std::io::Write;

use chordscope::commands;
use harmony::{Analysis, TheoryTables};
use midly::{Format, Header, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use pretty_assertions::assert_eq;

fn note(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Midi {
            channel: 0u8.into(),
            message: MidiMessage::NoteOn {
                key: key.into(),
                vel: vel.into(),
            },
        },
    }
}

fn end() -> TrackEvent<'static> {
    TrackEvent {
        delta: 0u32.into(),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    }
}

/// I then V7 in C, one beat each, on two tracks (melody and bass).
fn cadence_file() -> tempfile::NamedTempFile {
    let upper = vec![
        note(0, 64, 90),
        note(0, 67, 90),
        note(480, 64, 0),
        note(0, 67, 0),
        note(0, 59, 90),
        note(0, 62, 90),
        note(0, 65, 90),
        note(480, 59, 0),
        note(0, 62, 0),
        note(0, 65, 0),
        end(),
    ];
    let bass = vec![
        note(0, 60, 90),
        note(480, 60, 0),
        note(0, 55, 90),
        note(480, 55, 0),
        end(),
    ];

    let smf = Smf {
        header: Header::new(Format::Parallel, Timing::Metrical(480u16.into())),
        tracks: vec![upper, bass],
    };
    let mut bytes = Vec::new();
    smf.write(&mut bytes).unwrap();

    let mut file = tempfile::Builder::new().suffix(".mid").tempfile().unwrap();
    file.write_all(&bytes).unwrap();
    file
}

#[test]
fn cadence_frames() {
    let tables = TheoryTables::new();
    let key = tables.key(0);
    let file = cadence_file();

    let frames = commands::replay(&tables, file.path(), key).unwrap();
    let ticks: Vec<u64> = frames.iter().map(|f| f.tick).collect();
    assert_eq!(ticks, vec![0, 480, 960]);

    let Analysis::Chord(tonic) = &frames[0].analysis else {
        panic!("expected a chord, got {:?}", frames[0].analysis);
    };
    assert_eq!(tonic.chord_name, "C4 maj");
    assert_eq!(tonic.roman_numeral, "I");

    let Analysis::Chord(dominant) = &frames[1].analysis else {
        panic!("expected a chord, got {:?}", frames[1].analysis);
    };
    assert_eq!(dominant.roman_numeral, "V⁷");
    assert_eq!(dominant.function_name, "Dominant");
    assert_eq!(frames[1].beat, 1.0);

    assert_eq!(frames[2].analysis, Analysis::Silent);
}

#[test]
fn cadence_as_text() {
    let tables = TheoryTables::new();
    let key = tables.key(0);
    let file = cadence_file();

    let frames = commands::replay(&tables, file.path(), key).unwrap();
    let text = commands::format_frames(&frames, key);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("    0.00  C4 + E4 + G4"));
    assert!(lines[0].ends_with("C4 maj  [I]"));
    assert!(lines[1].starts_with("    1.00  G3 + B3 + D4 + F4"));
    assert!(lines[1].ends_with("[V⁷]"));
    assert_eq!(lines[2], "    2.00  -");
}

#[test]
fn cadence_as_json() {
    let tables = TheoryTables::new();
    let key = tables.key(0);
    let file = cadence_file();

    let frames = commands::replay(&tables, file.path(), key).unwrap();
    let json = serde_json::to_value(&frames).unwrap();

    assert_eq!(json[0]["notes"], serde_json::json!([60, 64, 67]));
    assert_eq!(json[0]["analysis"]["kind"], "chord");
    assert_eq!(json[1]["analysis"]["roman_numeral"], "V⁷");
    assert_eq!(json[2]["analysis"]["kind"], "silent");
}

#[test]
fn missing_file_is_an_error() {
    let tables = TheoryTables::new();
    let dir = tempfile::tempdir().unwrap();
    let err = commands::replay(&tables, &dir.path().join("nope.mid"), tables.key(0)).unwrap_err();
    assert!(format!("{err:#}").contains("nope.mid"));
}
