//! CLI command implementations

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chordconf::{ChordscopeConfig, MidiConfig};
use harmony::{describe_notes, parse_note, Analysis, KeySignature, TheoryTables};
use serde::Serialize;

use crate::midi::{list_input_ports, select_input_port, MidiPortInfo};
use crate::replay::{replay_file, ReplayFrame};

/// Resolve the key from `--key`, falling back to the configured one.
pub fn resolve_key<'a>(
    tables: &'a TheoryTables,
    requested: Option<&str>,
    config: &ChordscopeConfig,
) -> Result<(usize, &'a KeySignature)> {
    let query = requested.unwrap_or(config.bootstrap.key.as_str());
    tables
        .find_key(query)
        .with_context(|| format!("Cannot use key '{}' (run `chordscope keys` for the list)", query))
}

/// One-shot analysis, as printed by `chordscope analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeReport {
    pub key: String,
    pub notes: BTreeSet<u8>,
    pub analysis: Analysis,
}

/// Parse note names and analyze them as one held snapshot. Duplicates
/// collapse.
pub fn analyze_notes(tables: &TheoryTables, notes: &[String], key: &KeySignature) -> Result<AnalyzeReport> {
    let held = notes
        .iter()
        .map(|text| parse_note(text))
        .collect::<Result<BTreeSet<u8>, _>>()
        .context("Failed to parse notes")?;

    let analysis = tables.analyzer().analyze_snapshot(&held, key);
    Ok(AnalyzeReport {
        key: key.name.clone(),
        notes: held,
        analysis,
    })
}

pub fn format_report(report: &AnalyzeReport, key: &KeySignature) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Key:      {}", report.key);
    let _ = writeln!(out, "Notes:    {}", describe_notes(&report.notes, key));

    match &report.analysis {
        Analysis::Silent => {
            let _ = writeln!(out, "(fewer than two notes)");
        }
        Analysis::Interval { label } => {
            let _ = writeln!(out, "Interval: {}", label);
        }
        Analysis::Chord(chord) => {
            let _ = writeln!(out, "Chord:    {}", chord.chord_name);
            let _ = writeln!(out, "Roman:    {}", chord.roman_numeral);
            if !chord.function_name.is_empty() {
                let _ = writeln!(out, "Function: {}", chord.function_name);
            }
            if !chord.accidental_notes.is_empty() {
                let _ = writeln!(
                    out,
                    "Outside:  {}",
                    describe_notes(&chord.accidental_notes, key)
                );
            }
        }
    }
    out
}

/// Numbered key list; the numbers are accepted wherever a key is.
pub fn format_keys(tables: &TheoryTables) -> String {
    tables
        .keys
        .iter()
        .enumerate()
        .map(|(index, key)| format!("{:>2}  {}\n", index, key.name))
        .collect()
}

/// Port list with the one the monitor would open marked `*`.
pub fn format_ports(ports: &[MidiPortInfo], midi: &MidiConfig) -> String {
    if ports.is_empty() {
        return "No MIDI input ports found\n".to_string();
    }

    let selected = select_input_port(ports, &midi.preferred_ports, &midi.ignored_ports);
    ports
        .iter()
        .map(|port| {
            let marker = if selected == Some(port) { "*" } else { " " };
            format!("{} {:>2}  {}\n", marker, port.index, port.name)
        })
        .collect()
}

pub fn ports(config: &ChordscopeConfig) -> Result<String> {
    let midi = &config.infra.midi;
    let ports = list_input_ports(&midi.client_name).context("Failed to list MIDI inputs")?;
    Ok(format_ports(&ports, midi))
}

/// Replay frames as text: beat, held notes, analysis.
pub fn format_frames(frames: &[ReplayFrame], key: &KeySignature) -> String {
    frames
        .iter()
        .map(|frame| {
            let notes = if frame.notes.is_empty() {
                "-".to_string()
            } else {
                describe_notes(&frame.notes, key)
            };
            let mut line = format!("{:>8.2}  {:<28} {}", frame.beat, notes, frame.analysis.display());
            if let Analysis::Chord(chord) = &frame.analysis {
                let _ = write!(line, "  [{}]", chord.roman_numeral);
            }
            format!("{}\n", line.trim_end())
        })
        .collect()
}

pub fn replay(tables: &TheoryTables, path: &Path, key: &KeySignature) -> Result<Vec<ReplayFrame>> {
    replay_file(path, &tables.analyzer(), key)
        .with_context(|| format!("Failed to replay {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn notes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn configured_key_is_the_fallback() {
        let tables = TheoryTables::new();
        let mut config = ChordscopeConfig::default();
        config.bootstrap.key = "A minor".to_string();

        let (_, key) = resolve_key(&tables, None, &config).unwrap();
        assert_eq!(key.name, "A minor");

        let (_, key) = resolve_key(&tables, Some("G Major"), &config).unwrap();
        assert_eq!(key.name, "G Major");
    }

    #[test]
    fn unknown_key_mentions_the_query() {
        let tables = TheoryTables::new();
        let err = resolve_key(&tables, Some("H dorian"), &ChordscopeConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("H dorian"));
    }

    #[test]
    fn analyze_text_report() {
        let tables = TheoryTables::new();
        let key = tables.key(0);
        let report = analyze_notes(&tables, &notes(&["D4", "F#4", "A4"]), key).unwrap();

        assert_eq!(
            format_report(&report, key),
            "Key:      C Major\n\
             Notes:    D4 + F#4 + A4\n\
             Chord:    D4 maj\n\
             Roman:    V/V\n\
             Function: Secondary Dominant\n\
             Outside:  F#4\n"
        );
    }

    #[test]
    fn analyze_collapses_duplicates() {
        let tables = TheoryTables::new();
        let report = analyze_notes(&tables, &notes(&["60", "C4", "G4"]), tables.key(0)).unwrap();
        assert_eq!(report.notes, BTreeSet::from([60, 67]));
        assert_eq!(report.analysis.display(), "C4 perfect 5th");
    }

    #[test]
    fn analyze_rejects_bad_notes() {
        let tables = TheoryTables::new();
        assert!(analyze_notes(&tables, &notes(&["C4", "X9"]), tables.key(0)).is_err());
    }

    #[test]
    fn key_list_is_numbered() {
        let listing = format_keys(&TheoryTables::new());
        assert_eq!(listing.lines().count(), 30);
        assert_eq!(listing.lines().next(), Some(" 0  C Major"));
    }

    #[test]
    fn port_list_marks_the_selected_port() {
        let ports = vec![
            MidiPortInfo {
                index: 0,
                name: "Midi Through Port-0".to_string(),
            },
            MidiPortInfo {
                index: 1,
                name: "Digital Piano".to_string(),
            },
        ];
        assert_eq!(
            format_ports(&ports, &MidiConfig::default()),
            "   0  Midi Through Port-0\n*  1  Digital Piano\n"
        );
        assert_eq!(
            format_ports(&[], &MidiConfig::default()),
            "No MIDI input ports found\n"
        );
    }
}
