//! chordscope - live harmonic analysis for a MIDI keyboard
//!
//! Listens to a keyboard through midir, tracks the held notes and shows the
//! chord, Roman numeral and harmonic function in the selected key. Standard
//! MIDI Files can be replayed through the same path offline.

pub mod commands;
pub mod display;
pub mod midi;
pub mod monitor;
pub mod notes;
pub mod replay;

pub use display::{DeviceStatus, MidiLog, MonitorView};
pub use midi::{parse_note_event, select_input_port, MidiError, MidiPortInfo, NoteEvent, NoteEventKind};
pub use monitor::MonitorState;
pub use notes::ActiveNotes;
pub use replay::{parse_note_timeline, replay_frames, ReplayError, ReplayFrame};
