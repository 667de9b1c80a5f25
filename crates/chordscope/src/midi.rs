//! MIDI keyboard input via midir
//!
//! Decodes note messages, picks an input port by name, and forwards
//! decoded events from the midir callback thread into a tokio channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use midir::{MidiInput, MidiInputConnection};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteEventKind {
    NoteOn,
    NoteOff,
}

/// A decoded note message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    pub kind: NoteEventKind,
    pub pitch: u8,
    /// 0 for note-offs that arrived as note-on with zero velocity
    pub velocity: u8,
    /// MIDI channel (0-15)
    pub channel: u8,
}

impl NoteEvent {
    pub fn note_on(channel: u8, pitch: u8, velocity: u8) -> Self {
        Self {
            kind: NoteEventKind::NoteOn,
            pitch,
            velocity,
            channel,
        }
    }

    pub fn note_off(channel: u8, pitch: u8) -> Self {
        Self {
            kind: NoteEventKind::NoteOff,
            pitch,
            velocity: 0,
            channel,
        }
    }

    pub fn is_on(&self) -> bool {
        self.kind == NoteEventKind::NoteOn
    }
}

/// Information about a discovered MIDI port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiPortInfo {
    /// Port index at the time of listing
    pub index: usize,
    pub name: String,
}

/// Error type for MIDI operations
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("Failed to initialize MIDI: {0}")]
    InitFailed(String),

    #[error("Port not found: {0}")]
    PortNotFound(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Parse raw MIDI bytes into a note event.
///
/// Only note-on and note-off are decoded; a note-on with velocity 0 is a
/// note-off. Anything shorter than three bytes is ignored.
pub fn parse_note_event(data: &[u8]) -> Option<NoteEvent> {
    let &[status, pitch, velocity, ..] = data else {
        return None;
    };

    let channel = status & 0x0F;
    match status & 0xF0 {
        0x90 if velocity > 0 => Some(NoteEvent::note_on(channel, pitch, velocity)),
        0x90 | 0x80 => Some(NoteEvent::note_off(channel, pitch)),
        _ => {
            debug!("Ignoring MIDI message type: {:02X}", status);
            None
        }
    }
}

/// List available MIDI input ports
pub fn list_input_ports(client_name: &str) -> Result<Vec<MidiPortInfo>, MidiError> {
    let midi_in = MidiInput::new(&format!("{client_name}-scan"))
        .map_err(|e| MidiError::InitFailed(e.to_string()))?;

    let ports: Vec<MidiPortInfo> = midi_in
        .ports()
        .iter()
        .enumerate()
        .filter_map(|(i, port)| {
            midi_in
                .port_name(port)
                .ok()
                .map(|name| MidiPortInfo { index: i, name })
        })
        .collect();

    Ok(ports)
}

/// Choose the port to listen on.
///
/// The first port (in listing order) whose name contains any `preferred`
/// pattern wins outright. Failing that, the first port matching none of
/// the `ignored` patterns.
pub fn select_input_port<'a>(
    ports: &'a [MidiPortInfo],
    preferred: &[String],
    ignored: &[String],
) -> Option<&'a MidiPortInfo> {
    let contains_any =
        |name: &str, patterns: &[String]| patterns.iter().any(|p| name.contains(p.as_str()));

    let mut fallback = None;
    for port in ports {
        if contains_any(&port.name, preferred) {
            return Some(port);
        }
        if fallback.is_none() && !contains_any(&port.name, ignored) {
            fallback = Some(port);
        }
    }
    fallback
}

/// Active MIDI input connection
///
/// Decoded note events are sent on the channel from midir's callback
/// thread. Dropping the connection closes the port.
pub struct ActiveMidiInput {
    /// Connection (dropped to close)
    connection: Option<MidiInputConnection<()>>,
    pub port_name: String,
    /// Note messages forwarded so far
    pub messages_received: Arc<AtomicU64>,
}

impl ActiveMidiInput {
    /// Open the input port named exactly `port_name`.
    pub fn open(
        client_name: &str,
        port_name: &str,
        sender: UnboundedSender<NoteEvent>,
    ) -> Result<Self, MidiError> {
        let midi_in =
            MidiInput::new(client_name).map_err(|e| MidiError::InitFailed(e.to_string()))?;

        let ports = midi_in.ports();
        let port = ports
            .iter()
            .find(|p| midi_in.port_name(p).map(|n| n == port_name).unwrap_or(false))
            .ok_or_else(|| MidiError::PortNotFound(port_name.to_string()))?;

        let messages_received = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&messages_received);

        let connection = midi_in
            .connect(
                port,
                &format!("{client_name}-input"),
                move |_timestamp_us, data, _| {
                    if let Some(event) = parse_note_event(data) {
                        counter.fetch_add(1, Ordering::Relaxed);
                        // receiver gone means the monitor is shutting down
                        let _ = sender.send(event);
                    }
                },
                (),
            )
            .map_err(|e| MidiError::ConnectionFailed(e.to_string()))?;

        info!("Opened MIDI input: {}", port_name);

        Ok(Self {
            connection: Some(connection),
            port_name: port_name.to_string(),
            messages_received,
        })
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Close the connection
    pub fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            info!(
                "Closed MIDI input: {} ({} messages)",
                self.port_name,
                self.messages_received.load(Ordering::Relaxed)
            );
        }
    }
}

impl Drop for ActiveMidiInput {
    fn drop(&mut self) {
        self.close();
    }
}
