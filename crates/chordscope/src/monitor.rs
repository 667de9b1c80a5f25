//! The live monitor: keyboard in, chord analysis on screen.
//!
//! One task owns all state. MIDI events arrive over a channel from the
//! midir callback thread; device presence is polled on an interval; typed
//! lines on stdin switch the key.

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use chordconf::{ChordscopeConfig, DisplayConfig, MidiConfig};
use harmony::{HarmonyError, KeySignature, TheoryTables};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::display::{DeviceStatus, MonitorView};
use crate::midi::{list_input_ports, select_input_port, ActiveMidiInput, NoteEvent};
use crate::notes::ActiveNotes;

/// Log lines shown under the status block
const LOG_LINES_SHOWN: usize = 12;

/// Monitor state without any I/O attached.
pub struct MonitorState<'a> {
    tables: &'a TheoryTables,
    key_index: usize,
    notes: ActiveNotes,
    pub view: MonitorView,
}

impl<'a> MonitorState<'a> {
    pub fn new(tables: &'a TheoryTables, key_index: usize, display: &DisplayConfig) -> Self {
        let key = tables.key(key_index);
        Self {
            tables,
            key_index,
            notes: ActiveNotes::new(),
            view: MonitorView::new(
                key.name.clone(),
                Duration::from_millis(display.clear_delay_ms),
                display.log_capacity,
            ),
        }
    }

    pub fn key(&self) -> &'a KeySignature {
        self.tables.key(self.key_index)
    }

    pub fn key_index(&self) -> usize {
        self.key_index
    }

    pub fn held(&self) -> &ActiveNotes {
        &self.notes
    }

    /// Log, track and analyze one note event. Returns whether the screen changed.
    pub fn handle_event(&mut self, event: NoteEvent, now: Instant) -> bool {
        let key = self.key();
        self.view.log_event(&event, key);

        if self.notes.apply(&event) {
            self.refresh(now);
        }
        true
    }

    /// Switch to the key named (or indexed) by `query`, re-analyzing
    /// whatever is held.
    pub fn switch_key(&mut self, query: &str, now: Instant) -> Result<&'a KeySignature, HarmonyError> {
        let (index, key) = self.tables.find_key(query)?;
        self.key_index = index;
        self.view.set_key(key);
        if !self.notes.is_empty() {
            self.refresh(now);
        }
        info!(key = %key, "switched key");
        Ok(key)
    }

    pub fn device_connected(&mut self, port_name: &str) {
        self.notes.clear();
        self.view.set_device(DeviceStatus::Connected(port_name.to_string()));
    }

    /// The device went away: held notes can never be released, so drop them.
    pub fn device_lost(&mut self) {
        self.notes.clear();
        self.view.set_device(DeviceStatus::NotFound);
    }

    /// Returns whether the status changed.
    pub fn device_missing(&mut self) -> bool {
        self.set_status(DeviceStatus::NotFound)
    }

    /// Returns whether the status changed.
    pub fn device_error(&mut self, message: String) -> bool {
        self.notes.clear();
        self.set_status(DeviceStatus::Error(message))
    }

    fn set_status(&mut self, status: DeviceStatus) -> bool {
        if self.view.device == status {
            return false;
        }
        self.view.set_device(status);
        true
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.view.tick(now)
    }

    fn refresh(&mut self, now: Instant) {
        let key = self.key();
        let snapshot = self.notes.snapshot();
        let analysis = self.tables.analyzer().analyze_snapshot(&snapshot, key);
        debug!(notes = ?snapshot, result = analysis.display(), "analyzed snapshot");
        self.view.show(&snapshot, &analysis, key, now);
    }
}

/// Lines typed on stdin, read on a plain thread so shutdown never waits on
/// a blocking read.
fn spawn_stdin_reader() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn redraw(state: &MonitorState<'_>) {
    let mut out = std::io::stdout().lock();
    // clear screen, cursor home
    let frame = format!(
        "\x1b[2J\x1b[H{}\nMIDI Log\n{}\nType a key name or index to switch key, q to quit.\n",
        state.view.render(),
        state.view.render_log(LOG_LINES_SHOWN),
    );
    if let Err(e) = out.write_all(frame.as_bytes()).and_then(|_| out.flush()) {
        warn!("Failed to draw monitor: {}", e);
    }
}

/// Reconcile the open input with the ports currently present.
fn poll_device(
    state: &mut MonitorState<'_>,
    input: &mut Option<ActiveMidiInput>,
    events: &mut UnboundedReceiver<NoteEvent>,
    sender: &UnboundedSender<NoteEvent>,
    midi: &MidiConfig,
) -> bool {
    let ports = match list_input_ports(&midi.client_name) {
        Ok(ports) => ports,
        Err(e) => {
            warn!("Error checking MIDI devices: {}", e);
            *input = None;
            return state.device_error(e.to_string());
        }
    };

    if let Some(active) = input.as_ref() {
        if ports.iter().any(|p| p.name == active.port_name) {
            return false;
        }
        info!(port = %active.port_name, "MIDI device disconnected");
        *input = None;
        // stale events from the closed port
        while events.try_recv().is_ok() {}
        state.device_lost();
        return true;
    }

    let Some(port) = select_input_port(&ports, &midi.preferred_ports, &midi.ignored_ports) else {
        return state.device_missing();
    };

    match ActiveMidiInput::open(&midi.client_name, &port.name, sender.clone()) {
        Ok(active) => {
            info!(port = %active.port_name, index = port.index, "MIDI device connected");
            state.device_connected(&active.port_name);
            *input = Some(active);
            true
        }
        Err(e) => {
            warn!("Error connecting to MIDI device: {}", e);
            state.device_error(e.to_string())
        }
    }
}

/// Run the monitor until Ctrl-C or `q` on stdin.
pub async fn run(tables: &TheoryTables, config: &ChordscopeConfig, key_index: usize) -> Result<()> {
    let midi = &config.infra.midi;
    let mut state = MonitorState::new(tables, key_index, &config.infra.display);

    let (sender, mut events) = mpsc::unbounded_channel();
    let mut input: Option<ActiveMidiInput> = None;
    let mut commands = spawn_stdin_reader();

    let mut poll = tokio::time::interval(Duration::from_millis(midi.poll_interval_ms.max(1)));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(key = %state.key(), client = %midi.client_name, "monitor started");
    redraw(&state);

    loop {
        let clear_at = state.view.clear_deadline();
        let clear = tokio::time::sleep_until(
            clear_at
                .map(tokio::time::Instant::from_std)
                .unwrap_or_else(tokio::time::Instant::now),
        );

        let dirty = tokio::select! {
            Some(event) = events.recv() => state.handle_event(event, Instant::now()),
            _ = poll.tick() => {
                poll_device(&mut state, &mut input, &mut events, &sender, midi)
            }
            _ = clear, if clear_at.is_some() => state.tick(Instant::now()),
            Some(line) = commands.recv() => {
                let line = line.trim();
                match line {
                    "" => false,
                    "q" | "quit" => break,
                    query => {
                        if let Err(e) = state.switch_key(query, Instant::now()) {
                            warn!("{}", e);
                        }
                        true
                    }
                }
            }
            _ = &mut ctrl_c => break,
        };

        if dirty {
            redraw(&state);
        }
    }

    if let Some(mut active) = input.take() {
        active.close();
    }
    info!("monitor stopped");
    Ok(())
}
