//! Infrastructure configuration - fixed for the lifetime of the process.

use serde::{Deserialize, Serialize};

/// MIDI input selection and device polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiConfig {
    /// Client name registered with the MIDI backend.
    /// Default: chordscope
    #[serde(default = "MidiConfig::default_client_name")]
    pub client_name: String,

    /// Substrings of port names to prefer, in priority order.
    /// Default: ["Recital Play", "Keyboard", "Piano"]
    #[serde(default = "MidiConfig::default_preferred_ports")]
    pub preferred_ports: Vec<String>,

    /// Substrings of port names never chosen as a fallback.
    /// Default: ["Midi Through"]
    #[serde(default = "MidiConfig::default_ignored_ports")]
    pub ignored_ports: Vec<String>,

    /// How often to check for device connect/disconnect.
    /// Default: 1000
    #[serde(default = "MidiConfig::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl MidiConfig {
    fn default_client_name() -> String {
        "chordscope".to_string()
    }

    fn default_preferred_ports() -> Vec<String> {
        ["Recital Play", "Keyboard", "Piano"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn default_ignored_ports() -> Vec<String> {
        vec!["Midi Through".to_string()]
    }

    fn default_poll_interval_ms() -> u64 {
        1000
    }
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            client_name: Self::default_client_name(),
            preferred_ports: Self::default_preferred_ports(),
            ignored_ports: Self::default_ignored_ports(),
            poll_interval_ms: Self::default_poll_interval_ms(),
        }
    }
}

/// Monitor display behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Silence before the chord display is cleared.
    /// Default: 100
    #[serde(default = "DisplayConfig::default_clear_delay_ms")]
    pub clear_delay_ms: u64,

    /// Entries kept in the MIDI message log.
    /// Default: 50
    #[serde(default = "DisplayConfig::default_log_capacity")]
    pub log_capacity: usize,
}

impl DisplayConfig {
    fn default_clear_delay_ms() -> u64 {
        100
    }

    fn default_log_capacity() -> usize {
        50
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            clear_delay_ms: Self::default_clear_delay_ms(),
            log_capacity: Self::default_log_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// All infrastructure settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfraConfig {
    #[serde(default)]
    pub midi: MidiConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
