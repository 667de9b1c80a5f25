//! Layered configuration loading for chordscope.
//!
//! # Configuration Philosophy
//!
//! Configuration is split into two categories:
//!
//! - **Infrastructure** (`InfraConfig`): MIDI client and port selection,
//!   display timing, log level. Fixed once the process is running.
//!
//! - **Bootstrap** (`BootstrapConfig`): the key the monitor starts in.
//!   After startup the user can switch keys; the runtime owns that state.
//!
//! # Usage
//!
//! ```rust,no_run
//! use chordconf::ChordscopeConfig;
//!
//! let config = ChordscopeConfig::load().expect("Failed to load config");
//!
//! println!("poll every {} ms", config.infra.midi.poll_interval_ms);
//! println!("starting key: {}", config.bootstrap.key);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins, key by key):
//! 1. `/etc/chordscope/config.toml` (system)
//! 2. `~/.config/chordscope/config.toml` (user)
//! 3. `./chordscope.toml` (local override, or `--config <path>` instead)
//! 4. Environment variables (`CHORDSCOPE_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [midi]
//! client_name = "chordscope"
//! preferred_ports = ["Recital Play", "Keyboard", "Piano"]
//! ignored_ports = ["Midi Through"]
//! poll_interval_ms = 1000
//!
//! [display]
//! clear_delay_ms = 100
//! log_capacity = 50
//!
//! [telemetry]
//! log_level = "info"
//!
//! [bootstrap]
//! key = "C Major"
//! ```

pub mod bootstrap;
pub mod infra;
pub mod loader;

pub use bootstrap::BootstrapConfig;
pub use infra::{DisplayConfig, InfraConfig, MidiConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete chordscope configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordscopeConfig {
    /// Infrastructure - cannot change at runtime.
    #[serde(flatten)]
    pub infra: InfraConfig,

    /// Bootstrap - seeds runtime state.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl ChordscopeConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/chordscope/config.toml`
    /// 3. `~/.config/chordscope/config.toml`
    /// 4. `./chordscope.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load with `config_path` standing in for `./chordscope.toml`.
    /// System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and return information about sources.
    pub fn load_with_sources() -> Result<(Self, ConfigSources), ConfigError> {
        Self::load_with_sources_from(None)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let files = loader::discover_config_files_with_override(config_path);
        let (mut config, mut sources) = Self::load_files(&files)?;

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Merge exactly `files`, in order, over the defaults. No discovery and
    /// no environment overrides.
    pub fn load_files(files: &[PathBuf]) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in files {
            let table = loader::load_table(path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path.clone());
        }

        let origin = sources
            .files
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<defaults>"));
        let config = loader::config_from_table(merged, &origin)?;

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        // Build TOML manually for nicer formatting
        let mut output = String::new();
        let midi = &self.infra.midi;

        output.push_str("# chordscope configuration\n\n");

        output.push_str("[midi]\n");
        output.push_str(&format!("client_name = {}\n", quoted(&midi.client_name)));
        output.push_str(&format!(
            "preferred_ports = {}\n",
            quoted_list(&midi.preferred_ports)
        ));
        output.push_str(&format!(
            "ignored_ports = {}\n",
            quoted_list(&midi.ignored_ports)
        ));
        output.push_str(&format!("poll_interval_ms = {}\n", midi.poll_interval_ms));

        output.push_str("\n[display]\n");
        output.push_str(&format!(
            "clear_delay_ms = {}\n",
            self.infra.display.clear_delay_ms
        ));
        output.push_str(&format!(
            "log_capacity = {}\n",
            self.infra.display.log_capacity
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "log_level = {}\n",
            quoted(&self.infra.telemetry.log_level)
        ));

        output.push_str("\n[bootstrap]\n");
        output.push_str(&format!("key = {}\n", quoted(&self.bootstrap.key)));

        output
    }
}

fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn quoted_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| quoted(v)).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChordscopeConfig::default();
        assert_eq!(config.infra.midi.poll_interval_ms, 1000);
        assert_eq!(config.infra.display.log_capacity, 50);
        assert_eq!(config.bootstrap.key, "C Major");
    }

    #[test]
    fn test_to_toml() {
        let config = ChordscopeConfig::default();
        let toml = config.to_toml();
        assert!(toml.contains("[midi]"));
        assert!(toml.contains("[display]"));
        assert!(toml.contains("[bootstrap]"));
        assert!(toml.contains("\"Recital Play\""));
    }

    #[test]
    fn test_to_toml_parses_back_to_the_same_config() {
        let mut config = ChordscopeConfig::default();
        config.bootstrap.key = "B♭ Major".to_string();
        config.infra.midi.preferred_ports = vec!["My \"Quoted\" Piano".to_string()];

        let table: toml::Table = config.to_toml().parse().unwrap();
        let parsed = loader::config_from_table(table, Path::new("rendered")).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_files_with_no_files_is_defaults() {
        let (config, sources) = ChordscopeConfig::load_files(&[]).unwrap();
        assert_eq!(config, ChordscopeConfig::default());
        assert!(sources.files.is_empty());
    }
}
