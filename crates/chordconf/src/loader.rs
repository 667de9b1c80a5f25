//! Config file discovery, table merging, and environment variable overlay.

use crate::{ChordscopeConfig, ConfigError};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// A CLI path replaces `./chordscope.toml` and is returned even when it
/// does not exist, so that loading reports it instead of ignoring it.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/chordscope/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("chordscope/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(expand_path(&path.to_string_lossy()));
        return files;
    }

    let local = PathBuf::from("chordscope.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read and parse one TOML file into a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents
        .parse::<toml::Table>()
        .map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in `overlay` replaces the one in `base`, arrays included.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Deserialize a merged table, filling anything missing with defaults.
///
/// `origin` names the file (or files) blamed when a value has the wrong type.
pub fn config_from_table(table: toml::Table, origin: &Path) -> Result<ChordscopeConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
}

/// Apply `CHORDSCOPE_*` (and `RUST_LOG`) overrides from the process environment.
pub fn apply_env_overrides(config: &mut ChordscopeConfig, sources: &mut ConfigSources) {
    apply_env_overrides_with(config, sources, |name| env::var(name).ok());
}

/// Apply overrides using `lookup` in place of the process environment.
///
/// A variable is recorded in `sources` only when its value was applied;
/// numbers that fail to parse are skipped.
pub fn apply_env_overrides_with(
    config: &mut ChordscopeConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let take = |name: &str| lookup(name).map(|value| (name.to_string(), value));
    let mut applied = Vec::new();

    // MIDI
    if let Some((name, v)) = take("CHORDSCOPE_MIDI_CLIENT") {
        config.infra.midi.client_name = v;
        applied.push(name);
    }
    if let Some((name, v)) = take("CHORDSCOPE_PREFERRED_PORTS") {
        config.infra.midi.preferred_ports = split_list(&v);
        applied.push(name);
    }
    if let Some((name, v)) = take("CHORDSCOPE_IGNORED_PORTS") {
        config.infra.midi.ignored_ports = split_list(&v);
        applied.push(name);
    }
    if let Some((name, v)) = take("CHORDSCOPE_POLL_INTERVAL_MS") {
        if let Ok(ms) = v.trim().parse() {
            config.infra.midi.poll_interval_ms = ms;
            applied.push(name);
        }
    }

    // Display
    if let Some((name, v)) = take("CHORDSCOPE_CLEAR_DELAY_MS") {
        if let Ok(ms) = v.trim().parse() {
            config.infra.display.clear_delay_ms = ms;
            applied.push(name);
        }
    }
    if let Some((name, v)) = take("CHORDSCOPE_LOG_CAPACITY") {
        if let Ok(n) = v.trim().parse() {
            config.infra.display.log_capacity = n;
            applied.push(name);
        }
    }

    // Telemetry
    if let Some((name, v)) = take("CHORDSCOPE_LOG_LEVEL") {
        config.infra.telemetry.log_level = v;
        applied.push(name);
    }
    // Also support RUST_LOG
    if let Some((name, v)) = take("RUST_LOG") {
        config.infra.telemetry.log_level = v;
        applied.push(name);
    }

    // Bootstrap
    if let Some((name, v)) = take("CHORDSCOPE_KEY") {
        config.bootstrap.key = v;
        applied.push(name);
    }

    sources.env_overrides.extend(applied);
}

/// Comma-separated list, entries trimmed, empties dropped.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn table(text: &str) -> toml::Table {
        parse_table(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/test/path");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let expanded = expand_path("/absolute/path");
        assert_eq!(expanded, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files();
    }

    #[test]
    fn test_cli_path_is_kept_even_if_missing() {
        let missing = Path::new("/nonexistent/chordscope-test.toml");
        let files = discover_config_files_with_override(Some(missing));
        assert_eq!(files.last(), Some(&missing.to_path_buf()));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = config_from_table(
            table("[display]\nclear_delay_ms = 250\n"),
            Path::new("test.toml"),
        )
        .unwrap();
        assert_eq!(config.infra.display.clear_delay_ms, 250);
        // Other values should be defaults
        assert_eq!(config.infra.display.log_capacity, 50);
        assert_eq!(config.infra.midi.poll_interval_ms, 1000);
        assert_eq!(config.bootstrap.key, "C Major");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[midi]
client_name = "studio"
preferred_ports = ["Digital Piano"]
ignored_ports = ["Midi Through", "Virtual"]
poll_interval_ms = 500

[display]
clear_delay_ms = 0
log_capacity = 10

[telemetry]
log_level = "debug"

[bootstrap]
key = "E♭ Major"
"#;
        let config = config_from_table(table(toml), Path::new("test.toml")).unwrap();

        assert_eq!(config.infra.midi.client_name, "studio");
        assert_eq!(config.infra.midi.preferred_ports, vec!["Digital Piano"]);
        assert_eq!(config.infra.midi.ignored_ports.len(), 2);
        assert_eq!(config.infra.midi.poll_interval_ms, 500);
        assert_eq!(config.infra.display.clear_delay_ms, 0);
        assert_eq!(config.infra.display.log_capacity, 10);
        assert_eq!(config.infra.telemetry.log_level, "debug");
        assert_eq!(config.bootstrap.key, "E♭ Major");
    }

    #[test]
    fn test_wrong_type_is_a_parse_error() {
        let err = config_from_table(
            table("[midi]\npoll_interval_ms = \"soon\"\n"),
            Path::new("bad.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_merge_is_key_by_key() {
        let mut base = table("[midi]\nclient_name = \"a\"\npoll_interval_ms = 10\n");
        merge_tables(&mut base, table("[midi]\npoll_interval_ms = 20\n"));

        let config = config_from_table(base, Path::new("merged")).unwrap();
        assert_eq!(config.infra.midi.client_name, "a");
        assert_eq!(config.infra.midi.poll_interval_ms, 20);
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let mut base = table("[midi]\npreferred_ports = [\"A\", \"B\"]\n");
        merge_tables(&mut base, table("[midi]\npreferred_ports = [\"C\"]\n"));

        let config = config_from_table(base, Path::new("merged")).unwrap();
        assert_eq!(config.infra.midi.preferred_ports, vec!["C"]);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CHORDSCOPE_KEY", "A minor"),
            ("CHORDSCOPE_PREFERRED_PORTS", "Roland, ,Yamaha"),
            ("CHORDSCOPE_CLEAR_DELAY_MS", "300"),
            ("CHORDSCOPE_LOG_LEVEL", "warn"),
        ]
        .into_iter()
        .collect();

        let mut config = ChordscopeConfig::default();
        let mut sources = ConfigSources::default();
        apply_env_overrides_with(&mut config, &mut sources, |name| {
            env.get(name).map(|v| v.to_string())
        });

        assert_eq!(config.bootstrap.key, "A minor");
        assert_eq!(config.infra.midi.preferred_ports, vec!["Roland", "Yamaha"]);
        assert_eq!(config.infra.display.clear_delay_ms, 300);
        assert_eq!(config.infra.telemetry.log_level, "warn");
        assert_eq!(sources.env_overrides.len(), 4);
    }

    #[test]
    fn test_rust_log_wins_over_chordscope_log_level() {
        let mut config = ChordscopeConfig::default();
        let mut sources = ConfigSources::default();
        apply_env_overrides_with(&mut config, &mut sources, |name| match name {
            "CHORDSCOPE_LOG_LEVEL" => Some("warn".to_string()),
            "RUST_LOG" => Some("harmony=trace".to_string()),
            _ => None,
        });
        assert_eq!(config.infra.telemetry.log_level, "harmony=trace");
    }

    #[test]
    fn test_unparseable_numbers_are_not_reported() {
        let mut config = ChordscopeConfig::default();
        let mut sources = ConfigSources::default();
        apply_env_overrides_with(&mut config, &mut sources, |name| match name {
            "CHORDSCOPE_POLL_INTERVAL_MS" => Some("soon".to_string()),
            "CHORDSCOPE_LOG_CAPACITY" => Some(" 20 ".to_string()),
            _ => None,
        });

        assert_eq!(config.infra.midi.poll_interval_ms, 1000);
        assert_eq!(config.infra.display.log_capacity, 20);
        assert_eq!(sources.env_overrides, vec!["CHORDSCOPE_LOG_CAPACITY"]);
    }
}
