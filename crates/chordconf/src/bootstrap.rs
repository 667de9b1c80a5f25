//! Bootstrap configuration - seeds runtime state, then runtime owns it.

use serde::{Deserialize, Serialize};

/// Initial analysis settings.
///
/// The monitor starts in `key` but the user may switch keys while it runs;
/// nothing writes the change back here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Key name or table index, e.g. "E♭ Major", "a minor", "15".
    /// Default: C Major
    #[serde(default = "BootstrapConfig::default_key")]
    pub key: String,
}

impl BootstrapConfig {
    fn default_key() -> String {
        "C Major".to_string()
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            key: Self::default_key(),
        }
    }
}
