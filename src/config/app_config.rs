// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Application configuration (startup behavior).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Preset applied at startup. `None` picks the first catalog preset.
    #[serde(default)]
    pub startup_preset: Option<String>,
    /// Start with the transport playing.
    #[serde(default)]
    pub autoplay: bool,
    /// How long to wait for a channel's readiness signal before reporting it
    /// as overdue. Buffered preset volumes are kept either way.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
    /// Base directory for relative sound paths.
    #[serde(default)]
    pub sounds_dir: Option<PathBuf>,
}

fn default_ready_timeout_ms() -> u64 {
    5000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            startup_preset: None,
            autoplay: false,
            ready_timeout_ms: default_ready_timeout_ms(),
            sounds_dir: None,
        }
    }
}

impl GeneralConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
}

impl AppConfig {
    /// Load config from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
