// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Preset definitions (named per-channel volume targets).

use crate::config::persistence::ConfigError;
use crate::config::sounds::ChannelId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Target volume for one channel inside a preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeAssignment {
    pub channel: ChannelId,
    pub volume: f32,
}

impl VolumeAssignment {
    pub fn new(channel: ChannelId, volume: f32) -> Self {
        Self { channel, volume }
    }
}

/// A named preset. Channels it does not mention keep their current volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetDescriptor {
    pub name: String,
    #[serde(default)]
    pub assignments: Vec<VolumeAssignment>,
}

impl PresetDescriptor {
    pub fn new(name: impl Into<String>, assignments: Vec<VolumeAssignment>) -> Self {
        Self {
            name: name.into(),
            assignments,
        }
    }

    /// Farm in the foreground, fire silent.
    pub fn welcome() -> Self {
        Self::new(
            "welcome",
            vec![VolumeAssignment::new(1, 0.6), VolumeAssignment::new(2, 0.0)],
        )
    }

    /// Fire only.
    pub fn fire() -> Self {
        Self::new(
            "Fire",
            vec![VolumeAssignment::new(1, 0.0), VolumeAssignment::new(2, 0.6)],
        )
    }

    /// Target volume for `channel`, if this preset assigns one.
    pub fn volume_for(&self, channel: ChannelId) -> Option<f32> {
        self.assignments
            .iter()
            .rev()
            .find(|a| a.channel == channel)
            .map(|a| a.volume)
    }
}

/// Ordered, read-only list of presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetCatalog {
    #[serde(default)]
    pub presets: Vec<PresetDescriptor>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetCatalog {
    pub fn new(presets: Vec<PresetDescriptor>) -> Self {
        Self { presets }
    }

    /// Get all built-in presets.
    pub fn builtin() -> Self {
        Self {
            presets: vec![PresetDescriptor::welcome(), PresetDescriptor::fire()],
        }
    }

    /// Exact, case-sensitive lookup: preset names are selection keys.
    pub fn find(&self, name: &str) -> Option<&PresetDescriptor> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn first(&self) -> Option<&PresetDescriptor> {
        self.presets.first()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Names must be unique and every assigned volume must lie in `[0, 1]`.
    ///
    /// References to unknown channels are not checked here; the mixer skips
    /// them when the preset is applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for preset in &self.presets {
            if !seen.insert(preset.name.as_str()) {
                return Err(ConfigError::DuplicatePreset(preset.name.clone()));
            }
            for a in &preset.assignments {
                if !(0.0..=1.0).contains(&a.volume) {
                    return Err(ConfigError::VolumeOutOfRange {
                        context: format!("preset '{}' channel {}", preset.name, a.channel),
                        volume: a.volume,
                    });
                }
            }
        }
        Ok(())
    }

    /// Load from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
