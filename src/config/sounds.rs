// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sound catalog: the channels available to the mixer.

use crate::config::persistence::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable identifier of a sound channel.
pub type ChannelId = u32;

/// A single loopable sound the mixer can play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundDescriptor {
    pub id: ChannelId,
    /// Audio resource locator, relative paths resolve against `sounds_dir`.
    pub path: String,
    /// Display label.
    pub name: String,
    /// Volume the channel starts at (0.0 to 1.0).
    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

fn default_volume() -> f32 {
    0.4
}

impl SoundDescriptor {
    pub fn new(id: ChannelId, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            name: name.into(),
            default_volume: default_volume(),
        }
    }

    pub fn with_default_volume(mut self, volume: f32) -> Self {
        self.default_volume = volume;
        self
    }
}

/// Ordered, read-only list of sounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCatalog {
    #[serde(default)]
    pub sounds: Vec<SoundDescriptor>,
}

impl Default for SoundCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SoundCatalog {
    pub fn new(sounds: Vec<SoundDescriptor>) -> Self {
        Self { sounds }
    }

    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        Self {
            sounds: vec![
                SoundDescriptor::new(1, "sounds/outdoor-farm.mp3", "Outdoor Farm"),
                SoundDescriptor::new(2, "sounds/fire.m4a", "Fire"),
            ],
        }
    }

    pub fn get(&self, id: ChannelId) -> Option<&SoundDescriptor> {
        self.sounds.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SoundDescriptor> {
        self.sounds.iter()
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Ids must be unique and default volumes must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for sound in &self.sounds {
            if !seen.insert(sound.id) {
                return Err(ConfigError::DuplicateSoundId(sound.id));
            }
            if !(0.0..=1.0).contains(&sound.default_volume) {
                return Err(ConfigError::VolumeOutOfRange {
                    context: format!("default volume of sound {}", sound.id),
                    volume: sound.default_volume,
                });
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
