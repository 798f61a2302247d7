// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration management for AmbiMix.

pub mod app_config;
pub mod persistence;
pub mod presets;
pub mod sounds;

pub use app_config::{AppConfig, GeneralConfig};
pub use persistence::{resolve_sound_path, ConfigError, ConfigManager};
pub use presets::{PresetCatalog, PresetDescriptor, VolumeAssignment};
pub use sounds::{ChannelId, SoundCatalog, SoundDescriptor};
