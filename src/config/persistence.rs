// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration loading.
//!
//! Catalogs are read once at startup. User volume changes are never written
//! back.

use crate::config::{AppConfig, ChannelId, PresetCatalog, SoundCatalog};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Duplicate sound id {0}")]
    DuplicateSoundId(ChannelId),
    #[error("Duplicate preset name '{0}'")]
    DuplicatePreset(String),
    #[error("Volume {volume} out of range for {context}")]
    VolumeOutOfRange { context: String, volume: f32 },
}

/// Locates and reads the configuration files.
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager rooted at the platform config directory.
    pub fn new() -> Result<Self, ConfigError> {
        let project_dirs =
            ProjectDirs::from("", "", "ambimix").ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_dir(project_dirs.config_dir()))
    }

    /// Create a config manager rooted at an explicit directory.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the path to the main config file.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn sounds_path(&self) -> PathBuf {
        self.config_dir.join("sounds.toml")
    }

    pub fn presets_path(&self) -> PathBuf {
        self.config_dir.join("presets.toml")
    }

    /// Load the application config.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let path = self.config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Ok(AppConfig::from_toml(&content)?)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(AppConfig::default())
        }
    }

    /// Load the sound catalog, falling back to the built-in one.
    pub fn load_sounds(&self) -> Result<SoundCatalog, ConfigError> {
        let path = self.sounds_path();
        let catalog = if path.exists() {
            let content = fs::read_to_string(&path)?;
            SoundCatalog::from_toml(&content)?
        } else {
            debug!("No sound catalog at {}, using built-in", path.display());
            SoundCatalog::builtin()
        };
        catalog.validate()?;
        info!("Loaded {} sounds", catalog.len());
        Ok(catalog)
    }

    /// Load the preset catalog, falling back to the built-in one.
    pub fn load_presets(&self) -> Result<PresetCatalog, ConfigError> {
        let path = self.presets_path();
        let catalog = if path.exists() {
            let content = fs::read_to_string(&path)?;
            PresetCatalog::from_toml(&content)?
        } else {
            debug!("No preset catalog at {}, using built-in", path.display());
            PresetCatalog::builtin()
        };
        catalog.validate()?;
        info!("Loaded {} presets", catalog.len());
        Ok(catalog)
    }

    /// Write the built-in catalogs and a default config if none exist yet.
    pub fn write_defaults(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;
        if !self.config_path().exists() {
            fs::write(self.config_path(), AppConfig::default().to_toml()?)?;
        }
        if !self.sounds_path().exists() {
            fs::write(self.sounds_path(), SoundCatalog::builtin().to_toml()?)?;
        }
        if !self.presets_path().exists() {
            fs::write(self.presets_path(), PresetCatalog::builtin().to_toml()?)?;
        }
        Ok(())
    }
}

/// Resolve a catalog path against the configured sounds directory.
pub fn resolve_sound_path(sounds_dir: Option<&Path>, path: &str) -> PathBuf {
    let path = Path::new(path);
    match sounds_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}
