// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Message types for control-surface actions.

use crate::config::ChannelId;
use thiserror::Error;

/// All user actions the control surface can issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // ==================== Transport ====================
    Play,
    Pause,
    TogglePlay,

    // ==================== Presets ====================
    /// Preset selected by name.
    PresetSelected(String),
    ListPresets,

    // ==================== Channels ====================
    /// Raw slider value for a channel (channel_id, input).
    ChannelVolumeChanged(ChannelId, String),

    // ==================== Display ====================
    Status,
    StatusJson,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Invalid channel id '{0}'")]
    InvalidChannel(String),
}

impl Message {
    /// Parse one line typed into the control surface.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "play" => Ok(Message::Play),
            "pause" => Ok(Message::Pause),
            "toggle" | "p" => Ok(Message::TogglePlay),
            // Preset names may contain spaces.
            "preset" if rest.is_empty() => Err(ParseError::MissingArgument("preset name")),
            "preset" => Ok(Message::PresetSelected(rest.to_string())),
            "presets" => Ok(Message::ListPresets),
            "volume" | "vol" => {
                let mut args = rest.split_whitespace();
                let id = args.next().ok_or(ParseError::MissingArgument("channel id"))?;
                let value = args.next().ok_or(ParseError::MissingArgument("volume"))?;
                let id = id
                    .parse::<ChannelId>()
                    .map_err(|_| ParseError::InvalidChannel(id.to_string()))?;
                Ok(Message::ChannelVolumeChanged(id, value.to_string()))
            }
            "status" | "s" => Ok(Message::Status),
            "json" => Ok(Message::StatusJson),
            "help" | "?" => Ok(Message::Help),
            "quit" | "exit" | "q" => Ok(Message::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}
