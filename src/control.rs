// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Text control surface.
//!
//! Applies [`Message`]s to the mixer and renders its state. Holds no playback
//! logic of its own.

use crate::config::ChannelId;
use crate::engine::{ChannelStatus, Mixer, MixerSnapshot, VOLUME_STEP};
use crate::message::Message;
use std::fmt::Write;
use tokio::sync::watch;
use tracing::warn;

pub const HELP: &str = "\
Commands:
  play | pause | toggle     control the transport
  preset <name>             select a preset
  presets                   list presets
  volume <id> <0.0-1.0>     set a channel volume
  status | json             show mixer state
  quit                      exit";

/// Result of dispatching one message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Apply a message to the mixer.
pub fn dispatch(mixer: &mut Mixer, message: Message) -> Reply {
    let text = match message {
        Message::Play => {
            mixer.play();
            "Playing".to_string()
        }
        Message::Pause => {
            mixer.pause();
            "Paused".to_string()
        }
        Message::TogglePlay => {
            mixer.toggle_play();
            let state = if mixer.is_playing() { "Playing" } else { "Paused" };
            state.to_string()
        }
        Message::PresetSelected(name) => match mixer.select_preset(&name) {
            Ok(report) if report.deferred.is_empty() => format!("Preset '{}' applied", name),
            Ok(report) => format!(
                "Preset '{}' applied, {} channel(s) waiting to load",
                name,
                report.deferred.len()
            ),
            Err(e) => e.to_string(),
        },
        Message::ListPresets => render_presets(mixer),
        Message::ChannelVolumeChanged(id, input) => match mixer.slider_input(id, &input) {
            Ok(Some(volume)) => format!("Channel {} volume {:.1}", id, volume),
            Ok(None) => format!("Ignored volume input '{}'", input),
            Err(e) => e.to_string(),
        },
        Message::Status => render_status(&mixer.snapshot()),
        Message::StatusJson => match serde_json::to_string_pretty(&mixer.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize snapshot: {}", e);
                e.to_string()
            }
        },
        Message::Help => HELP.to_string(),
        Message::Quit => return Reply::Quit,
    };
    Reply::Text(text)
}

fn render_presets(mixer: &Mixer) -> String {
    let selected = mixer.selected_preset();
    mixer
        .presets()
        .names()
        .map(|name| {
            let marker = if Some(name) == selected { '*' } else { ' ' };
            format!("{} {}", marker, name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Slider drawn with one cell per volume step.
pub fn volume_bar(volume: f32) -> String {
    let cells = (1.0 / VOLUME_STEP).round() as usize;
    let filled = ((volume / VOLUME_STEP).round() as usize).min(cells);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(cells - filled))
}

fn status_label(status: ChannelStatus) -> &'static str {
    match status {
        ChannelStatus::Loading => "loading",
        ChannelStatus::Playing => "playing",
        ChannelStatus::Paused => "paused",
        ChannelStatus::Stalled => "not playing",
        ChannelStatus::Failed => "failed",
    }
}

pub fn render_status(snapshot: &MixerSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Transport: {}   Preset: {}",
        if snapshot.transport.is_playing() { "playing" } else { "paused" },
        snapshot.selected_preset.as_deref().unwrap_or("-")
    );
    for c in &snapshot.channels {
        let _ = write!(
            out,
            "  {:>3} {:<16} {} {:.1} {}",
            c.id,
            c.name,
            volume_bar(c.volume),
            c.volume,
            status_label(c.status)
        );
        if let Some(error) = &c.error {
            let _ = write!(out, " ({})", error);
        }
        out.push('\n');
    }
    out
}

/// Volume subscriptions for every channel, so sliders can mirror
/// programmatic changes such as preset application.
pub struct VolumeWatch {
    receivers: Vec<(ChannelId, watch::Receiver<f32>)>,
}

impl VolumeWatch {
    pub fn new(mixer: &Mixer) -> Self {
        Self {
            receivers: mixer
                .channels()
                .iter()
                .map(|c| (c.id(), c.subscribe()))
                .collect(),
        }
    }

    /// Volumes published since the last call.
    pub fn changed(&mut self) -> Vec<(ChannelId, f32)> {
        self.receivers
            .iter_mut()
            .filter(|(_, rx)| rx.has_changed().unwrap_or(false))
            .map(|(id, rx)| (*id, *rx.borrow_and_update()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{event_channel, HeadlessBackend};
    use crate::config::{GeneralConfig, PresetCatalog, SoundCatalog};

    fn mixer() -> (Mixer, crate::audio::PlaybackEvents) {
        let (tx, mut rx) = event_channel();
        let mut backend = HeadlessBackend::new(true);
        let mut mixer = Mixer::new(
            &SoundCatalog::builtin(),
            PresetCatalog::builtin(),
            &mut backend,
            tx,
            &GeneralConfig::default(),
        );
        mixer.pump(&mut rx);
        (mixer, rx)
    }

    #[test]
    fn test_volume_bar() {
        assert_eq!(volume_bar(0.0), "[----------]");
        assert_eq!(volume_bar(0.6), "[######----]");
        assert_eq!(volume_bar(1.0), "[##########]");
    }

    #[test]
    fn test_dispatch_transport_and_quit() {
        let (mut mixer, _rx) = mixer();
        assert_eq!(
            dispatch(&mut mixer, Message::TogglePlay),
            Reply::Text("Playing".to_string())
        );
        assert!(mixer.is_playing());
        assert_eq!(dispatch(&mut mixer, Message::Quit), Reply::Quit);
    }

    #[test]
    fn test_dispatch_unknown_preset_reports_error() {
        let (mut mixer, _rx) = mixer();
        assert_eq!(
            dispatch(&mut mixer, Message::PresetSelected("Ocean".to_string())),
            Reply::Text("Unknown preset 'Ocean'".to_string())
        );
        assert_eq!(mixer.selected_preset(), Some("welcome"));
    }

    #[test]
    fn test_preset_list_marks_selection() {
        let (mut mixer, _rx) = mixer();
        dispatch(&mut mixer, Message::PresetSelected("Fire".to_string()));
        assert_eq!(
            dispatch(&mut mixer, Message::ListPresets),
            Reply::Text("  welcome\n* Fire".to_string())
        );
    }

    #[test]
    fn test_status_rendering() {
        let (mixer, _rx) = mixer();
        let text = render_status(&mixer.snapshot());
        assert!(text.starts_with("Transport: paused   Preset: welcome"));
        assert!(text.contains("Outdoor Farm"));
        assert!(text.contains("[######----] 0.6 paused"));
    }

    #[test]
    fn test_volume_watch_sees_preset_but_not_slider() {
        let (mut mixer, _rx) = mixer();
        let mut watch = VolumeWatch::new(&mixer);
        assert!(watch.changed().is_empty());

        dispatch(&mut mixer, Message::PresetSelected("Fire".to_string()));
        assert_eq!(watch.changed(), vec![(1, 0.0), (2, 0.6)]);

        dispatch(
            &mut mixer,
            Message::ChannelVolumeChanged(1, "0.3".to_string()),
        );
        assert!(watch.changed().is_empty());
        assert_eq!(mixer.channel(1).map(|c| c.volume()), Some(0.3));
    }
}
