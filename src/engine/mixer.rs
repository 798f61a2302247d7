// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The mixer: owns every channel, the transport and the preset selection.
//!
//! Sources become ready asynchronously. Preset volumes aimed at a channel that
//! has not reported readiness are held in `pending` and applied when its
//! `Ready` event is handled, so startup never depends on timing.

use crate::audio::{
    PlaybackBackend, PlaybackEvent, PlaybackEventKind, PlaybackEventSender, PlaybackEvents,
    PlaybackNotifier,
};
use crate::config::{
    resolve_sound_path, ChannelId, GeneralConfig, PresetCatalog, PresetDescriptor, SoundCatalog,
};
use crate::engine::channel::{Channel, ChannelStatus};
use crate::engine::transport::Transport;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum MixerError {
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("Unknown channel {0}")]
    UnknownChannel(ChannelId),
}

/// Outcome of applying a preset, per assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Volume written to the channel.
    pub applied: Vec<ChannelId>,
    /// Channel not ready yet; volume buffered until it is.
    pub deferred: Vec<ChannelId>,
    /// No such channel.
    pub skipped: Vec<ChannelId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSnapshot {
    pub id: ChannelId,
    pub name: String,
    pub volume: f32,
    pub should_play: bool,
    pub paused: bool,
    pub ready: bool,
    pub status: ChannelStatus,
    pub pending_volume: Option<f32>,
    pub error: Option<String>,
}

/// Read-only view of the whole mixer for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct MixerSnapshot {
    pub transport: Transport,
    pub selected_preset: Option<String>,
    pub presets: Vec<String>,
    pub channels: Vec<ChannelSnapshot>,
}

#[derive(Debug)]
pub struct Mixer {
    channels: Vec<Channel>,
    index: HashMap<ChannelId, usize>,
    presets: PresetCatalog,
    selected_preset: Option<String>,
    transport: Transport,
    pending: BTreeMap<ChannelId, f32>,
    created_at: Instant,
}

impl Mixer {
    /// Build one channel per sound, in catalog order, and apply the startup
    /// preset. Readiness and failures arrive later on `events`.
    pub fn new(
        sounds: &SoundCatalog,
        presets: PresetCatalog,
        backend: &mut dyn PlaybackBackend,
        events: PlaybackEventSender,
        config: &GeneralConfig,
    ) -> Self {
        let mut channels = Vec::with_capacity(sounds.len());
        let mut index = HashMap::with_capacity(sounds.len());

        for sound in sounds.iter() {
            if index.contains_key(&sound.id) {
                warn!("Duplicate sound id {} ('{}'), skipping", sound.id, sound.name);
                continue;
            }
            let path = resolve_sound_path(config.sounds_dir.as_deref(), &sound.path);
            let playback = backend.create(sound);
            let notifier = PlaybackNotifier::new(sound.id, events.clone());
            index.insert(sound.id, channels.len());
            channels.push(Channel::new(sound.clone(), playback, &path, notifier));
        }

        let mut mixer = Self {
            channels,
            index,
            presets,
            selected_preset: None,
            transport: Transport::Paused,
            pending: BTreeMap::new(),
            created_at: Instant::now(),
        };

        if let Some(preset) = mixer.startup_preset(config.startup_preset.as_deref()) {
            info!("Startup preset: {}", preset.name);
            mixer.selected_preset = Some(preset.name.clone());
            mixer.apply_preset(&preset);
        }

        if config.autoplay {
            mixer.play();
        }

        info!("Mixer created with {} channels", mixer.channels.len());
        mixer
    }

    fn startup_preset(&self, name: Option<&str>) -> Option<PresetDescriptor> {
        if let Some(name) = name {
            match self.presets.find(name) {
                Some(p) => return Some(p.clone()),
                None => warn!("Startup preset '{}' not found, using first preset", name),
            }
        }
        self.presets.first().cloned()
    }

    // ==================== Transport ====================

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Enable the transport; each channel plays if its volume is above zero.
    pub fn play(&mut self) {
        self.set_transport(Transport::Playing);
    }

    /// Disable the transport; every channel stops regardless of volume.
    pub fn pause(&mut self) {
        self.set_transport(Transport::Paused);
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    fn set_transport(&mut self, transport: Transport) {
        debug!("Transport -> {:?}", transport);
        self.transport = transport;
        let enabled = transport.is_playing();
        for channel in &mut self.channels {
            channel.set_transport_enabled(enabled);
        }
    }

    // ==================== Presets ====================

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    pub fn selected_preset(&self) -> Option<&str> {
        self.selected_preset.as_deref()
    }

    /// Select a preset by name and apply it. Unknown names change nothing.
    pub fn select_preset(&mut self, name: &str) -> Result<ApplyReport, MixerError> {
        let preset = self
            .presets
            .find(name)
            .cloned()
            .ok_or_else(|| MixerError::UnknownPreset(name.to_string()))?;
        info!("Selecting preset '{}'", preset.name);
        self.selected_preset = Some(preset.name.clone());
        Ok(self.apply_preset(&preset))
    }

    /// Write each assignment into its channel. Omitted channels keep their
    /// volume; assignments to unknown channels are skipped.
    pub fn apply_preset(&mut self, preset: &PresetDescriptor) -> ApplyReport {
        let mut report = ApplyReport::default();

        for assignment in &preset.assignments {
            let Some(&i) = self.index.get(&assignment.channel) else {
                warn!(
                    "Preset '{}' references unknown channel {}",
                    preset.name, assignment.channel
                );
                report.skipped.push(assignment.channel);
                continue;
            };

            let channel = &mut self.channels[i];
            if channel.is_ready() {
                channel.set_volume(assignment.volume);
                report.applied.push(assignment.channel);
            } else {
                debug!(
                    "Channel {} not ready, deferring volume {}",
                    assignment.channel, assignment.volume
                );
                self.pending.insert(assignment.channel, assignment.volume);
                report.deferred.push(assignment.channel);
            }
        }

        report
    }

    // ==================== Channels ====================

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.index.get(&id).map(|&i| &self.channels[i])
    }

    /// Direct access for play/pause overrides on a single channel.
    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut Channel> {
        self.index.get(&id).map(|&i| &mut self.channels[i])
    }

    fn channel_or_err(&mut self, id: ChannelId) -> Result<&mut Channel, MixerError> {
        match self.index.get(&id) {
            Some(&i) => Ok(&mut self.channels[i]),
            None => Err(MixerError::UnknownChannel(id)),
        }
    }

    /// User edit of one channel's volume. Supersedes any buffered preset value.
    pub fn set_channel_volume(&mut self, id: ChannelId, volume: f32) -> Result<f32, MixerError> {
        let channel = self.channel_or_err(id)?;
        channel.set_volume(volume);
        let applied = channel.volume();
        self.pending.remove(&id);
        Ok(applied)
    }

    /// Raw slider input for one channel. `Ok(None)` if the input was ignored.
    pub fn slider_input(&mut self, id: ChannelId, input: &str) -> Result<Option<f32>, MixerError> {
        let applied = self.channel_or_err(id)?.handle_slider_input(input);
        if applied.is_some() {
            self.pending.remove(&id);
        }
        Ok(applied)
    }

    // ==================== Readiness ====================

    /// Buffered preset volume waiting for `id` to become ready.
    pub fn pending_volume(&self, id: ChannelId) -> Option<f32> {
        self.pending.get(&id).copied()
    }

    /// Channels that have not reported readiness yet.
    pub fn unready_channels(&self) -> Vec<ChannelId> {
        self.channels
            .iter()
            .filter(|c| !c.is_ready())
            .map(|c| c.id())
            .collect()
    }

    /// Unready channels once `timeout` has elapsed since construction.
    ///
    /// Only reports; buffered volumes stay until the channel becomes ready.
    pub fn overdue_channels(&self, now: Instant, timeout: Duration) -> Vec<ChannelId> {
        if now.saturating_duration_since(self.created_at) < timeout {
            return Vec::new();
        }
        self.unready_channels()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn handle_playback_event(&mut self, event: PlaybackEvent) {
        let Some(&i) = self.index.get(&event.channel) else {
            warn!("Playback event for unknown channel {}", event.channel);
            return;
        };
        let channel = &mut self.channels[i];

        match event.kind {
            PlaybackEventKind::Ready => {
                if !channel.mark_ready() {
                    debug!("Duplicate ready signal from channel {}", event.channel);
                    return;
                }
                info!("Channel {} ({}) ready", channel.id(), channel.name());
                if let Some(volume) = self.pending.remove(&event.channel) {
                    debug!("Applying deferred volume {} to channel {}", volume, event.channel);
                    channel.set_volume(volume);
                }
            }
            PlaybackEventKind::Started => channel.record_started(),
            PlaybackEventKind::Failed(reason) => channel.record_failure(reason),
        }
    }

    /// Handle every event already queued. Returns how many were handled.
    pub fn pump(&mut self, events: &mut PlaybackEvents) -> usize {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_playback_event(event);
            handled += 1;
        }
        handled
    }

    pub fn snapshot(&self) -> MixerSnapshot {
        MixerSnapshot {
            transport: self.transport,
            selected_preset: self.selected_preset.clone(),
            presets: self.presets.names().map(str::to_string).collect(),
            channels: self
                .channels
                .iter()
                .map(|c| ChannelSnapshot {
                    id: c.id(),
                    name: c.name().to_string(),
                    volume: c.volume(),
                    should_play: c.should_play(),
                    paused: c.is_paused(),
                    ready: c.is_ready(),
                    status: c.status(),
                    pending_volume: self.pending_volume(c.id()),
                    error: c.last_error().map(str::to_string),
                })
                .collect(),
        }
    }
}
