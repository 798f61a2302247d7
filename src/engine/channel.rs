// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A single looping sound with its own volume.
//!
//! The channel commands its source to play iff `volume > 0` and the transport
//! is enabled. The derivation runs on every write to either value.

use crate::audio::{Playback, PlaybackNotifier};
use crate::config::{ChannelId, SoundDescriptor};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Slider granularity of the volume controls.
pub const VOLUME_STEP: f32 = 0.1;

/// Clamp a volume into `[0, 1]`. NaN is rejected.
pub fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

/// Parse a volume typed or dragged into a control.
pub fn parse_volume_input(input: &str) -> Option<f32> {
    input.trim().parse::<f32>().ok().and_then(clamp_volume)
}

/// Observed state of a channel, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    /// Source has not reported readiness yet.
    Loading,
    Playing,
    Paused,
    /// Should be playing but the source is paused.
    Stalled,
    /// Source reported an error and is not playing.
    Failed,
}

pub struct Channel {
    descriptor: SoundDescriptor,
    volume: f32,
    transport_enabled: bool,
    playback: Box<dyn Playback>,
    ready: bool,
    last_error: Option<String>,
    volume_tx: watch::Sender<f32>,
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.descriptor.id)
            .field("volume", &self.volume)
            .field("transport_enabled", &self.transport_enabled)
            .field("ready", &self.ready)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl Channel {
    /// Create a channel and start loading its source in loop mode.
    pub fn new(
        descriptor: SoundDescriptor,
        mut playback: Box<dyn Playback>,
        path: &Path,
        notifier: PlaybackNotifier,
    ) -> Self {
        let volume = clamp_volume(descriptor.default_volume).unwrap_or(0.0);
        // Volume reaches the source in `mark_ready`.
        playback.load(path, true, notifier);
        let (volume_tx, _) = watch::channel(volume);

        Self {
            descriptor,
            volume,
            transport_enabled: false,
            playback,
            ready: false,
            last_error: None,
            volume_tx,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.descriptor.id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &SoundDescriptor {
        &self.descriptor
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the volume and notify subscribers.
    pub fn set_volume(&mut self, volume: f32) {
        let Some(clamped) = clamp_volume(volume) else {
            warn!("Ignoring NaN volume for channel {}", self.id());
            return;
        };
        if clamped != volume {
            debug!(
                "Clamped volume {} to {} on channel {}",
                volume,
                clamped,
                self.id()
            );
        }
        self.apply_volume(clamped);
        self.volume_tx.send_replace(clamped);
    }

    /// Apply a value coming from this channel's own slider.
    ///
    /// The slider already shows the value, so subscribers are not notified.
    /// Returns the applied volume, or `None` if the input was not a number.
    pub fn handle_slider_input(&mut self, input: &str) -> Option<f32> {
        match parse_volume_input(input) {
            Some(volume) => {
                self.apply_volume(volume);
                Some(volume)
            }
            None => {
                warn!("Ignoring volume input {:?} for channel {}", input, self.id());
                None
            }
        }
    }

    fn apply_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.playback.set_volume(volume);
        self.sync_playback();
    }

    pub fn transport_enabled(&self) -> bool {
        self.transport_enabled
    }

    pub fn set_transport_enabled(&mut self, enabled: bool) {
        self.transport_enabled = enabled;
        self.sync_playback();
    }

    /// Target state derived from volume and transport.
    pub fn should_play(&self) -> bool {
        self.volume > 0.0 && self.transport_enabled
    }

    fn sync_playback(&mut self) {
        if self.should_play() {
            self.play();
        } else {
            self.pause();
        }
    }

    /// Start the source directly, bypassing the volume/transport check.
    pub fn play(&mut self) {
        self.playback.play();
    }

    /// Pause the source directly, bypassing the volume/transport check.
    pub fn pause(&mut self) {
        self.playback.pause();
    }

    /// Actual state of the source.
    pub fn is_paused(&self) -> bool {
        self.playback.is_paused()
    }

    /// Receive the volume every time it is set through [`Channel::set_volume`].
    pub fn subscribe(&self) -> watch::Receiver<f32> {
        self.volume_tx.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Record the readiness signal and push the current state to the source.
    ///
    /// Returns `false` if the channel was already ready.
    pub fn mark_ready(&mut self) -> bool {
        if self.ready {
            return false;
        }
        self.ready = true;
        let volume = self.volume;
        self.apply_volume(volume);
        true
    }

    pub fn record_started(&mut self) {
        self.last_error = None;
    }

    pub fn record_failure(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Channel {} ({}) playback failed: {}", self.id(), self.name(), reason);
        self.last_error = Some(reason);
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> ChannelStatus {
        // A failure only matters while the channel is meant to be heard, or
        // while it never finished loading.
        let paused = self.is_paused();
        if !paused {
            ChannelStatus::Playing
        } else if self.last_error.is_some() && (self.should_play() || !self.ready) {
            ChannelStatus::Failed
        } else if !self.ready {
            ChannelStatus::Loading
        } else if self.should_play() {
            ChannelStatus::Stalled
        } else {
            ChannelStatus::Paused
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{event_channel, HeadlessPlayback, HeadlessProbe};

    fn channel(default_volume: f32) -> (Channel, HeadlessProbe) {
        let (tx, _rx) = event_channel();
        let (playback, probe) = HeadlessPlayback::new(false);
        let descriptor = SoundDescriptor::new(1, "farm.mp3", "Outdoor Farm")
            .with_default_volume(default_volume);
        let mut channel = Channel::new(
            descriptor,
            Box::new(playback),
            Path::new("farm.mp3"),
            PlaybackNotifier::new(1, tx),
        );
        channel.mark_ready();
        (channel, probe)
    }

    #[test]
    fn test_new_channel_loads_looping_source() {
        let (channel, probe) = channel(0.4);
        assert!(probe.is_looping());
        assert_eq!(channel.volume(), 0.4);
        assert_eq!(probe.volume(), 0.4);
        assert!(channel.is_paused());
        assert_eq!(channel.status(), ChannelStatus::Paused);
    }

    #[test]
    fn test_plays_iff_volume_positive_with_transport() {
        let (mut channel, probe) = channel(0.0);
        channel.set_transport_enabled(true);

        for v in [0.0, 0.1, 0.5, 1.0, 0.0] {
            channel.set_volume(v);
            assert_eq!(!probe.is_paused(), v > 0.0, "volume {}", v);
            assert_eq!(probe.volume(), v);
        }
    }

    #[test]
    fn test_never_plays_without_transport() {
        let (mut channel, probe) = channel(0.0);

        for v in [0.0, 0.1, 0.5, 1.0] {
            channel.set_volume(v);
            assert!(probe.is_paused(), "volume {}", v);
            assert!(!channel.should_play());
        }
    }

    #[test]
    fn test_transport_rederives_state() {
        let (mut channel, probe) = channel(0.6);
        channel.set_transport_enabled(true);
        assert!(!probe.is_paused());
        channel.set_transport_enabled(false);
        assert!(probe.is_paused());
        assert_eq!(channel.volume(), 0.6);
    }

    #[test]
    fn test_out_of_range_volume_is_clamped() {
        let (mut channel, _probe) = channel(0.4);
        channel.set_volume(1.7);
        assert_eq!(channel.volume(), 1.0);
        channel.set_volume(-0.2);
        assert_eq!(channel.volume(), 0.0);
    }

    #[test]
    fn test_nan_volume_is_ignored() {
        let (mut channel, _probe) = channel(0.4);
        channel.set_volume(f32::NAN);
        assert_eq!(channel.volume(), 0.4);
    }

    #[test]
    fn test_set_volume_notifies_subscribers() {
        let (mut channel, _probe) = channel(0.4);
        let mut rx = channel.subscribe();
        assert!(!rx.has_changed().unwrap());

        channel.set_volume(0.8);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 0.8);
    }

    #[test]
    fn test_slider_input_applies_without_notifying() {
        let (mut channel, probe) = channel(0.0);
        channel.set_transport_enabled(true);
        let rx = channel.subscribe();

        assert_eq!(channel.handle_slider_input("0.3"), Some(0.3));
        assert_eq!(channel.volume(), 0.3);
        assert!(!probe.is_paused());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_slider_input_rejects_garbage_and_clamps() {
        let (mut channel, _probe) = channel(0.4);
        assert_eq!(channel.handle_slider_input("loud"), None);
        assert_eq!(channel.volume(), 0.4);
        assert_eq!(channel.handle_slider_input(" 3 "), Some(1.0));
        assert_eq!(channel.volume(), 1.0);
    }

    #[test]
    fn test_direct_play_bypasses_derivation() {
        let (mut channel, probe) = channel(0.0);
        channel.play();
        assert!(!probe.is_paused());
        assert!(!channel.should_play());
        assert_eq!(channel.status(), ChannelStatus::Playing);

        channel.pause();
        assert!(channel.is_paused());
    }

    #[test]
    fn test_refused_play_is_stalled_then_failed() {
        let (mut channel, probe) = channel(0.5);
        probe.block("autoplay denied");
        channel.set_transport_enabled(true);

        assert!(channel.should_play());
        assert!(channel.is_paused());
        assert_eq!(channel.status(), ChannelStatus::Stalled);

        channel.record_failure("autoplay denied");
        assert_eq!(channel.status(), ChannelStatus::Failed);
        assert_eq!(channel.last_error(), Some("autoplay denied"));

        probe.unblock();
        channel.set_volume(0.5);
        channel.record_started();
        assert_eq!(channel.status(), ChannelStatus::Playing);
        assert_eq!(channel.last_error(), None);
    }

    #[test]
    fn test_mark_ready_is_one_shot_and_reapplies_state() {
        let (tx, _rx) = event_channel();
        let (playback, probe) = HeadlessPlayback::new(false);
        let mut channel = Channel::new(
            SoundDescriptor::new(2, "fire.m4a", "Fire").with_default_volume(0.6),
            Box::new(playback),
            Path::new("fire.m4a"),
            PlaybackNotifier::new(2, tx),
        );
        channel.set_transport_enabled(true);
        let calls = probe.play_calls();
        assert_eq!(channel.status(), ChannelStatus::Playing);

        assert!(channel.mark_ready());
        assert_eq!(probe.play_calls(), calls + 1);
        assert!(!channel.mark_ready());
        assert_eq!(probe.play_calls(), calls + 1);
    }

    #[test]
    fn test_volume_written_to_source_only_once_ready() {
        let (tx, _rx) = event_channel();
        let (playback, probe) = HeadlessPlayback::new(false);
        let mut channel = Channel::new(
            SoundDescriptor::new(2, "fire.m4a", "Fire").with_default_volume(0.6),
            Box::new(playback),
            Path::new("fire.m4a"),
            PlaybackNotifier::new(2, tx),
        );
        assert_eq!(channel.volume(), 0.6);
        assert_eq!(probe.volume(), 1.0);

        channel.mark_ready();
        assert_eq!(probe.volume(), 0.6);
    }

    #[test]
    fn test_silenced_channel_is_not_failed() {
        let (mut channel, probe) = channel(0.5);
        probe.block("autoplay denied");
        channel.set_transport_enabled(true);
        channel.record_failure("autoplay denied");
        assert_eq!(channel.status(), ChannelStatus::Failed);

        channel.set_transport_enabled(false);
        assert_eq!(channel.status(), ChannelStatus::Paused);

        channel.set_transport_enabled(true);
        assert_eq!(channel.status(), ChannelStatus::Failed);
        channel.set_volume(0.0);
        assert_eq!(channel.status(), ChannelStatus::Paused);
    }

    #[test]
    fn test_load_failure_is_failed_while_unready() {
        let (tx, _rx) = event_channel();
        let (playback, _probe) = HeadlessPlayback::new(false);
        let mut channel = Channel::new(
            SoundDescriptor::new(2, "fire.m4a", "Fire").with_default_volume(0.0),
            Box::new(playback),
            Path::new("fire.m4a"),
            PlaybackNotifier::new(2, tx),
        );
        channel.record_failure("unsupported format");
        assert!(!channel.should_play());
        assert_eq!(channel.status(), ChannelStatus::Failed);
    }

    #[test]
    fn test_unready_paused_channel_is_loading() {
        let (tx, _rx) = event_channel();
        let (playback, _probe) = HeadlessPlayback::new(false);
        let channel = Channel::new(
            SoundDescriptor::new(2, "fire.m4a", "Fire"),
            Box::new(playback),
            Path::new("fire.m4a"),
            PlaybackNotifier::new(2, tx),
        );
        assert_eq!(channel.status(), ChannelStatus::Loading);
    }

    #[test]
    fn test_parse_volume_input() {
        assert_eq!(parse_volume_input("0.5"), Some(0.5));
        assert_eq!(parse_volume_input("-1"), Some(0.0));
        assert_eq!(parse_volume_input("NaN"), None);
        assert_eq!(parse_volume_input(""), None);
    }
}
