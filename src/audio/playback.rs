// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Playback primitive abstraction.
//!
//! A [`Playback`] is a single loopable audio source. Commands are
//! fire-and-forget: whether a source actually became ready or started playing
//! is reported later through its [`PlaybackNotifier`] as a [`PlaybackEvent`].

use crate::config::{ChannelId, SoundDescriptor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::trace;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode audio: {0}")]
    Decode(String),
    #[error("Audio device error: {0}")]
    Device(String),
    #[error("Playback refused: {0}")]
    Refused(String),
}

/// What happened to a playback source.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEventKind {
    /// The source can accept commands. Sent at most once per source.
    Ready,
    /// A `play()` request took effect.
    Started,
    /// Loading or a `play()` request failed.
    Failed(String),
}

/// Notification from a playback source, tagged with its channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    pub channel: ChannelId,
    pub kind: PlaybackEventKind,
}

pub type PlaybackEventSender = mpsc::UnboundedSender<PlaybackEvent>;
pub type PlaybackEvents = mpsc::UnboundedReceiver<PlaybackEvent>;

/// Create the queue playback sources report into.
pub fn event_channel() -> (PlaybackEventSender, PlaybackEvents) {
    mpsc::unbounded_channel()
}

/// Handle a playback source uses to report back to the mixer.
#[derive(Debug, Clone)]
pub struct PlaybackNotifier {
    channel: ChannelId,
    tx: PlaybackEventSender,
}

impl PlaybackNotifier {
    pub fn new(channel: ChannelId, tx: PlaybackEventSender) -> Self {
        Self { channel, tx }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn ready(&self) {
        self.send(PlaybackEventKind::Ready);
    }

    pub fn started(&self) {
        self.send(PlaybackEventKind::Started);
    }

    pub fn failed(&self, reason: impl Into<String>) {
        self.send(PlaybackEventKind::Failed(reason.into()));
    }

    fn send(&self, kind: PlaybackEventKind) {
        let event = PlaybackEvent {
            channel: self.channel,
            kind,
        };
        if self.tx.send(event).is_err() {
            // Mixer is gone; nothing left to notify.
            trace!("Dropping playback event for channel {}", self.channel);
        }
    }
}

/// A loop-capable audio source.
pub trait Playback {
    /// Start loading `path`. Readiness or failure is reported via `notifier`.
    fn load(&mut self, path: &Path, looping: bool, notifier: PlaybackNotifier);

    /// Request playback. May be re-issued before a previous request settles.
    fn play(&mut self);

    fn pause(&mut self);

    /// Linear volume, 0.0 to 1.0.
    fn set_volume(&mut self, volume: f32);

    /// Actual state of the source, not the requested one.
    fn is_paused(&self) -> bool;
}

/// Factory for playback sources, one per catalog sound.
pub trait PlaybackBackend {
    fn create(&mut self, sound: &SoundDescriptor) -> Box<dyn Playback>;
}
