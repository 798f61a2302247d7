// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! In-memory playback sources.
//!
//! Used when no audio device is wanted and as the test double for the mixer.
//! A [`HeadlessProbe`] shares state with its source so the owner can drive
//! readiness and refusals from outside and inspect the resulting state.

use crate::audio::playback::{Playback, PlaybackBackend, PlaybackNotifier};
use crate::config::{ChannelId, SoundDescriptor};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct HeadlessState {
    path: Option<PathBuf>,
    looping: bool,
    volume: f32,
    paused: bool,
    ready: bool,
    /// When set, `play()` is refused with this reason.
    blocked: Option<String>,
    play_calls: usize,
    pause_calls: usize,
    notifier: Option<PlaybackNotifier>,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            path: None,
            looping: false,
            volume: 1.0,
            paused: true,
            ready: false,
            blocked: None,
            play_calls: 0,
            pause_calls: 0,
            notifier: None,
        }
    }
}

/// Playback source that tracks state without producing sound.
#[derive(Debug)]
pub struct HeadlessPlayback {
    state: Arc<Mutex<HeadlessState>>,
    auto_ready: bool,
}

impl HeadlessPlayback {
    /// Create a source and the probe observing it.
    ///
    /// With `auto_ready` the source reports readiness as soon as it is loaded.
    pub fn new(auto_ready: bool) -> (Self, HeadlessProbe) {
        let state = Arc::new(Mutex::new(HeadlessState::default()));
        let probe = HeadlessProbe {
            state: Arc::clone(&state),
        };
        (Self { state, auto_ready }, probe)
    }
}

impl Playback for HeadlessPlayback {
    fn load(&mut self, path: &Path, looping: bool, notifier: PlaybackNotifier) {
        debug!("Headless load of {} (loop: {})", path.display(), looping);
        let mut state = self.state.lock();
        state.path = Some(path.to_path_buf());
        state.looping = looping;
        if self.auto_ready {
            state.ready = true;
            notifier.ready();
        }
        state.notifier = Some(notifier);
    }

    fn play(&mut self) {
        let mut state = self.state.lock();
        state.play_calls += 1;
        match state.blocked.clone() {
            Some(reason) => {
                state.paused = true;
                if let Some(n) = &state.notifier {
                    n.failed(reason);
                }
            }
            None => {
                state.paused = false;
                if let Some(n) = &state.notifier {
                    n.started();
                }
            }
        }
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        state.pause_calls += 1;
        state.paused = true;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().volume = volume;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }
}

/// Outside view of a [`HeadlessPlayback`].
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessProbe {
    /// Fire the one-shot readiness notification. Later calls are ignored.
    pub fn signal_ready(&self) {
        let mut state = self.state.lock();
        if state.ready {
            return;
        }
        state.ready = true;
        if let Some(n) = &state.notifier {
            n.ready();
        }
    }

    /// Refuse subsequent `play()` calls, like an autoplay policy would.
    pub fn block(&self, reason: impl Into<String>) {
        self.state.lock().blocked = Some(reason.into());
    }

    pub fn unblock(&self) {
        self.state.lock().blocked = None;
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    pub fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.state.lock().path.clone()
    }

    pub fn play_calls(&self) -> usize {
        self.state.lock().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.state.lock().pause_calls
    }
}

/// Backend creating [`HeadlessPlayback`] sources and keeping their probes.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    auto_ready: bool,
    probes: BTreeMap<ChannelId, HeadlessProbe>,
}

impl HeadlessBackend {
    pub fn new(auto_ready: bool) -> Self {
        Self {
            auto_ready,
            probes: BTreeMap::new(),
        }
    }

    pub fn probe(&self, channel: ChannelId) -> Option<&HeadlessProbe> {
        self.probes.get(&channel)
    }
}

impl PlaybackBackend for HeadlessBackend {
    fn create(&mut self, sound: &SoundDescriptor) -> Box<dyn Playback> {
        let (playback, probe) = HeadlessPlayback::new(self.auto_ready);
        self.probes.insert(sound.id, probe);
        Box::new(playback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::playback::{event_channel, PlaybackEventKind};

    #[test]
    fn test_manual_readiness_fires_once() {
        let (tx, mut rx) = event_channel();
        let (mut playback, probe) = HeadlessPlayback::new(false);
        playback.load(Path::new("fire.m4a"), true, PlaybackNotifier::new(2, tx));

        assert!(!probe.is_ready());
        assert!(rx.try_recv().is_err());

        probe.signal_ready();
        probe.signal_ready();
        assert_eq!(rx.try_recv().unwrap().kind, PlaybackEventKind::Ready);
        assert!(rx.try_recv().is_err());
        assert!(probe.is_looping());
        assert_eq!(probe.path(), Some(PathBuf::from("fire.m4a")));
    }

    #[test]
    fn test_auto_ready_on_load() {
        let (tx, mut rx) = event_channel();
        let (mut playback, probe) = HeadlessPlayback::new(true);
        playback.load(Path::new("farm.mp3"), true, PlaybackNotifier::new(1, tx));

        assert!(probe.is_ready());
        assert_eq!(rx.try_recv().unwrap().kind, PlaybackEventKind::Ready);
    }

    #[test]
    fn test_blocked_play_stays_paused() {
        let (tx, mut rx) = event_channel();
        let (mut playback, probe) = HeadlessPlayback::new(true);
        playback.load(Path::new("farm.mp3"), true, PlaybackNotifier::new(1, tx));
        let _ = rx.try_recv();

        probe.block("autoplay denied");
        playback.play();
        assert!(playback.is_paused());
        assert_eq!(
            rx.try_recv().unwrap().kind,
            PlaybackEventKind::Failed("autoplay denied".to_string())
        );

        probe.unblock();
        playback.play();
        assert!(!playback.is_paused());
        assert_eq!(rx.try_recv().unwrap().kind, PlaybackEventKind::Started);
        assert_eq!(probe.play_calls(), 2);
    }

    #[test]
    fn test_backend_keeps_probe_per_sound() {
        let mut backend = HeadlessBackend::new(false);
        let mut playback = backend.create(&SoundDescriptor::new(9, "x.ogg", "X"));
        playback.set_volume(0.3);

        assert_eq!(backend.probe(9).map(|p| p.volume()), Some(0.3));
        assert!(backend.probe(1).is_none());
    }
}
