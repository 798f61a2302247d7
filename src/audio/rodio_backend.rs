// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Audio output through rodio.
//!
//! One [`Sink`] per channel. Decoding starts on `load`, the sink is kept
//! paused until the mixer asks for playback.

use crate::audio::playback::{Playback, PlaybackBackend, PlaybackError, PlaybackNotifier};
use crate::config::SoundDescriptor;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Owns the output stream. Must outlive every sink it created.
pub struct RodioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn new() -> Result<Self, PlaybackError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl PlaybackBackend for RodioBackend {
    fn create(&mut self, sound: &SoundDescriptor) -> Box<dyn Playback> {
        debug!("Creating rodio sink for '{}'", sound.name);
        Box::new(RodioPlayback {
            handle: self.handle.clone(),
            sink: None,
            volume: sound.default_volume,
            notifier: None,
        })
    }
}

/// A single looping sound on the default output device.
pub struct RodioPlayback {
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    volume: f32,
    notifier: Option<PlaybackNotifier>,
}

impl RodioPlayback {
    fn open(&self, path: &Path, looping: bool) -> Result<Sink, PlaybackError> {
        let file = File::open(path).map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let sink =
            Sink::try_new(&self.handle).map_err(|e| PlaybackError::Device(e.to_string()))?;
        sink.pause();
        sink.set_volume(self.volume);

        let reader = BufReader::new(file);
        if looping {
            let source =
                Decoder::new_looped(reader).map_err(|e| PlaybackError::Decode(e.to_string()))?;
            sink.append(source);
        } else {
            let source = Decoder::new(reader).map_err(|e| PlaybackError::Decode(e.to_string()))?;
            sink.append(source);
        }
        Ok(sink)
    }
}

impl Playback for RodioPlayback {
    fn load(&mut self, path: &Path, looping: bool, notifier: PlaybackNotifier) {
        match self.open(path, looping) {
            Ok(sink) => {
                self.sink = Some(sink);
                notifier.ready();
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                notifier.failed(e.to_string());
            }
        }
        self.notifier = Some(notifier);
    }

    fn play(&mut self) {
        match (&self.sink, &self.notifier) {
            (Some(sink), notifier) => {
                sink.play();
                if let Some(n) = notifier {
                    n.started();
                }
            }
            (None, Some(n)) => n.failed("source not loaded"),
            (None, None) => {}
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn is_paused(&self) -> bool {
        self.sink.as_ref().map(|s| s.is_paused()).unwrap_or(true)
    }
}
