// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Audio subsystem - playback sources behind a common trait.

pub mod headless;
pub mod playback;
#[cfg(feature = "rodio")]
pub mod rodio_backend;

pub use headless::{HeadlessBackend, HeadlessPlayback, HeadlessProbe};
pub use playback::{
    event_channel, Playback, PlaybackBackend, PlaybackError, PlaybackEvent, PlaybackEventKind,
    PlaybackEventSender, PlaybackEvents, PlaybackNotifier,
};
#[cfg(feature = "rodio")]
pub use rodio_backend::{RodioBackend, RodioPlayback};
