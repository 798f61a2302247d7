// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Playback coordination: channels, transport and presets.

pub mod channel;
pub mod mixer;
pub mod transport;

pub use channel::{clamp_volume, parse_volume_input, Channel, ChannelStatus, VOLUME_STEP};
pub use mixer::{ApplyReport, ChannelSnapshot, Mixer, MixerError, MixerSnapshot};
pub use transport::Transport;
