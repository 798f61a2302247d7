// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! AmbiMix - ambient sound mixer.
//!
//! Several looping sounds play at once, each with its own volume, under one
//! shared play/pause transport. Presets set many channel volumes in one step.

pub mod audio;
pub mod config;
pub mod control;
pub mod engine;
pub mod message;

pub use engine::{Channel, Mixer, MixerError, Transport};
