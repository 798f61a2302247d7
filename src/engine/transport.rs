// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::Serialize;

/// Global play/pause switch shared by every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    #[default]
    Paused,
    Playing,
}

impl Transport {
    pub fn is_playing(self) -> bool {
        self == Transport::Playing
    }

    pub fn toggled(self) -> Self {
        match self {
            Transport::Playing => Transport::Paused,
            Transport::Paused => Transport::Playing,
        }
    }
}
