// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! AmbiMix - ambient sound mixer.
//!
//! Reads commands from stdin and drives the mixer. Without the `rodio`
//! feature (or without an output device) sources run headless.

use ambimix::audio::{event_channel, HeadlessBackend, PlaybackBackend};
use ambimix::config::ConfigManager;
use ambimix::control::{dispatch, render_status, Reply, VolumeWatch, HELP};
use ambimix::message::{Message, ParseError};
use ambimix::Mixer;
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(feature = "rodio")]
fn open_output_device() -> Option<ambimix::audio::RodioBackend> {
    match ambimix::audio::RodioBackend::new() {
        Ok(backend) => Some(backend),
        Err(e) => {
            warn!("No audio output ({}), running headless", e);
            None
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("ambimix=info".parse()?))
        .init();

    info!("Starting AmbiMix");

    let mut config_dir: Option<PathBuf> = None;
    let mut init = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config-dir" => config_dir = args.next().map(PathBuf::from),
            "--init" => init = true,
            other => warn!("Ignoring unknown argument '{}'", other),
        }
    }

    let config_manager = match config_dir {
        Some(dir) => ConfigManager::with_dir(dir),
        None => ConfigManager::new()?,
    };
    if init {
        config_manager.write_defaults()?;
        info!("Wrote default config to {}", config_manager.config_dir().display());
    }

    let config = config_manager.load_config()?;
    let sounds = config_manager.load_sounds()?;
    let presets = config_manager.load_presets()?;

    let mut headless = HeadlessBackend::new(true);
    #[cfg(feature = "rodio")]
    let mut device = open_output_device();
    #[cfg(feature = "rodio")]
    let backend: &mut dyn PlaybackBackend = match device.as_mut() {
        Some(device) => device,
        None => &mut headless,
    };
    #[cfg(not(feature = "rodio"))]
    let backend: &mut dyn PlaybackBackend = &mut headless;

    let (events_tx, mut events) = event_channel();
    let mut mixer = Mixer::new(&sounds, presets, backend, events_tx, &config.general);
    let mut volume_watch = VolumeWatch::new(&mixer);

    let ready_timeout = config.general.ready_timeout();
    let deadline = tokio::time::sleep(ready_timeout);
    tokio::pin!(deadline);
    let mut deadline_passed = false;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                mixer.handle_playback_event(event);
            }
            _ = &mut deadline, if !deadline_passed => {
                deadline_passed = true;
                let overdue = mixer.overdue_channels(Instant::now(), ready_timeout);
                if !overdue.is_empty() {
                    warn!(
                        "Channels {:?} not ready after {:?}, preset volumes stay queued",
                        overdue, ready_timeout
                    );
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                match Message::parse(&line) {
                    Ok(message) => match dispatch(&mut mixer, message) {
                        Reply::Text(text) => println!("{}", text),
                        Reply::Quit => break,
                    },
                    Err(ParseError::Empty) => {}
                    Err(e) => println!("{}", e),
                }
            }
        }

        for (id, volume) in volume_watch.changed() {
            debug!("Slider for channel {} now at {:.1}", id, volume);
        }
    }

    mixer.pause();
    print!("{}", render_status(&mixer.snapshot()));
    info!("AmbiMix stopped");
    Ok(())
}
