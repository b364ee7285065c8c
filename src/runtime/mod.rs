//! Headless runtime for the `playbot` binary.
//!
//! Loads settings, sets up logging, queues the tracks named on the command
//! line and plays them through the local engine until the queue is done.

use tracing::{info, warn};

use crate::engine::LocalEngine;
use crate::library::scan;
use crate::player::Player;

mod logging;
mod rotating;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, problem) = settings::load_settings();
    logging::init(&settings.logging)?;
    if let Some(msg) = problem {
        warn!("{msg}");
    }

    let inputs = startup::inputs_from_args();
    let tracks = scan(&inputs, &settings.library);
    if tracks.is_empty() {
        info!(?inputs, "nothing to play");
        return Ok(());
    }

    let player = Player::new(Some(&settings.player), LocalEngine::open_default, None)?;
    info!(
        mode = %player.mode(),
        outputs = player.output_devices().len(),
        "queueing {} tracks",
        tracks.len()
    );

    let result = player.play(Some(tracks));
    if result.is_ok() {
        startup::wait_until_stopped(&player);
    }
    player.close();

    result.map_err(Into::into)
}
