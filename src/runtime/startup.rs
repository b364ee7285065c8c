use std::env;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::player::{PlaybackState, Player};

/// How often the runtime checks whether the queue has finished.
const WATCH_INTERVAL: Duration = Duration::from_millis(250);

/// Command-line inputs, defaulting to the current directory.
pub fn inputs_from_args() -> Vec<String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if !args.is_empty() {
        return args;
    }

    vec![
        env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string()),
    ]
}

/// Block until the player is stopped, logging each track change on the way.
pub fn wait_until_stopped(player: &Player) {
    let mut last_index = None;
    loop {
        let snapshot = player.snapshot();
        if snapshot.state == PlaybackState::Stopped {
            return;
        }
        if snapshot.index != last_index {
            if let Some(track) = snapshot.current_track() {
                info!(
                    position = snapshot.index.map_or(0, |i| i + 1),
                    of = snapshot.tracks.len(),
                    "playing {track}"
                );
            }
            last_index = snapshot.index;
        }
        thread::sleep(WATCH_INTERVAL);
    }
}
