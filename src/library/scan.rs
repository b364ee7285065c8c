use std::path::{Path, PathBuf};

use lofty::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::now_playing_name;
use super::model::Track;

fn is_url(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a local track, preferring tag data over the file stem for its name.
fn local_track(path: &Path) -> Track {
    let mut track = Track::local(path);

    if let Ok(tagged) = lofty::read_from_path(path) {
        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            let title = tag.title();
            let artist = tag.artist();
            if let Some(name) = now_playing_name(None, title.as_deref(), artist.as_deref()) {
                track.display_name = name;
            }
        }
    }

    track
}

fn scan_dir(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut tracks: Vec<Track> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_audio_file(path, settings))
        .map(|path| local_track(&path))
        .collect();

    tracks.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
    });
    tracks
}

/// Turn command-line inputs into a queue.
///
/// URLs become remote tracks, directories are walked according to
/// `settings` and sorted by name, and files are kept when their extension
/// is a configured audio type. Input order is preserved across arguments.
pub fn scan(inputs: &[String], settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks = Vec::new();

    for input in inputs {
        if is_url(input) {
            tracks.push(Track::remote(input.clone()));
            continue;
        }

        let path = PathBuf::from(input);
        if path.is_dir() {
            let found = scan_dir(&path, settings);
            debug!(dir = %path.display(), count = found.len(), "scanned directory");
            tracks.extend(found);
        } else if path.is_file() && is_audio_file(&path, settings) {
            tracks.push(local_track(&path));
        } else {
            warn!(input = %input, "skipping input that is neither an audio file, a directory nor a URL");
        }
    }

    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn inputs(paths: &[&Path]) -> Vec<String> {
        paths.iter().map(|p| p.display().to_string()).collect()
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_dir_filters_non_audio_and_sorts_case_insensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let tracks = scan(&inputs(&[dir.path()]), &LibrarySettings::default());
        let names: Vec<&str> = tracks.iter().map(|t| t.display_name.as_str()).collect();
        assert_eq!(names, vec!["A", "b"]);
        assert!(tracks.iter().all(|t| !t.is_remote));
    }

    #[test]
    fn scan_respects_include_hidden_and_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            recursive: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(&inputs(&[dir.path()]), &settings);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display_name, "visible");
    }

    #[test]
    fn scan_keeps_argument_order_and_turns_urls_into_remote_tracks() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("zzz.flac");
        fs::write(&file, b"not real").unwrap();

        let args = vec![
            file.display().to_string(),
            "https://radio.example/stream".to_string(),
            dir.path().join("missing.mp3").display().to_string(),
        ];
        let tracks = scan(&args, &LibrarySettings::default());

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].display_name, "zzz");
        assert_eq!(tracks[1], Track::remote("https://radio.example/stream"));
    }
}
