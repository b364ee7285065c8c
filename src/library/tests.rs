use super::*;
use std::path::Path;

#[test]
fn now_playing_name_prefers_combined_field() {
    assert_eq!(
        now_playing_name(Some("DJ Set Live"), Some("Song"), Some("Artist")).as_deref(),
        Some("DJ Set Live")
    );
}

#[test]
fn now_playing_name_composes_title_and_artist() {
    assert_eq!(
        now_playing_name(None, Some("Song"), Some("Artist")).as_deref(),
        Some("Song - Artist")
    );
    assert_eq!(
        now_playing_name(Some("   "), Some("  Song "), Some("Artist")).as_deref(),
        Some("Song - Artist")
    );
    assert_eq!(
        now_playing_name(None, Some("Song"), None).as_deref(),
        Some("Song")
    );
    assert_eq!(now_playing_name(None, None, Some("")), None);
}

#[test]
fn local_track_is_named_after_file_stem() {
    let t = Track::local(Path::new("/tmp/music/My Song.mp3"));
    assert_eq!(t.display_name, "My Song");
    assert_eq!(t.source, "/tmp/music/My Song.mp3");
    assert!(!t.is_remote);
}

#[test]
fn remote_track_displays_source_until_named() {
    let mut t = Track::remote("http://radio.example/live");
    assert!(t.is_remote);
    assert_eq!(t.to_string(), "http://radio.example/live");
    t.display_name = "Song - Artist".into();
    assert_eq!(t.to_string(), "Song - Artist");
}
