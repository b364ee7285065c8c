/// Separator between title and artist in composed names.
const NAME_SEPARATOR: &str = " - ";

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// Build the name shown for a track from reported metadata.
///
/// A combined "now playing" field wins when present. Otherwise title and
/// artist are joined as `"{title} - {artist}"`, using whichever of the two
/// exists. Returns `None` when there is nothing to show.
pub fn now_playing_name(
    now_playing: Option<&str>,
    title: Option<&str>,
    artist: Option<&str>,
) -> Option<String> {
    if let Some(combined) = non_empty(now_playing) {
        return Some(combined.to_string());
    }

    let parts: Vec<&str> = [non_empty(title), non_empty(artist)]
        .into_iter()
        .flatten()
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(NAME_SEPARATOR))
    }
}
