use std::fmt;
use std::path::Path;

/// One playable item in the queue.
///
/// `source` is opaque to the player and handed to the engine as-is. For
/// remote tracks `display_name` starts out empty and is filled in by the
/// monitor from engine-reported metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub source: String,
    pub display_name: String,
    pub is_remote: bool,
}

impl Track {
    pub fn new(source: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            display_name: display_name.into(),
            is_remote: false,
        }
    }

    /// A local file, named after its file stem until something better is known.
    pub fn local(path: &Path) -> Self {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        Self::new(path.display().to_string(), name)
    }

    /// A stream or URL whose name must be resolved from metadata.
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            source: url.into(),
            display_name: String::new(),
            is_remote: true,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name.is_empty() {
            f.write_str(&self.source)
        } else {
            f.write_str(&self.display_name)
        }
    }
}
