use std::path::PathBuf;
use std::time::Duration;

/// One playable file from the library. Never mutated after the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Unique within a process run; decimal text so it fits in a D-Bus object path.
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub path: PathBuf,
    pub artwork: Option<PathBuf>,
    /// Length read from the file's tags, used until the player reports its own.
    pub duration: Option<Duration>,
}

/// What a library query produced: the readable tracks plus whatever was skipped.
#[derive(Debug, Default)]
pub struct Listing {
    pub tracks: Vec<Track>,
    pub skipped: Vec<crate::error::LibraryError>,
}
