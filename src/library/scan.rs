use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::LibraryError;

use super::TrackSource;
use super::model::{Listing, Track};

/// Tracks found under a directory on the local disk.
pub struct DirectoryLibrary {
    root: PathBuf,
    settings: LibrarySettings,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>, settings: LibrarySettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }
}

impl TrackSource for DirectoryLibrary {
    fn list_tracks(&self) -> Result<Listing, LibraryError> {
        scan(&self.root, &self.settings)
    }
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

fn find_artwork(path: &Path, settings: &LibrarySettings) -> Option<PathBuf> {
    let dir = path.parent()?;
    settings
        .artwork_names
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Walk `dir` and collect every audio file, in walk order.
///
/// Unreadable entries are recorded in `Listing::skipped` and the walk goes on.
/// Only an unreadable root fails the whole scan.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Result<Listing, LibraryError> {
    std::fs::read_dir(dir).map_err(|source| LibraryError::RootUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut listing = Listing::default();

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

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping library entry");
                listing.skipped.push(LibraryError::Entry(e));
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let mut title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let mut artist: Option<String> = None;
        let mut album: Option<String> = None;
        let mut duration: Option<Duration> = None;

        match lofty::read_from_path(path) {
            Ok(tagged) => {
                duration = Some(tagged.properties().duration());

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                        if !v.trim().is_empty() {
                            title = v.trim().to_string();
                        }
                    }
                    artist = tag
                        .get_string(&ItemKey::TrackArtist)
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string);
                    album = tag
                        .get_string(&ItemKey::AlbumTitle)
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string);
                }
            }
            Err(e) => debug!(path = %path.display(), error = %e, "no readable tags"),
        }

        let id = (listing.tracks.len() + 1).to_string();
        listing.tracks.push(Track {
            id,
            title,
            artist,
            album,
            path: path.to_path_buf(),
            artwork: find_artwork(path, settings),
            duration,
        });
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn titles(listing: &Listing) -> Vec<String> {
        let mut t: Vec<String> = listing.tracks.iter().map(|t| t.title.clone()).collect();
        t.sort();
        t
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_keeps_untagged_files_with_stem_as_title() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let listing = scan(dir.path(), &LibrarySettings::default()).unwrap();
        assert_eq!(titles(&listing), vec!["A".to_string(), "b".to_string()]);
        assert!(listing.skipped.is_empty());
        assert!(listing.tracks.iter().all(|t| t.artist.is_none()));
    }

    #[test]
    fn scan_assigns_unique_ordinal_ids() {
        let dir = tempdir().unwrap();
        for name in ["one.mp3", "two.mp3", "three.mp3"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let listing = scan(dir.path(), &LibrarySettings::default()).unwrap();
        let mut ids: Vec<&str> = listing.tracks.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn scan_of_missing_root_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = scan(&missing, &LibrarySettings::default()).unwrap_err();
        assert!(matches!(err, LibraryError::RootUnreadable { .. }));
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let listing = scan(dir.path(), &settings).unwrap();

        assert_eq!(titles(&listing), vec!["visible".to_string()]);
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let listing = scan(dir.path(), &settings).unwrap();
        assert_eq!(titles(&listing), vec!["root".to_string()]);
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir depth counts root as 0, children as 1, grandchildren as 2...
        let settings = LibrarySettings {
            max_depth: Some(2),
            ..LibrarySettings::default()
        };
        let names = titles(&scan(dir.path(), &settings).unwrap());

        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"one".to_string()));
        assert!(!names.contains(&"two".to_string()));
    }

    #[test]
    fn scan_picks_first_configured_artwork_next_to_track() {
        let dir = tempdir().unwrap();
        let album = dir.path().join("album");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("song.mp3"), b"x").unwrap();
        fs::write(album.join("folder.jpg"), b"jpg").unwrap();
        fs::write(album.join("cover.png"), b"png").unwrap();
        fs::write(dir.path().join("loose.mp3"), b"x").unwrap();

        let listing = scan(dir.path(), &LibrarySettings::default()).unwrap();
        let song = listing.tracks.iter().find(|t| t.title == "song").unwrap();
        let loose = listing.tracks.iter().find(|t| t.title == "loose").unwrap();

        assert_eq!(song.artwork.as_deref(), Some(album.join("cover.png").as_path()));
        assert_eq!(loose.artwork, None);
    }
}
