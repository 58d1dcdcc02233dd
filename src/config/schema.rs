use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/roadie/config.toml` or `~/.config/roadie/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ROADIE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub session: SessionSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub mpris: MprisSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// File names looked up next to a track to use as its artwork, first match wins.
    pub artwork_names: Vec<String>,
    /// Seconds an empty library listing is reused before scanning again.
    pub empty_retry_secs: u64,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            artwork_names: vec![
                "cover.jpg".into(),
                "cover.png".into(),
                "folder.jpg".into(),
                "folder.png".into(),
                "front.jpg".into(),
            ],
            empty_retry_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// How often the session thread checks the player for end-of-track (milliseconds).
    pub tick_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { tick_ms: 200 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Seek bar refresh interval while playing (milliseconds).
    pub position_poll_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ roadie ~ ".to_string(),
            position_poll_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MprisSettings {
    /// Publish the player on the D-Bus session bus.
    pub enabled: bool,
}

impl Default for MprisSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log file for the interactive UI. Defaults to the XDG state directory.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "roadie=info".to_string(),
            file: None,
        }
    }
}
