//! Playback session state and the messages flowing in and out of the controller.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::focus::FocusChange;
use crate::library::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    /// A source is being opened; transient.
    Preparing,
    Playing,
    Paused,
    Stopped,
}

impl PlaybackStatus {
    /// Playing or paused: a prepared source is loaded.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Preparing => "Loading",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

/// Commands a surface may offer in a given state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Play,
    Pause,
    Stop,
    SeekTo,
    SkipToNext,
    SkipToPrevious,
    SetRepeatMode,
    SetShuffleMode,
}

/// The action set advertised alongside `status`.
pub fn available_actions(status: PlaybackStatus) -> Vec<Action> {
    use Action::*;
    match status {
        PlaybackStatus::Playing => vec![
            Pause,
            Stop,
            SkipToNext,
            SkipToPrevious,
            SeekTo,
            SetRepeatMode,
            SetShuffleMode,
        ],
        PlaybackStatus::Paused => vec![Play, Stop, SkipToNext, SkipToPrevious, SeekTo],
        PlaybackStatus::Preparing => Vec::new(),
        PlaybackStatus::Idle | PlaybackStatus::Stopped => {
            vec![Play, SkipToNext, SkipToPrevious]
        }
    }
}

/// Recorded but not applied to playback order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    None,
    One,
    All,
}

/// Recorded but not applied to playback order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ShuffleMode {
    #[default]
    None,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Catalog position of the current track.
    pub current_index: Option<usize>,
    pub status: PlaybackStatus,
    /// `None` when unknown (after a stop).
    pub position_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub repeat_mode: RepeatMode,
    pub shuffle_mode: ShuffleMode,
}

/// Playback state as broadcast to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    pub status: PlaybackStatus,
    pub position_ms: Option<u64>,
    pub actions: Vec<Action>,
}

/// What observers get to know about the current track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub artwork: Option<PathBuf>,
    pub duration_ms: u64,
}

impl TrackMetadata {
    pub fn from_track(track: &Track, duration_ms: u64) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            artwork: track.artwork.clone(),
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    State(StateUpdate),
    Metadata(TrackMetadata),
    /// Total length of the track that just started, for seek bars.
    Duration(u64),
    /// A command failed; the message is meant for display.
    Error(String),
}

/// Everything the session reacts to, whatever its origin.
#[derive(Debug)]
pub enum SessionCmd {
    PlayFromId(String),
    Play,
    Pause,
    Stop,
    /// Absolute position in milliseconds; clamped to the track.
    SeekTo(i64),
    SkipToNext,
    SkipToPrevious,
    SetRepeatMode(RepeatMode),
    SetShuffleMode(ShuffleMode),
    /// The player reached the end of the current source.
    TrackFinished,
    Focus(FocusChange),
    Subscribe(Sender<SessionEvent>),
    Shutdown,
}

/// Point-in-time copy of the session for polling surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub status: PlaybackStatus,
    pub current_index: Option<usize>,
    pub track: Option<TrackMetadata>,
    pub position_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub repeat_mode: RepeatMode,
    pub shuffle_mode: ShuffleMode,
}
