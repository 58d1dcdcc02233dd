//! The `App` model: browse listing, cursor and the last session broadcasts.

use crate::browse::MediaItem;
use crate::session::{Action, PlaybackStatus, SessionCmd, SessionEvent, TrackMetadata};

pub struct App {
    pub items: Vec<MediaItem>,
    pub selected: usize,

    pub status: PlaybackStatus,
    pub actions: Vec<Action>,
    pub now_playing: Option<TrackMetadata>,
    /// Seek bar position and maximum, in milliseconds.
    pub position_ms: u64,
    pub duration_ms: u64,
    pub last_error: Option<String>,

    /// Move the cursor to each track as it starts.
    pub follow_playback: bool,
    pub current_dir: Option<String>,
    pub metadata_window: bool,
}

impl App {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items,
            selected: 0,
            status: PlaybackStatus::Idle,
            actions: Vec::new(),
            now_playing: None,
            position_ms: 0,
            duration_ms: 0,
            last_error: None,
            follow_playback: true,
            current_dir: None,
            metadata_window: false,
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    pub fn has_tracks(&self) -> bool {
        !self.items.is_empty()
    }

    /// Select `idx`, clamped to the list.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.items.len().saturating_sub(1));
    }

    /// Move selection down, wrapping to the top.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    /// Move selection up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = match self.selected {
                0 => self.items.len() - 1,
                i => i - 1,
            };
        }
    }

    pub fn select_first(&mut self) {
        self.set_selected(0);
    }

    pub fn select_last(&mut self) {
        self.set_selected(self.items.len().saturating_sub(1));
    }

    pub fn selected_item(&self) -> Option<&MediaItem> {
        self.items.get(self.selected)
    }

    /// Index of the now-playing track in `items`.
    pub fn playing_index(&self) -> Option<usize> {
        let id = &self.now_playing.as_ref()?.id;
        self.items.iter().position(|item| &item.id == id)
    }

    /// Fold a session broadcast into the model.
    pub fn apply_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::State(update) => {
                self.status = update.status;
                self.actions = update.actions.clone();
                self.position_ms = update.position_ms.unwrap_or(0);
                match update.status {
                    PlaybackStatus::Playing => self.last_error = None,
                    // Idle after a track was loaded means its source failed.
                    PlaybackStatus::Idle => {
                        self.now_playing = None;
                        self.duration_ms = 0;
                    }
                    _ => {}
                }
            }
            SessionEvent::Metadata(track) => {
                self.duration_ms = track.duration_ms;
                self.position_ms = 0;
                self.now_playing = Some(track.clone());
                if self.follow_playback {
                    if let Some(idx) = self.playing_index() {
                        self.selected = idx;
                    }
                }
            }
            SessionEvent::Duration(ms) => self.duration_ms = *ms,
            SessionEvent::Error(message) => self.last_error = Some(message.clone()),
        }
    }

    /// Record a polled position, never past the end of the track.
    pub fn set_position(&mut self, position_ms: u64) {
        self.position_ms = if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        };
    }

    /// What Enter should do: start the selected track unless it is already playing.
    pub fn enter_command(&self) -> Option<SessionCmd> {
        let item = self.selected_item()?;
        let playing_it = self.status == PlaybackStatus::Playing
            && self.now_playing.as_ref().is_some_and(|t| t.id == item.id);
        (!playing_it).then(|| SessionCmd::PlayFromId(item.id.clone()))
    }

    /// What the play/pause key should do in the current state.
    pub fn play_pause_command(&self) -> Option<SessionCmd> {
        match self.status {
            PlaybackStatus::Playing => Some(SessionCmd::Pause),
            PlaybackStatus::Paused => Some(SessionCmd::Play),
            PlaybackStatus::Preparing => None,
            PlaybackStatus::Idle | PlaybackStatus::Stopped => {
                if self.now_playing.is_some() {
                    Some(SessionCmd::Play)
                } else {
                    self.enter_command()
                }
            }
        }
    }

    /// Absolute seek target `seconds` away from the current position.
    pub fn scrub_command(&self, seconds: i64) -> Option<SessionCmd> {
        if !self.actions.contains(&Action::SeekTo) {
            return None;
        }
        let target = (self.position_ms as i64).saturating_add(seconds.saturating_mul(1000));
        Some(SessionCmd::SeekTo(target))
    }

    /// Seek bar fill in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}
