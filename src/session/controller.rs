use std::sync::Arc;
use std::sync::mpsc::Sender;

use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::focus::{FocusArbiter, FocusChange, FocusOutcome};
use crate::library::Catalog;
use crate::player::Player;

use super::state::{
    PlaybackStatus, SessionCmd, SessionEvent, SessionSnapshot, SessionState, StateUpdate,
    TrackMetadata, available_actions,
};

/// The playback state machine.
///
/// Owns the player and the focus client; every command goes through
/// [`SessionController::handle`] on a single thread.
pub struct SessionController<P: Player, F: FocusArbiter> {
    catalog: Arc<Catalog>,
    player: P,
    focus: F,
    state: SessionState,
    focus_held: bool,
    /// The player holds a prepared source.
    prepared: bool,
    current: Option<TrackMetadata>,
    subscribers: Vec<Sender<SessionEvent>>,
    torn_down: bool,
}

impl<P: Player, F: FocusArbiter> SessionController<P, F> {
    pub fn new(catalog: Arc<Catalog>, player: P, focus: F) -> Self {
        Self {
            catalog,
            player,
            focus,
            state: SessionState::default(),
            focus_held: false,
            prepared: false,
            current: None,
            subscribers: Vec::new(),
            torn_down: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run one command. Failures are logged and broadcast before being returned.
    pub fn handle(&mut self, cmd: SessionCmd) -> Result<(), SessionError> {
        let result = match cmd {
            SessionCmd::PlayFromId(id) => self.play_from_id(&id),
            SessionCmd::Play => self.play(),
            SessionCmd::Pause => {
                self.pause();
                Ok(())
            }
            SessionCmd::Stop => {
                self.stop();
                Ok(())
            }
            SessionCmd::SeekTo(position) => {
                self.seek_to(position);
                Ok(())
            }
            SessionCmd::SkipToNext => self.skip_to_next(),
            SessionCmd::SkipToPrevious => self.skip_to_previous(),
            SessionCmd::SetRepeatMode(mode) => {
                self.state.repeat_mode = mode;
                info!(?mode, "repeat mode recorded; playback order is unaffected");
                Ok(())
            }
            SessionCmd::SetShuffleMode(mode) => {
                self.state.shuffle_mode = mode;
                info!(?mode, "shuffle mode recorded; playback order is unaffected");
                Ok(())
            }
            SessionCmd::TrackFinished => self.track_finished(),
            SessionCmd::Focus(change) => {
                self.focus_changed(change);
                Ok(())
            }
            SessionCmd::Subscribe(tx) => {
                self.subscribe(tx);
                Ok(())
            }
            SessionCmd::Shutdown => {
                self.shutdown();
                Ok(())
            }
        };

        if let Err(e) = &result {
            warn!(error = %e, "session command failed");
            self.emit(SessionEvent::Error(e.to_string()));
        }
        result
    }

    /// Check the player for a finished track and advance if needed.
    pub fn tick(&mut self) {
        if self.player.take_finished() {
            debug!("track finished");
            let _ = self.handle(SessionCmd::TrackFinished);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let position_ms = if self.state.status.is_active() {
            Some(self.player.position_ms())
        } else {
            self.state.position_ms
        };
        SessionSnapshot {
            status: self.state.status,
            current_index: self.state.current_index,
            track: self.current.clone(),
            position_ms,
            duration_ms: self.state.duration_ms,
            repeat_mode: self.state.repeat_mode,
            shuffle_mode: self.state.shuffle_mode,
        }
    }

    /// Stop and release the player and give up focus. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        let was_active = self.state.status.is_active();
        self.player.stop();
        self.player.release();
        self.prepared = false;
        self.release_focus();

        if was_active {
            self.state.status = PlaybackStatus::Stopped;
            self.state.position_ms = None;
            self.state.duration_ms = None;
            self.broadcast_state();
        }
        info!("session torn down");
    }

    fn subscribe(&mut self, tx: Sender<SessionEvent>) {
        // Late joiners get the current picture right away.
        let _ = tx.send(SessionEvent::State(self.state_update()));
        if let Some(track) = &self.current {
            let _ = tx.send(SessionEvent::Metadata(track.clone()));
        }
        self.subscribers.push(tx);
    }

    fn play_from_id(&mut self, id: &str) -> Result<(), SessionError> {
        let index = self
            .catalog
            .index_of(id)
            .ok_or_else(|| SessionError::InvalidTrackId(id.to_string()))?;
        self.play_index(index)
    }

    fn play_index(&mut self, index: usize) -> Result<(), SessionError> {
        let track = self
            .catalog
            .get(index)
            .ok_or_else(|| SessionError::InvalidTrackId(index.to_string()))?;

        self.acquire_focus()?;

        self.state.current_index = Some(index);
        self.state.status = PlaybackStatus::Preparing;
        self.state.position_ms = Some(0);
        self.broadcast_state();

        self.prepared = false;
        self.player.reset();
        self.player.set_source(&track.path);
        if let Err(source) = self.player.prepare() {
            self.player.reset();
            self.release_focus();
            // Nothing is loaded, so there is no track to describe.
            self.current = None;
            self.state.status = PlaybackStatus::Idle;
            self.state.position_ms = None;
            self.state.duration_ms = None;
            self.broadcast_state();
            return Err(SessionError::SourceUnavailable {
                path: track.path,
                source,
            });
        }
        self.prepared = true;

        let duration_ms = self.player.duration_ms();
        self.state.duration_ms = Some(duration_ms);
        let metadata = TrackMetadata::from_track(&track, duration_ms);
        info!(id = %metadata.id, title = %metadata.title, "now playing");
        self.current = Some(metadata.clone());
        self.emit(SessionEvent::Metadata(metadata));

        self.play()
    }

    fn play(&mut self) -> Result<(), SessionError> {
        if self.state.status == PlaybackStatus::Playing || self.player.is_playing() {
            debug!("already playing");
            return Ok(());
        }
        if !self.prepared {
            return match self.state.current_index {
                Some(index) => self.play_index(index),
                None => {
                    debug!("play ignored; nothing selected");
                    Ok(())
                }
            };
        }

        self.acquire_focus()?;
        self.player.start();
        self.state.status = PlaybackStatus::Playing;
        self.state.position_ms = Some(self.player.position_ms());
        self.broadcast_state();

        let duration_ms = self.state.duration_ms.unwrap_or(0);
        self.emit(SessionEvent::Duration(duration_ms));
        Ok(())
    }

    fn pause(&mut self) {
        if self.state.status != PlaybackStatus::Playing {
            debug!(status = ?self.state.status, "pause ignored");
            return;
        }
        self.player.pause();
        self.state.status = PlaybackStatus::Paused;
        self.state.position_ms = Some(self.player.position_ms());
        self.broadcast_state();
    }

    fn stop(&mut self) {
        if !self.state.status.is_active() {
            debug!(status = ?self.state.status, "stop ignored");
            return;
        }
        self.halt();
        self.release_focus();
        self.broadcast_state();
    }

    /// Stop and unload the player, keeping the current index.
    fn halt(&mut self) {
        self.player.stop();
        self.player.reset();
        self.prepared = false;
        self.state.status = PlaybackStatus::Stopped;
        self.state.position_ms = None;
        self.state.duration_ms = None;
    }

    fn seek_to(&mut self, position: i64) {
        if !self.state.status.is_active() {
            debug!(status = ?self.state.status, "seek ignored");
            return;
        }
        let target = clamp_position(position, self.state.duration_ms.unwrap_or(0));
        let position_ms = match self.player.seek_to(target) {
            Ok(()) => target,
            Err(e) => {
                warn!(error = %e, target, "seek failed");
                self.player.position_ms()
            }
        };
        self.state.position_ms = Some(position_ms);
        self.broadcast_state();
    }

    fn skip_to_next(&mut self) -> Result<(), SessionError> {
        let len = self.catalog.len();
        if len == 0 {
            debug!("skip ignored; catalog is empty");
            return Ok(());
        }
        self.play_index(next_index(self.state.current_index, len))
    }

    fn skip_to_previous(&mut self) -> Result<(), SessionError> {
        let len = self.catalog.len();
        if len == 0 {
            debug!("skip ignored; catalog is empty");
            return Ok(());
        }
        self.play_index(previous_index(self.state.current_index, len))
    }

    fn track_finished(&mut self) -> Result<(), SessionError> {
        if self.state.status != PlaybackStatus::Playing {
            return Ok(());
        }
        self.skip_to_next()
    }

    fn focus_changed(&mut self, change: FocusChange) {
        match change {
            FocusChange::Lost => {
                info!("audio focus lost");
                self.focus_held = false;
                if self.state.status.is_active() {
                    self.halt();
                    self.broadcast_state();
                }
            }
            FocusChange::TransientlyLost => {
                info!("audio focus lost for a moment");
                self.focus_held = false;
                self.pause();
            }
            FocusChange::Gained => {
                info!("audio focus gained; waiting for an explicit play");
            }
        }
    }

    fn acquire_focus(&mut self) -> Result<(), SessionError> {
        if self.focus_held {
            return Ok(());
        }
        match self.focus.request_focus() {
            FocusOutcome::Granted => {
                self.focus_held = true;
                Ok(())
            }
            FocusOutcome::Delayed => {
                info!("audio focus delayed; play again once it is granted");
                Err(SessionError::FocusDenied)
            }
            FocusOutcome::Denied => Err(SessionError::FocusDenied),
        }
    }

    fn release_focus(&mut self) {
        if self.focus_held {
            self.focus.abandon_focus();
            self.focus_held = false;
        }
    }

    fn state_update(&self) -> StateUpdate {
        StateUpdate {
            status: self.state.status,
            position_ms: self.state.position_ms,
            actions: available_actions(self.state.status),
        }
    }

    fn broadcast_state(&mut self) {
        let update = self.state_update();
        debug!(status = ?update.status, position_ms = ?update.position_ms, "state");
        self.emit(SessionEvent::State(update));
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn player(&self) -> &P {
        &self.player
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    #[cfg(test)]
    pub(crate) fn focus_mut(&mut self) -> &mut F {
        &mut self.focus
    }
}

impl<P: Player, F: FocusArbiter> Drop for SessionController<P, F> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub(crate) fn next_index(current: Option<usize>, len: usize) -> usize {
    match current {
        Some(i) => (i + 1) % len,
        None => 0,
    }
}

pub(crate) fn previous_index(current: Option<usize>, len: usize) -> usize {
    match current {
        Some(i) if i > 0 && i <= len => i - 1,
        _ => len - 1,
    }
}

pub(crate) fn clamp_position(position: i64, duration_ms: u64) -> u64 {
    u64::try_from(position).map_or(0, |p| p.min(duration_ms))
}
