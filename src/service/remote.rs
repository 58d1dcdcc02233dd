use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::error::SessionError;
use crate::session::{RepeatMode, SessionCmd, SessionEvent, SessionSnapshot, ShuffleMode};

/// Cloneable handle for talking to a running session service.
#[derive(Clone)]
pub struct SessionRemote {
    tx: Sender<SessionCmd>,
    snapshot: Arc<Mutex<SessionSnapshot>>,
}

impl SessionRemote {
    pub(crate) fn new(tx: Sender<SessionCmd>, snapshot: Arc<Mutex<SessionSnapshot>>) -> Self {
        Self { tx, snapshot }
    }

    pub fn send(&self, cmd: SessionCmd) -> Result<(), SessionError> {
        self.tx.send(cmd).map_err(|_| SessionError::ServiceStopped)
    }

    pub fn play_from_id(&self, id: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCmd::PlayFromId(id.into()))
    }

    pub fn play(&self) -> Result<(), SessionError> {
        self.send(SessionCmd::Play)
    }

    pub fn pause(&self) -> Result<(), SessionError> {
        self.send(SessionCmd::Pause)
    }

    pub fn stop(&self) -> Result<(), SessionError> {
        self.send(SessionCmd::Stop)
    }

    pub fn seek_to(&self, position_ms: i64) -> Result<(), SessionError> {
        self.send(SessionCmd::SeekTo(position_ms))
    }

    pub fn skip_to_next(&self) -> Result<(), SessionError> {
        self.send(SessionCmd::SkipToNext)
    }

    pub fn skip_to_previous(&self) -> Result<(), SessionError> {
        self.send(SessionCmd::SkipToPrevious)
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) -> Result<(), SessionError> {
        self.send(SessionCmd::SetRepeatMode(mode))
    }

    pub fn set_shuffle_mode(&self, mode: ShuffleMode) -> Result<(), SessionError> {
        self.send(SessionCmd::SetShuffleMode(mode))
    }

    /// Receive every broadcast from now on, starting with the current state.
    pub fn subscribe(&self) -> Result<Receiver<SessionEvent>, SessionError> {
        let (tx, rx) = mpsc::channel();
        self.send(SessionCmd::Subscribe(tx))?;
        Ok(rx)
    }

    /// Latest state published by the service thread. May lag by one tick.
    pub fn snapshot(&self) -> SessionSnapshot {
        match self.snapshot.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
