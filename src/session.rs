//! Playback session: the state machine that turns transport commands into
//! player calls, focus requests and broadcasts.

mod controller;
mod state;

pub use controller::SessionController;
pub use state::{
    Action, PlaybackStatus, RepeatMode, SessionCmd, SessionEvent, SessionSnapshot, SessionState,
    ShuffleMode, StateUpdate, TrackMetadata, available_actions,
};
