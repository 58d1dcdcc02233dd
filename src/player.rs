//! The low-level playback primitive driven by the session controller.
//!
//! A `Player` holds at most one prepared source. The controller owns it
//! exclusively on the service thread; nothing else touches it.

mod output;
mod sink;

use std::path::Path;

pub use output::RodioPlayer;

use crate::error::PlayerError;

pub trait Player {
    /// Drop the current source and return to the unprepared state.
    fn reset(&mut self);

    /// Remember `path` as the source for the next `prepare`.
    fn set_source(&mut self, path: &Path);

    /// Open and decode the source. Leaves the player paused at position 0.
    fn prepare(&mut self) -> Result<(), PlayerError>;

    fn start(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);

    fn seek_to(&mut self, position_ms: u64) -> Result<(), PlayerError>;

    fn position_ms(&self) -> u64;

    /// Total length of the prepared source, 0 when unknown.
    fn duration_ms(&self) -> u64;

    fn is_playing(&self) -> bool;

    /// True exactly once after a started source plays to its end.
    fn take_finished(&mut self) -> bool;

    /// Free the output device. The player is unusable afterwards.
    fn release(&mut self);
}
