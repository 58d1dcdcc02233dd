//! Audio focus: who may use the audio output right now.
//!
//! `FocusManager` plays the role of the host audio system. Every player asks
//! it for focus through a `FocusClient` and hears about losses through the
//! listener it registered. Notifications are delivered after the manager's
//! lock is released, so a listener may call back into the manager.

mod manager;

pub use manager::{FocusClient, FocusManager};

/// Why the requester wants the output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Usage {
    Media,
    VoiceCommunication,
}

/// What kind of audio the requester is about to play.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContentType {
    Music,
    Speech,
}

/// How long and how strongly the requester wants the output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusGain {
    /// Indefinitely; the previous holder should stop.
    Persistent,
    /// Briefly; the previous holder should pause and will get focus back.
    Transient,
    /// Like `Persistent`, but nobody may take it away until it is abandoned.
    Exclusive,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub usage: Usage,
    pub content: ContentType,
    pub gain: FocusGain,
    /// Wait in line instead of being denied when an exclusive holder is active.
    pub accepts_delayed: bool,
}

impl FocusRequest {
    /// What a music player asks for before starting playback.
    pub fn music() -> Self {
        Self {
            usage: Usage::Media,
            content: ContentType::Music,
            gain: FocusGain::Persistent,
            accepts_delayed: true,
        }
    }
}

/// Answer to a focus request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    Granted,
    /// Queued behind an exclusive holder; `FocusChange::Gained` follows later.
    Delayed,
    Denied,
}

/// Notification sent to a focus holder when its rights change.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusChange {
    /// Permanently lost; stop and reset.
    Lost,
    /// Lost for a short while; pause only.
    TransientlyLost,
    /// Focus came (back) to this client.
    Gained,
}

/// The session's view of the focus system.
pub trait FocusArbiter {
    fn request_focus(&mut self) -> FocusOutcome;

    /// Give focus back voluntarily. Calling it without holding focus is a no-op.
    fn abandon_focus(&mut self);
}

#[cfg(test)]
mod tests;
