//! Error types shared across the library, player and session layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while querying the media library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The library root itself could not be read; nothing was scanned.
    #[error("cannot read library root {path:?}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single entry could not be read. The rest of the scan continues.
    #[error("skipped unreadable library entry: {0}")]
    Entry(#[from] walkdir::Error),
}

/// Failures reported by the player primitive.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no source has been set")]
    NoSource,

    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("no audio output available: {0}")]
    Output(String),
}

/// Failures of a session command. None of these are fatal to the service.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Another client holds exclusive audio rights.
    #[error("audio focus was not granted")]
    FocusDenied,

    /// The track's source could not be opened or prepared.
    #[error("source {path:?} is unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: PlayerError,
    },

    /// A command referenced an id that is not in the catalog.
    #[error("no track with id {0:?}")]
    InvalidTrackId(String),

    /// The service thread is gone; the command was not delivered.
    #[error("the session service is not running")]
    ServiceStopped,
}
