//! Media library: scanning a directory for tracks and the cached catalog.
//!
//! `TrackSource` is the query seam. `DirectoryLibrary` implements it with a
//! filesystem walk; `Catalog` sorts and caches whatever the source returns.

mod catalog;
mod model;
mod scan;

pub use catalog::Catalog;
pub use model::{Listing, Track};
pub use scan::DirectoryLibrary;

use crate::error::LibraryError;

/// Something that can list the tracks available on this device.
pub trait TrackSource {
    fn list_tracks(&self) -> Result<Listing, LibraryError>;
}
