//! Browse facade: the catalog as a flat, playable tree for remote surfaces.

use std::path::PathBuf;
use std::sync::Arc;

use crate::library::Catalog;

/// Id of the single browsable node.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub icon: Option<PathBuf>,
    pub playable: bool,
}

#[derive(Clone)]
pub struct MediaBrowser {
    catalog: Arc<Catalog>,
}

impl MediaBrowser {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn get_root(&self) -> &'static str {
        ROOT_ID
    }

    /// Children of `parent_id`: every track for the root, nothing otherwise.
    pub fn load_children(&self, parent_id: &str) -> Vec<MediaItem> {
        if parent_id != ROOT_ID {
            return Vec::new();
        }
        self.catalog
            .load()
            .iter()
            .map(|track| MediaItem {
                id: track.id.clone(),
                title: track.title.clone(),
                subtitle: track.artist.clone(),
                icon: track.artwork.clone(),
                playable: true,
            })
            .collect()
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}
