use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::TrackSource;
use super::model::Track;

/// How long an empty result is served before the source is asked again.
const EMPTY_RETRY_AFTER: Duration = Duration::from_secs(5);

struct Loaded {
    tracks: Arc<[Track]>,
    at: Instant,
}

/// The title-ordered library snapshot shared by the session and the browse facade.
///
/// Loaded lazily on first use. Once it holds any tracks it never changes again;
/// an empty result is kept for a short while and then retried.
pub struct Catalog {
    source: Box<dyn TrackSource + Send + Sync>,
    loaded: Mutex<Option<Loaded>>,
    retry_after: Duration,
}

impl Catalog {
    pub fn new(source: impl TrackSource + Send + Sync + 'static) -> Self {
        Self {
            source: Box::new(source),
            loaded: Mutex::new(None),
            retry_after: EMPTY_RETRY_AFTER,
        }
    }

    /// Change how long an empty result is reused before querying again.
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Return the catalog, querying the source if nothing usable is cached.
    pub fn load(&self) -> Arc<[Track]> {
        let mut loaded = match self.loaded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(cached) = loaded.as_ref() {
            if !cached.tracks.is_empty() || cached.at.elapsed() < self.retry_after {
                return cached.tracks.clone();
            }
            debug!("catalog empty; querying the library again");
        }

        let tracks: Arc<[Track]> = self.query().into();
        *loaded = Some(Loaded {
            tracks: tracks.clone(),
            at: Instant::now(),
        });
        tracks
    }

    fn query(&self) -> Vec<Track> {
        let listing = match self.source.list_tracks() {
            Ok(listing) => listing,
            Err(e) => {
                error!(error = %e, "library query failed");
                return Vec::new();
            }
        };

        if !listing.skipped.is_empty() {
            warn!(
                skipped = listing.skipped.len(),
                loaded = listing.tracks.len(),
                "library loaded partially"
            );
            for e in &listing.skipped {
                debug!(error = %e, "skipped library entry");
            }
        }

        let mut tracks = listing.tracks;
        sort_by_title(&mut tracks);
        info!(tracks = tracks.len(), "catalog loaded");
        tracks
    }

    /// Position of the track with `id`, if any.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.load().iter().position(|t| t.id == id)
    }

    pub fn get(&self, index: usize) -> Option<Track> {
        self.load().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Case-insensitive title order; ties keep their scan order.
pub(crate) fn sort_by_title(tracks: &mut [Track]) {
    tracks.sort_by_cached_key(|t| t.title.to_lowercase());
}
