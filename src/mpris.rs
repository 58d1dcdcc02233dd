//! MPRIS bridge: exposes the session on the D-Bus session bus so desktop
//! media keys, `playerctl` and car/remote controllers can drive it.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use async_io::block_on;
use tracing::{debug, info, warn};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::browse::MediaBrowser;
use crate::error::SessionError;
use crate::service::SessionRemote;
use crate::session::{PlaybackStatus, RepeatMode, SessionEvent, ShuffleMode, TrackMetadata};

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.roadie";
const TRACK_PREFIX: &str = "/org/roadie/track/";

/// What the bridge last heard from the session.
#[derive(Debug, Default)]
struct SharedState {
    status: PlaybackStatus,
    track: Option<TrackMetadata>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Changed {
    status: bool,
    metadata: bool,
}

fn apply_event(state: &Mutex<SharedState>, event: &SessionEvent) -> Changed {
    let Ok(mut s) = state.lock() else {
        return Changed::default();
    };
    match event {
        SessionEvent::State(update) => {
            let status = s.status != update.status;
            s.status = update.status;
            let cleared = update.status == PlaybackStatus::Idle && s.track.take().is_some();
            Changed {
                status,
                metadata: cleared,
            }
        }
        SessionEvent::Metadata(track) => {
            s.track = Some(track.clone());
            Changed {
                status: false,
                metadata: true,
            }
        }
        SessionEvent::Duration(_) | SessionEvent::Error(_) => Changed::default(),
    }
}

fn status_str(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing | PlaybackStatus::Preparing => "Playing",
        PlaybackStatus::Paused => "Paused",
        PlaybackStatus::Idle | PlaybackStatus::Stopped => "Stopped",
    }
}

fn loop_status_str(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "None",
        RepeatMode::One => "Track",
        RepeatMode::All => "Playlist",
    }
}

fn track_path(id: &str) -> Option<OwnedObjectPath> {
    OwnedObjectPath::try_from(format!("{TRACK_PREFIX}{id}")).ok()
}

fn id_from_path<'a>(path: &'a ObjectPath<'_>) -> Option<&'a str> {
    path.as_str().strip_prefix(TRACK_PREFIX)
}

fn insert(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    match OwnedValue::try_from(value) {
        Ok(v) => {
            map.insert(key.to_string(), v);
        }
        Err(e) => debug!(key, error = %e, "metadata value dropped"),
    }
}

fn metadata_map(track: &TrackMetadata) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();
    if let Some(path) = track_path(&track.id) {
        insert(&mut map, "mpris:trackid", Value::from(path.into_inner()));
    }
    insert(&mut map, "xesam:title", Value::from(track.title.clone()));
    if let Some(artist) = &track.artist {
        insert(&mut map, "xesam:artist", Value::from(vec![artist.clone()]));
    }
    if let Some(album) = &track.album {
        insert(&mut map, "xesam:album", Value::from(album.clone()));
    }
    if let Some(art) = &track.artwork {
        insert(
            &mut map,
            "mpris:artUrl",
            Value::from(format!("file://{}", art.display())),
        );
    }
    let length_us = (track.duration_ms as i64).saturating_mul(1000);
    insert(&mut map, "mpris:length", Value::from(length_us));
    map
}

fn report(result: Result<(), SessionError>) {
    if let Err(e) = result {
        warn!(error = %e, "MPRIS command not delivered");
    }
}

struct RootIface {
    quit: Sender<()>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.quit.send(());
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "roadie"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    remote: SessionRemote,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn status(&self) -> PlaybackStatus {
        self.state.lock().map(|s| s.status).unwrap_or_default()
    }

    fn current_id(&self) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.track.as_ref().map(|t| t.id.clone()))
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        report(self.remote.skip_to_next());
    }

    fn previous(&self) {
        report(self.remote.skip_to_previous());
    }

    fn play(&self) {
        report(self.remote.play());
    }

    fn pause(&self) {
        report(self.remote.pause());
    }

    fn play_pause(&self) {
        if self.status() == PlaybackStatus::Playing {
            report(self.remote.pause());
        } else {
            report(self.remote.play());
        }
    }

    fn stop(&self) {
        report(self.remote.stop());
    }

    /// Relative seek; `offset` is in microseconds.
    fn seek(&self, offset: i64) {
        let current = self.remote.snapshot().position_ms.unwrap_or(0) as i64;
        report(self.remote.seek_to(current.saturating_add(offset / 1000)));
    }

    fn set_position(&self, track_id: OwnedObjectPath, position: i64) {
        let current = self.current_id();
        if current.as_deref() != id_from_path(&track_id) {
            debug!(track = %track_id.as_str(), "stale SetPosition ignored");
            return;
        }
        report(self.remote.seek_to(position / 1000));
    }

    fn open_uri(&self, _uri: String) -> zbus::fdo::Result<()> {
        Err(zbus::fdo::Error::NotSupported(
            "roadie only plays its own library".into(),
        ))
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        status_str(self.status())
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.track.as_ref().map(metadata_map))
            .unwrap_or_default()
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        let ms = self.remote.snapshot().position_ms.unwrap_or(0);
        (ms as i64).saturating_mul(1000)
    }

    #[zbus(property)]
    fn loop_status(&self) -> &str {
        loop_status_str(self.remote.snapshot().repeat_mode)
    }

    #[zbus(property)]
    fn set_loop_status(&mut self, value: String) {
        let mode = match value.as_str() {
            "Track" => RepeatMode::One,
            "Playlist" => RepeatMode::All,
            _ => RepeatMode::None,
        };
        report(self.remote.set_repeat_mode(mode));
    }

    #[zbus(property)]
    fn shuffle(&self) -> bool {
        self.remote.snapshot().shuffle_mode == ShuffleMode::All
    }

    #[zbus(property)]
    fn set_shuffle(&mut self, value: bool) {
        let mode = if value {
            ShuffleMode::All
        } else {
            ShuffleMode::None
        };
        report(self.remote.set_shuffle_mode(mode));
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.status().is_active()
    }
}

struct TrackListIface {
    remote: SessionRemote,
    browser: MediaBrowser,
}

#[interface(name = "org.mpris.MediaPlayer2.TrackList")]
impl TrackListIface {
    fn get_tracks_metadata(
        &self,
        track_ids: Vec<OwnedObjectPath>,
    ) -> Vec<HashMap<String, OwnedValue>> {
        let tracks = self.browser.catalog().load();
        track_ids
            .iter()
            .filter_map(|path| id_from_path(path))
            .filter_map(|id| tracks.iter().find(|t| t.id == id))
            .map(|track| {
                let duration_ms = track.duration.map_or(0, |d| d.as_millis() as u64);
                metadata_map(&TrackMetadata::from_track(track, duration_ms))
            })
            .collect()
    }

    fn go_to(&self, track_id: OwnedObjectPath) {
        match id_from_path(&track_id) {
            Some(id) => report(self.remote.play_from_id(id)),
            None => debug!(track = %track_id.as_str(), "GoTo for a foreign track ignored"),
        }
    }

    fn add_track(
        &self,
        _uri: String,
        _after: OwnedObjectPath,
        _set_as_current: bool,
    ) -> zbus::fdo::Result<()> {
        Err(zbus::fdo::Error::NotSupported("the track list is read-only".into()))
    }

    fn remove_track(&self, _track_id: OwnedObjectPath) -> zbus::fdo::Result<()> {
        Err(zbus::fdo::Error::NotSupported("the track list is read-only".into()))
    }

    #[zbus(property)]
    fn tracks(&self) -> Vec<OwnedObjectPath> {
        self.browser
            .load_children(self.browser.get_root())
            .iter()
            .filter_map(|item| track_path(&item.id))
            .collect()
    }

    #[zbus(property)]
    fn can_edit_tracks(&self) -> bool {
        false
    }
}

/// Register on the session bus and mirror session events as property changes.
///
/// Runs on its own thread until the session service goes away. Failing to
/// reach the bus is logged and leaves the rest of the program unaffected.
pub fn spawn_mpris(
    remote: SessionRemote,
    browser: MediaBrowser,
    quit: Sender<()>,
) -> Result<(), SessionError> {
    let events = remote.subscribe()?;
    std::thread::spawn(move || block_on(serve(remote, browser, quit, events)));
    Ok(())
}

async fn serve(
    remote: SessionRemote,
    browser: MediaBrowser,
    quit: Sender<()>,
    events: Receiver<SessionEvent>,
) {
    let connection = match Connection::session().await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "MPRIS: no session bus");
            return;
        }
    };

    if let Err(e) = connection.request_name(BUS_NAME).await {
        warn!(error = %e, "MPRIS: failed to acquire name");
        return;
    }

    let state = Arc::new(Mutex::new(SharedState::default()));
    let object_server = connection.object_server();

    if let Err(e) = object_server.at(MPRIS_PATH, RootIface { quit }).await {
        warn!(error = %e, "MPRIS: failed to register root interface");
        return;
    }
    let player = PlayerIface {
        remote: remote.clone(),
        state: state.clone(),
    };
    if let Err(e) = object_server.at(MPRIS_PATH, player).await {
        warn!(error = %e, "MPRIS: failed to register player interface");
        return;
    }
    if let Err(e) = object_server
        .at(MPRIS_PATH, TrackListIface { remote, browser })
        .await
    {
        warn!(error = %e, "MPRIS: failed to register track list interface");
        return;
    }

    let player: InterfaceRef<PlayerIface> =
        match object_server.interface::<_, PlayerIface>(MPRIS_PATH).await {
            Ok(iface) => iface,
            Err(e) => {
                warn!(error = %e, "MPRIS: player interface vanished");
                return;
            }
        };
    info!(name = BUS_NAME, "MPRIS interface registered");

    // Ends when the session service drops its subscribers.
    while let Ok(event) = events.recv() {
        let changed = apply_event(&state, &event);
        if let Err(e) = signal(&player, &changed).await {
            debug!(error = %e, "MPRIS: property signal failed");
        }
    }
    debug!("MPRIS bridge stopped");
}

async fn signal(player: &InterfaceRef<PlayerIface>, changed: &Changed) -> zbus::Result<()> {
    let iface = player.get().await;
    let emitter = player.signal_emitter();
    if changed.status {
        iface.playback_status_changed(emitter).await?;
        iface.can_seek_changed(emitter).await?;
    }
    if changed.metadata {
        iface.metadata_changed(emitter).await?;
    }
    Ok(())
}
