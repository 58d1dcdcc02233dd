use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use super::*;
use crate::config::SessionSettings;
use crate::error::SessionError;
use crate::focus::{FocusArbiter, FocusRequest};
use crate::library::tests::numbered_catalog;
use crate::session::tests::FakePlayer;
use crate::session::{PlaybackStatus, SessionEvent};

fn service(n: usize, focus: &FocusManager) -> SessionService {
    let settings = SessionSettings { tick_ms: 10 };
    SessionService::spawn(
        numbered_catalog(n),
        || FakePlayer::new(60_000),
        focus,
        &settings,
    )
}

/// Block until a state update with `status` arrives.
fn wait_for_status(events: &Receiver<SessionEvent>, status: PlaybackStatus) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match events.recv_timeout(left) {
            Ok(SessionEvent::State(update)) if update.status == status => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
    false
}

#[test]
fn commands_reach_the_session_and_snapshot_follows() {
    let focus = FocusManager::new();
    let service = service(3, &focus);
    let remote = service.remote();
    let events = remote.subscribe().unwrap();

    remote.play_from_id("2").unwrap();
    assert!(wait_for_status(&events, PlaybackStatus::Playing));

    remote.pause().unwrap();
    assert!(wait_for_status(&events, PlaybackStatus::Paused));

    // The snapshot is refreshed after every command.
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut snapshot = remote.snapshot();
    while snapshot.status != PlaybackStatus::Paused && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
        snapshot = remote.snapshot();
    }
    assert_eq!(snapshot.status, PlaybackStatus::Paused);
    assert_eq!(snapshot.current_index, Some(1));
    assert_eq!(snapshot.duration_ms, Some(60_000));
    assert!(focus.holder().is_some());
}

#[test]
fn first_event_describes_the_current_state() {
    let focus = FocusManager::new();
    let service = service(1, &focus);

    let events = service.remote().subscribe().unwrap();
    assert!(matches!(
        events.recv_timeout(Duration::from_secs(2)),
        Ok(SessionEvent::State(update)) if update.status == PlaybackStatus::Idle
    ));
}

#[test]
fn another_player_taking_focus_stops_the_session() {
    let focus = FocusManager::new();
    let service = service(2, &focus);
    let remote = service.remote();
    let events = remote.subscribe().unwrap();

    remote.play_from_id("1").unwrap();
    assert!(wait_for_status(&events, PlaybackStatus::Playing));

    let mut rival = focus.client(FocusRequest::music(), |_| {});
    rival.request_focus();

    assert!(wait_for_status(&events, PlaybackStatus::Stopped));
}

#[test]
fn errors_are_broadcast() {
    let focus = FocusManager::new();
    let service = service(2, &focus);
    let remote = service.remote();
    let events = remote.subscribe().unwrap();

    remote.play_from_id("nope").unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut saw_error = false;
    while Instant::now() < deadline && !saw_error {
        if let Ok(SessionEvent::Error(message)) = events.recv_timeout(Duration::from_millis(50)) {
            saw_error = message.contains("nope");
        }
    }
    assert!(saw_error);
}

#[test]
fn shutdown_releases_focus_and_stops_accepting_commands() {
    let focus = FocusManager::new();
    let service = service(2, &focus);
    let remote = service.remote();
    let events = remote.subscribe().unwrap();
    remote.play_from_id("1").unwrap();
    assert!(wait_for_status(&events, PlaybackStatus::Playing));

    service.shutdown();
    service.shutdown();

    assert_eq!(focus.holder(), None);
    assert!(matches!(remote.play(), Err(SessionError::ServiceStopped)));
    assert_eq!(remote.snapshot().status, PlaybackStatus::Stopped);
}

#[test]
fn dropping_the_service_stops_the_thread() {
    let focus = FocusManager::new();
    let remote = service(1, &focus).remote();
    assert!(matches!(remote.stop(), Err(SessionError::ServiceStopped)));
}
