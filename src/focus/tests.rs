use std::sync::{Arc, Mutex};

use super::*;

type ChangeLog = Arc<Mutex<Vec<FocusChange>>>;

fn recorded(manager: &FocusManager, request: FocusRequest) -> (FocusClient, ChangeLog) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let client = manager.client(request, move |change| sink.lock().unwrap().push(change));
    (client, log)
}

fn request(gain: FocusGain, accepts_delayed: bool) -> FocusRequest {
    FocusRequest {
        usage: Usage::VoiceCommunication,
        content: ContentType::Speech,
        gain,
        accepts_delayed,
    }
}

#[test]
fn first_request_is_granted() {
    let manager = FocusManager::new();
    let (mut music, log) = recorded(&manager, FocusRequest::music());

    assert_eq!(music.request_focus(), FocusOutcome::Granted);
    assert_eq!(manager.holder(), Some(music.id()));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn persistent_request_takes_focus_permanently() {
    let manager = FocusManager::new();
    let (mut music, music_log) = recorded(&manager, FocusRequest::music());
    let (mut other, _) = recorded(&manager, FocusRequest::music());

    music.request_focus();
    assert_eq!(other.request_focus(), FocusOutcome::Granted);

    assert_eq!(*music_log.lock().unwrap(), vec![FocusChange::Lost]);
    assert_eq!(manager.holder(), Some(other.id()));

    // Nothing comes back after a permanent loss.
    other.abandon_focus();
    assert_eq!(*music_log.lock().unwrap(), vec![FocusChange::Lost]);
    assert_eq!(manager.holder(), None);
}

#[test]
fn transient_request_pauses_and_then_restores_holder() {
    let manager = FocusManager::new();
    let (mut music, music_log) = recorded(&manager, FocusRequest::music());
    let (mut prompt, _) = recorded(&manager, request(FocusGain::Transient, false));

    music.request_focus();
    assert_eq!(prompt.request_focus(), FocusOutcome::Granted);
    assert_eq!(*music_log.lock().unwrap(), vec![FocusChange::TransientlyLost]);

    prompt.abandon_focus();
    assert_eq!(
        *music_log.lock().unwrap(),
        vec![FocusChange::TransientlyLost, FocusChange::Gained]
    );
    assert_eq!(manager.holder(), Some(music.id()));
}

#[test]
fn exclusive_holder_denies_impatient_requests() {
    let manager = FocusManager::new();
    let (mut call, _) = recorded(&manager, request(FocusGain::Exclusive, false));
    let (mut ping, _) = recorded(&manager, request(FocusGain::Persistent, false));

    call.request_focus();
    assert_eq!(ping.request_focus(), FocusOutcome::Denied);
    assert_eq!(manager.holder(), Some(call.id()));
}

#[test]
fn delayed_request_gains_focus_when_exclusive_holder_leaves() {
    let manager = FocusManager::new();
    let (mut call, _) = recorded(&manager, request(FocusGain::Exclusive, false));
    let (mut music, music_log) = recorded(&manager, FocusRequest::music());

    call.request_focus();
    assert_eq!(music.request_focus(), FocusOutcome::Delayed);
    assert!(music_log.lock().unwrap().is_empty());

    call.abandon_focus();
    assert_eq!(*music_log.lock().unwrap(), vec![FocusChange::Gained]);
    assert_eq!(manager.holder(), Some(music.id()));
}

#[test]
fn abandon_without_focus_is_harmless() {
    let manager = FocusManager::new();
    let (mut music, log) = recorded(&manager, FocusRequest::music());

    music.abandon_focus();
    music.abandon_focus();
    assert_eq!(manager.holder(), None);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn dropping_a_client_releases_its_focus() {
    let manager = FocusManager::new();
    let (mut music, music_log) = recorded(&manager, FocusRequest::music());
    music.request_focus();
    {
        let (mut prompt, _) = recorded(&manager, request(FocusGain::Transient, false));
        prompt.request_focus();
    }
    assert_eq!(manager.holder(), Some(music.id()));
    assert_eq!(music_log.lock().unwrap().last(), Some(&FocusChange::Gained));
}

#[test]
fn listener_may_call_back_into_manager() {
    let manager = FocusManager::new();
    let probe = manager.clone();
    let seen = Arc::new(Mutex::new(None));
    let seen_in_listener = seen.clone();
    let mut music = manager.client(FocusRequest::music(), move |_| {
        *seen_in_listener.lock().unwrap() = Some(probe.holder());
    });
    let (mut other, _) = recorded(&manager, FocusRequest::music());

    music.request_focus();
    other.request_focus();
    assert_eq!(*seen.lock().unwrap(), Some(Some(other.id())));
}
