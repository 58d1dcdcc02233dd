//! The session service: one thread that owns the controller, fed by a command queue.

mod remote;
mod thread;

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

pub use remote::SessionRemote;

use crate::config::SessionSettings;
use crate::focus::FocusManager;
use crate::library::Catalog;
use crate::player::Player;
use crate::session::{SessionCmd, SessionSnapshot};

use thread::spawn_session_thread;

pub struct SessionService {
    remote: SessionRemote,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl SessionService {
    /// Start the service thread.
    ///
    /// `make_player` runs on the new thread, since audio output handles
    /// cannot cross threads.
    pub fn spawn<P, M>(
        catalog: Arc<Catalog>,
        make_player: M,
        focus: &FocusManager,
        settings: &SessionSettings,
    ) -> Self
    where
        P: Player + 'static,
        M: FnOnce() -> P + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<SessionCmd>();
        let snapshot = Arc::new(Mutex::new(SessionSnapshot::default()));

        let handle = spawn_session_thread(
            catalog,
            make_player,
            focus.clone(),
            tx.clone(),
            rx,
            snapshot.clone(),
            Duration::from_millis(settings.tick_ms),
        );

        Self {
            remote: SessionRemote::new(tx, snapshot),
            join: Mutex::new(Some(handle)),
        }
    }

    pub fn remote(&self) -> SessionRemote {
        self.remote.clone()
    }

    /// Stop the thread and wait for its teardown. Later calls return at once.
    pub fn shutdown(&self) {
        let _ = self.remote.send(SessionCmd::Shutdown);

        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for SessionService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests;
