use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::focus::{FocusArbiter, FocusManager, FocusRequest};
use crate::library::Catalog;
use crate::player::Player;
use crate::session::{SessionCmd, SessionController, SessionSnapshot};

pub(super) fn spawn_session_thread<P, M>(
    catalog: Arc<Catalog>,
    make_player: M,
    focus: FocusManager,
    tx: Sender<SessionCmd>,
    rx: Receiver<SessionCmd>,
    snapshot: Arc<Mutex<SessionSnapshot>>,
    tick: Duration,
) -> JoinHandle<()>
where
    P: Player + 'static,
    M: FnOnce() -> P + Send + 'static,
{
    thread::spawn(move || {
        let player = make_player();
        let focus_client = focus.client(FocusRequest::music(), move |change| {
            let _ = tx.send(SessionCmd::Focus(change));
        });
        debug!(client = focus_client.id(), "registered for audio focus");
        let mut controller = SessionController::new(catalog, player, focus_client);
        publish(&snapshot, &controller);
        info!(tick_ms = tick.as_millis() as u64, "session service running");

        loop {
            match rx.recv_timeout(tick) {
                Ok(SessionCmd::Shutdown) => break,
                Ok(cmd) => {
                    debug!(?cmd, "session command");
                    // Failures are already logged and broadcast by the controller.
                    let _ = controller.handle(cmd);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            controller.tick();
            publish(&snapshot, &controller);
        }

        controller.shutdown();
        publish(&snapshot, &controller);
        info!(status = ?controller.state().status, "session service stopped");
    })
}

fn publish<P: Player, F: FocusArbiter>(
    snapshot: &Mutex<SessionSnapshot>,
    controller: &SessionController<P, F>,
) {
    if let Ok(mut guard) = snapshot.lock() {
        *guard = controller.snapshot();
    }
}
