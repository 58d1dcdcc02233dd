use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::{FocusArbiter, FocusChange, FocusGain, FocusOutcome, FocusRequest};

type Listener = Arc<dyn Fn(FocusChange) + Send + Sync>;

struct Holder {
    client: u64,
    gain: FocusGain,
}

#[derive(Default)]
struct FocusStack {
    listeners: HashMap<u64, Listener>,
    /// Bottom to top. Only the top entry is audible; the rest were displaced transiently.
    holders: Vec<Holder>,
    /// Requester waiting for an exclusive holder to let go.
    delayed: Option<Holder>,
}

impl FocusStack {
    fn top(&self) -> Option<&Holder> {
        self.holders.last()
    }

    fn remove(&mut self, client: u64) {
        self.holders.retain(|h| h.client != client);
        if self.delayed.as_ref().is_some_and(|h| h.client == client) {
            self.delayed = None;
        }
    }
}

/// In-process stand-in for the host audio focus system.
#[derive(Clone, Default)]
pub struct FocusManager {
    stack: Arc<Mutex<FocusStack>>,
    next_id: Arc<AtomicU64>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client that will ask for focus with `request`.
    ///
    /// `listener` is called with every change to the client's focus.
    pub fn client(
        &self,
        request: FocusRequest,
        listener: impl Fn(FocusChange) + Send + Sync + 'static,
    ) -> FocusClient {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.lock().listeners.insert(id, Arc::new(listener));
        FocusClient {
            id,
            request,
            manager: self.clone(),
        }
    }

    /// The client currently allowed to play, if any.
    pub fn holder(&self) -> Option<u64> {
        self.lock().top().map(|h| h.client)
    }

    fn lock(&self) -> MutexGuard<'_, FocusStack> {
        match self.stack.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn request(&self, client: u64, request: FocusRequest) -> FocusOutcome {
        let mut notify: Vec<(u64, FocusChange)> = Vec::new();

        let outcome = {
            let mut stack = self.lock();

            let blocked = stack
                .top()
                .is_some_and(|h| h.client != client && h.gain == FocusGain::Exclusive);
            if blocked {
                if request.accepts_delayed {
                    stack.delayed = Some(Holder {
                        client,
                        gain: request.gain,
                    });
                    FocusOutcome::Delayed
                } else {
                    FocusOutcome::Denied
                }
            } else {
                stack.remove(client);

                if let Some(previous) = stack.top().map(|h| h.client) {
                    if request.gain == FocusGain::Transient {
                        notify.push((previous, FocusChange::TransientlyLost));
                    } else {
                        // Permanent loss: everyone underneath is gone as well.
                        for h in stack.holders.drain(..) {
                            notify.push((h.client, FocusChange::Lost));
                        }
                    }
                }

                stack.holders.push(Holder {
                    client,
                    gain: request.gain,
                });
                FocusOutcome::Granted
            }
        };

        debug!(client, ?request, ?outcome, "focus requested");
        self.dispatch(notify);
        outcome
    }

    fn abandon(&self, client: u64) {
        let mut notify: Vec<(u64, FocusChange)> = Vec::new();
        {
            let mut stack = self.lock();
            let was_top = stack.top().is_some_and(|h| h.client == client);
            stack.remove(client);

            if was_top {
                if let Some(restored) = stack.top().map(|h| h.client) {
                    notify.push((restored, FocusChange::Gained));
                } else if let Some(waiting) = stack.delayed.take() {
                    notify.push((waiting.client, FocusChange::Gained));
                    stack.holders.push(waiting);
                }
            }
        }
        debug!(client, "focus abandoned");
        self.dispatch(notify);
    }

    fn unregister(&self, client: u64) {
        self.abandon(client);
        self.lock().listeners.remove(&client);
    }

    fn dispatch(&self, notify: Vec<(u64, FocusChange)>) {
        if notify.is_empty() {
            return;
        }
        let targets: Vec<(Listener, FocusChange)> = {
            let stack = self.lock();
            notify
                .into_iter()
                .filter_map(|(client, change)| {
                    stack.listeners.get(&client).map(|l| (l.clone(), change))
                })
                .collect()
        };
        for (listener, change) in targets {
            listener(change);
        }
    }
}

/// One registered focus requester.
pub struct FocusClient {
    id: u64,
    request: FocusRequest,
    manager: FocusManager,
}

impl FocusClient {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl FocusArbiter for FocusClient {
    fn request_focus(&mut self) -> FocusOutcome {
        self.manager.request(self.id, self.request)
    }

    fn abandon_focus(&mut self) {
        self.manager.abandon(self.id);
    }
}

impl Drop for FocusClient {
    fn drop(&mut self) {
        self.manager.unregister(self.id);
    }
}
