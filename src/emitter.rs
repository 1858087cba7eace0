//! Connection lifecycle event emitter
//!
//! The client publishes transport-level liveness (`connect`, `error`,
//! `close`, `end`) through this registry. Listeners are held by `Arc`
//! identity: registering the same `Arc` twice is a no-op and `off` removes
//! exactly the `Arc` that was registered.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ApiError;

/// Lifecycle events observable on a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Transport established
    Connect,
    /// Transport raised an error; the payload carries it
    Error,
    /// Transport fully closed
    Close,
    /// Peer ended its side of the stream
    End,
}

/// Callback invoked on emit; the payload is present for [`Event::Error`]
pub type Listener = Arc<dyn Fn(Option<&ApiError>) + Send + Sync>;

struct Registration {
    listener: Listener,
    once: bool,
}

/// Event registry with insertion-ordered, deduplicated listeners
#[derive(Default)]
pub struct Emitter {
    listeners: Mutex<HashMap<Event, Vec<Registration>>>,
}

impl Emitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for every future `event` emission
    pub fn on(&self, event: Event, listener: Listener) -> &Self {
        self.add(event, listener, false)
    }

    /// Registers `listener` for the next `event` emission only.
    ///
    /// The registration is dropped before the callback runs, so an emit
    /// issued from inside the callback cannot re-enter it.
    pub fn once(&self, event: Event, listener: Listener) -> &Self {
        self.add(event, listener, true)
    }

    /// Removes `listener` from `event`; unknown listeners are a no-op
    pub fn off(&self, event: Event, listener: &Listener) -> &Self {
        let mut map = self.listeners.lock();
        if let Some(entries) = map.get_mut(&event) {
            entries.retain(|r| !Arc::ptr_eq(&r.listener, listener));
            if entries.is_empty() {
                map.remove(&event);
            }
        }
        self
    }

    /// Invokes every listener registered for `event`, in registration order.
    ///
    /// Once-listeners are unregistered first. Callbacks run synchronously on
    /// the caller; panics propagate.
    pub fn emit(&self, event: Event, payload: Option<&ApiError>) -> &Self {
        let fired: Vec<Listener> = {
            let mut map = self.listeners.lock();
            let Some(entries) = map.get_mut(&event) else {
                return self;
            };
            let fired = entries.iter().map(|r| r.listener.clone()).collect();
            entries.retain(|r| !r.once);
            if entries.is_empty() {
                map.remove(&event);
            }
            fired
        };
        for listener in fired {
            listener(payload);
        }
        self
    }

    /// Number of listeners currently registered for `event`
    #[must_use]
    pub fn listener_count(&self, event: Event) -> usize {
        self.listeners
            .lock()
            .get(&event)
            .map_or(0, Vec::len)
    }

    fn add(&self, event: Event, listener: Listener, once: bool) -> &Self {
        let mut map = self.listeners.lock();
        let entries = map.entry(event).or_default();
        if !entries.iter().any(|r| Arc::ptr_eq(&r.listener, &listener)) {
            entries.push(Registration { listener, once });
        }
        self
    }
}
