//! Game lifecycle events and the listener registry
//!
//! Listeners are called synchronously in registration order. A listener
//! receives only the event, never the surface or the registry, so it cannot
//! add or remove listeners while a dispatch is in progress.

use serde::Serialize;

/// Everything the surface reports to its host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    /// A session began (first start or restart)
    Started,
    /// A score gate was passed
    Scored { score: u32 },
    /// The session is over
    Ended { score: u32 },
    /// The host should call `draw` soon
    RedrawRequested,
    /// The host forwarded a tap (sent before the tap is acted on)
    Tapped,
    /// Short human-readable notice, suitable for a toast
    Advisory(String),
}

/// Handle returned by [`EventRegistry::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
pub struct EventRegistry {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener in registration order
    pub fn emit(&mut self, event: GameEvent) {
        log::trace!("Event {:?} -> {} listeners", event, self.listeners.len());
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
