//! Synchronous change notification: [`Emitter`], [`Event`], [`ListenerId`].
//!
//! Each stateful entity owns one `Emitter` for its own event type. Listeners
//! subscribe either to one event kind or to every kind, and are invoked
//! in-line, in subscription order, while the change that caused the event is
//! being applied.

use std::fmt;

/// A typed event that can be routed by kind.
pub trait Event {
    /// Discriminant used to filter subscriptions.
    type Kind: Copy + Eq + fmt::Debug;

    /// The kind of this event.
    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`Emitter::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

struct Listener<E: Event> {
    id: ListenerId,
    /// `None` receives every kind.
    kind: Option<E::Kind>,
    callback: Callback<E>,
}

/// A list of listeners for events of type `E`.
pub struct Emitter<E: Event> {
    listeners: Vec<Listener<E>>,
    /// Monotonically increasing id source.
    seq: u64,
}

impl<E: Event> Emitter<E> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            seq: 0,
        }
    }

    fn push(&mut self, kind: Option<E::Kind>, callback: Callback<E>) -> ListenerId {
        let id = ListenerId(self.seq);
        self.seq += 1;
        self.listeners.push(Listener { id, kind, callback });
        id
    }

    /// Register `f` for events of the given kind only.
    pub fn subscribe(&mut self, kind: E::Kind, f: impl FnMut(&E) + 'static) -> ListenerId {
        self.push(Some(kind), Box::new(f))
    }

    /// Register `f` for every event.
    pub fn subscribe_all(&mut self, f: impl FnMut(&E) + 'static) -> ListenerId {
        self.push(None, Box::new(f))
    }

    /// Remove a listener. Returns `false` if `id` was not registered here.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to every matching listener.
    pub fn emit(&mut self, event: &E) {
        let kind = event.kind();
        for l in self.listeners.iter_mut() {
            if l.kind.is_none_or(|k| k == kind) {
                (l.callback)(event);
            }
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E: Event> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
