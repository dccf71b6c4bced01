//! Pointer-down fan-out shared by every menu on screen.
//!
//! Listeners are registered through [`PointerBus::subscribe`], which hands
//! back a [`Subscription`]. Dropping or cancelling the subscription removes
//! the listener, so a listener can never outlive the value that owns it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ratatui::layout::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub position: Position,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn new(x: u16, y: u16, button: PointerButton) -> Self {
        Self {
            position: Position::new(x, y),
            button,
        }
    }

    pub fn left(x: u16, y: u16) -> Self {
        Self::new(x, y, PointerButton::Left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct ListenerId(u64);

type Handler = Rc<RefCell<dyn FnMut(&PointerEvent)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, Handler)>,
}

impl Registry {
    fn contains(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(lid, _)| *lid == id)
    }
}

/// Single-threaded pointer-down channel. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct PointerBus {
    registry: Rc<RefCell<Registry>>,
}

impl PointerBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&PointerEvent) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        registry.listeners.push((id, handler));
        log::trace!("pointer listener {:?} registered", id);

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Delivers `event` to every listener in registration order and returns
    /// how many were called. Listeners removed by an earlier listener during
    /// the same dispatch are skipped.
    pub fn dispatch(&self, event: &PointerEvent) -> usize {
        let snapshot: Vec<(ListenerId, Handler)> = self.registry.borrow().listeners.clone();
        let mut delivered = 0;

        for (id, handler) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            // A listener that dispatches re-entrantly does not receive its own event.
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (&mut *handler)(event);
                delivered += 1;
            }
        }

        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Owned registration on a [`PointerBus`]. Deregisters on drop.
#[must_use = "dropping a Subscription immediately removes the listener"]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.borrow().contains(self.id))
            .unwrap_or(false)
    }

    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
            log::trace!("pointer listener {:?} removed", self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
