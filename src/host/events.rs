use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
}

type ResizeListener = Box<dyn FnMut(ResizeEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    resize: IndexMap<u64, ResizeListener>,
    dispatching: bool,
    released_during_dispatch: Vec<u64>,
}

/// Window-level event source shared by every chart host in a window.
///
/// Listeners stay registered for as long as the returned [`Subscription`]
/// lives; dropping it unregisters the listener.
#[derive(Clone, Default)]
pub struct WindowEvents {
    inner: Rc<RefCell<Listeners>>,
}

impl fmt::Debug for WindowEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowEvents")
            .field("resize_listeners", &self.listener_count())
            .finish()
    }
}

impl WindowEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe_resize(&self, listener: impl FnMut(ResizeEvent) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.resize.insert(id, Box::new(listener));
        trace!(id, "resize listener subscribed");
        Subscription {
            events: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Delivers `event` to every listener and returns how many were called.
    ///
    /// Listeners may subscribe or drop subscriptions while being notified;
    /// those changes apply from the next emit on.
    pub fn emit_resize(&self, event: ResizeEvent) -> usize {
        let mut listeners = {
            let mut inner = self.inner.borrow_mut();
            inner.dispatching = true;
            std::mem::take(&mut inner.resize)
        };
        for listener in listeners.values_mut() {
            listener(event);
        }
        let notified = listeners.len();

        let mut inner = self.inner.borrow_mut();
        inner.dispatching = false;
        for id in std::mem::take(&mut inner.released_during_dispatch) {
            listeners.shift_remove(&id);
        }
        let added = std::mem::take(&mut inner.resize);
        listeners.extend(added);
        inner.resize = listeners;
        notified
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().resize.len()
    }
}

/// Registration handle; unregisters its listener on drop.
#[derive(Debug)]
pub struct Subscription {
    events: Weak<RefCell<Listeners>>,
    id: u64,
}

impl Subscription {
    /// False once the event source itself has been dropped.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.events.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(events) = self.events.upgrade() else {
            return;
        };
        let mut inner = events.borrow_mut();
        if inner.resize.shift_remove(&self.id).is_none() && inner.dispatching {
            inner.released_during_dispatch.push(self.id);
        }
        trace!(id = self.id, "resize listener released");
    }
}
