use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use super::event::{Event, EventKind};

pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Listeners in registration order.
#[derive(Default)]
pub struct Registry(Vec<(EventKind, Listener)>);

impl Registry {
    pub fn add(&mut self, kind: EventKind, listener: Listener) {
        self.0.push((kind, listener));
    }

    /// Removes the first entry registered for `kind` with this very `listener`.
    ///
    /// Returns `false` if there was none.
    pub fn remove(&mut self, kind: EventKind, listener: &Listener) -> bool {
        let idx = self
            .0
            .iter()
            .position(|(k, l)| *k == kind && same_listener(l, listener));

        match idx {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Calls every listener registered for the event's kind.
    ///
    /// A panicking listener is logged and doesn't prevent the next ones from running.
    pub fn dispatch(&self, event: &Event) {
        let kind = event.kind();
        log::trace!("{event}");

        for (_, listener) in self.0.iter().filter(|(k, _)| *k == kind) {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                log::error!("{kind} listener panicked: {}", panic_msg(&*payload));
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

fn panic_msg(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown cause"
    }
}
