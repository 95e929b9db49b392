//! Change-notification primitives
//!
//! Stats and vitals deliver change notifications synchronously through an
//! explicit registry of callback handles. A handler is released with the
//! token handed out at subscribe time; nothing is delivered after release.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Token returned by [`Observers::subscribe`], consumed on release.
///
/// Tokens are unique across every registry in the process, so presenting
/// one to the wrong registry is a harmless miss rather than a misfire.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Handler<T> = Rc<RefCell<dyn FnMut(T)>>;

/// Registry of callback handles for one notification stream.
///
/// Dispatch runs on the calling thread, synchronously, with no guard
/// against a handler re-entering the registry's owner. Single logical
/// ownership is the engine-wide contract.
pub struct Observers<T> {
    entries: RefCell<Vec<(u64, Handler<T>)>>,
}

impl<T: Copy> Observers<T> {
    pub fn new() -> Self {
        Observers {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Register a handler; the returned token releases it
    pub fn subscribe(&self, handler: impl FnMut(T) + 'static) -> Subscription {
        let id = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        self.entries
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(handler))));
        Subscription(id)
    }

    /// Release a subscription. Returns whether a handler was removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(id, _)| *id == subscription.0) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Deliver `value` to every handler subscribed at the time of the call.
    ///
    /// Dispatch iterates a snapshot: handlers added during dispatch first
    /// see the next emission, handlers removed during dispatch still see
    /// this one.
    pub fn emit(&self, value: T) {
        let snapshot: Vec<Handler<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in snapshot {
            (handler.borrow_mut())(value);
        }
    }
}

impl<T: Copy> Default for Observers<T> {
    fn default() -> Self {
        Observers::new()
    }
}
