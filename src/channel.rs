//! In-process broadcast channel for `filter-changed` messages.
//!
//! The channel is the only coupling between the filter control surface and
//! the components that react to it. It is owned by the page session and
//! handed to whoever needs it; cloning a [`FilterChannel`] clones a handle
//! to the same listener list.
//!
//! ## Delivery
//!
//! - Synchronous: `publish` returns after every listener has run.
//! - Registration order: listeners are called in the order they subscribed.
//! - Snapshot at publish time: a listener registered after (or during) a
//!   publish never sees that message.
//! - No queuing across page views, no acknowledgement, no backpressure.
//!
//! A listener that publishes while being dispatched does not recurse: the
//! nested message is queued and delivered once the current message has
//! reached every listener, so messages are always processed in publish
//! order.

use crate::message::FilterChanged;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A registered listener callback.
pub type Listener = Rc<dyn Fn(&FilterChanged)>;

/// Handle returned by [`FilterChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct ChannelState {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    pending: VecDeque<(FilterChanged, Vec<Listener>)>,
    dispatching: bool,
    delivered: u64,
}

#[derive(Clone, Default)]
pub struct FilterChannel {
    state: Rc<RefCell<ChannelState>>,
}

impl std::fmt::Debug for FilterChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FilterChannel")
            .field("listeners", &state.listeners.len())
            .field("delivered", &state.delivered)
            .finish()
    }
}

impl FilterChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It receives every message published from now on.
    pub fn subscribe(&self, listener: impl Fn(&FilterChanged) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(sid, _)| *sid != id);
        state.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Number of messages fully dispatched so far.
    pub fn delivered(&self) -> u64 {
        self.state.borrow().delivered
    }

    /// Normalize and deliver a message to every currently registered
    /// listener.
    pub fn publish(&self, message: FilterChanged) {
        let message = message.normalized();
        {
            let mut state = self.state.borrow_mut();
            let snapshot: Vec<Listener> = state.listeners.iter().map(|(_, l)| l.clone()).collect();
            state.pending.push_back((message, snapshot));
            if state.dispatching {
                log::trace!("filter-changed queued behind current dispatch");
                return;
            }
            state.dispatching = true;
        }
        let _guard = DispatchGuard(&self.state);

        loop {
            let next = self.state.borrow_mut().pending.pop_front();
            let Some((message, listeners)) = next else {
                break;
            };
            log::trace!(
                "filter-changed {:?} -> {} listeners",
                message.active_tags(),
                listeners.len()
            );
            for listener in &listeners {
                listener(&message);
            }
            self.state.borrow_mut().delivered += 1;
        }
    }
}

/// Ends a dispatch run. If a listener panicked, the rest of the queue is
/// dropped so later publishes are delivered instead of queued forever.
struct DispatchGuard<'a>(&'a RefCell<ChannelState>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.borrow_mut();
        if std::thread::panicking() {
            state.pending.clear();
        }
        state.dispatching = false;
    }
}
