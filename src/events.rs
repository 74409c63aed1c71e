//! Tick dispatch.
//!
//! The `EventBus` is the single driver of simulated time. Layers subscribe
//! a handler with `on_tick` and the host calls `update(delta)` once per
//! frame. Handlers run synchronously in registration order.
//!
//! The bus is an explicitly owned handle, passed to whatever needs it.
//! Dropping a `Subscription` removes its handler.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{trace, warn};

type Handler = Rc<dyn Fn(f64)>;

#[derive(Default)]
struct Bus {
    handlers: RefCell<Vec<(u64, Handler)>>,
    next_id: Cell<u64>,
    dispatching: Cell<bool>,
    ticks: Cell<u64>,
}

/// A tick dispatcher.
///
/// Cloning an `EventBus` clones the handle; all clones dispatch to the
/// same handlers.
///
/// # Examples
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use zzidle::EventBus;
///
/// let bus = EventBus::new();
/// let elapsed = Rc::new(Cell::new(0.0));
///
/// let sink = Rc::clone(&elapsed);
/// let subscription = bus.on_tick(move |delta| sink.set(sink.get() + delta));
///
/// bus.update(0.5);
/// bus.update(0.25);
/// assert_eq!(elapsed.get(), 0.75);
///
/// drop(subscription);
/// bus.update(1.0);
/// assert_eq!(elapsed.get(), 0.75);
/// ```
#[derive(Clone, Default)]
pub struct EventBus {
    bus: Rc<Bus>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a tick handler.
    ///
    /// The handler stays registered as long as the returned subscription
    /// is alive, or forever after [`Subscription::detach`].
    #[must_use = "dropping the subscription removes the handler"]
    pub fn on_tick(&self, handler: impl Fn(f64) + 'static) -> Subscription {
        let id = self.bus.next_id.get();
        self.bus.next_id.set(id + 1);
        self.bus.handlers.borrow_mut().push((id, Rc::new(handler)));
        trace!(id, "tick handler subscribed");
        Subscription {
            id,
            bus: Rc::downgrade(&self.bus),
            attached: true,
        }
    }

    /// Advance simulated time by `delta` seconds.
    ///
    /// Every handler registered when the tick starts runs once, in
    /// registration order. Handlers added during the tick first run on the
    /// next one; handlers removed during the tick still run this once.
    ///
    /// Negative or non-finite deltas are rejected with a warning, as are
    /// ticks raised from inside a handler. Large deltas are passed through
    /// unchanged.
    pub fn update(&self, delta: f64) {
        if !delta.is_finite() || delta < 0.0 {
            warn!(delta, "ignoring invalid tick delta");
            return;
        }
        if self.bus.dispatching.get() {
            warn!("ignoring tick raised during dispatch");
            return;
        }

        let snapshot: Vec<Handler> = self
            .bus
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        let _guard = DispatchGuard::enter(&self.bus);
        for handler in snapshot {
            handler(delta);
        }
        self.bus.ticks.set(self.bus.ticks.get() + 1);
    }

    pub fn handler_count(&self) -> usize {
        self.bus.handlers.borrow().len()
    }

    /// Number of ticks dispatched so far.
    pub fn tick_count(&self) -> u64 {
        self.bus.ticks.get()
    }

    pub fn is_dispatching(&self) -> bool {
        self.bus.dispatching.get()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .field("ticks", &self.tick_count())
            .finish()
    }
}

struct DispatchGuard<'a> {
    bus: &'a Bus,
}

impl<'a> DispatchGuard<'a> {
    fn enter(bus: &'a Bus) -> Self {
        bus.dispatching.set(true);
        Self { bus }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.bus.dispatching.set(false);
    }
}

/// Handle to a registered tick handler. Dropping it unsubscribes.
#[must_use = "dropping the subscription removes the handler"]
pub struct Subscription {
    id: u64,
    bus: Weak<Bus>,
    attached: bool,
}

impl Subscription {
    /// Keep the handler registered for the lifetime of the bus.
    pub fn detach(mut self) {
        self.attached = false;
    }

    /// Remove the handler now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.attached {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            // Release the borrow before the handler is dropped; it may own
            // other subscriptions.
            let removed = {
                let mut handlers = bus.handlers.borrow_mut();
                handlers
                    .iter()
                    .position(|(id, _)| *id == self.id)
                    .map(|pos| handlers.remove(pos))
            };
            drop(removed);
            trace!(id = self.id, "tick handler unsubscribed");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.attached)
            .finish()
    }
}
