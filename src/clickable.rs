//! Clickables.
//!
//! A `Clickable` is a user action guarded by `can_click`. The guard is
//! evaluated when the click happens, not when the button was drawn, so a
//! stale UI can never trigger a disallowed action.

use crate::computable::{Computable, Visibility};
use crate::events::{EventBus, Subscription};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

type Action = Rc<dyn Fn()>;

/// A guarded user action with an optional hold variant.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Clickable, Computable, Decimal, Resource};
///
/// let logs = Resource::new("logs", 0);
/// let target = logs.clone();
/// let chop = Clickable::new("chop")
///     .on_click(move || target.add(10));
///
/// assert!(chop.click());
/// assert_eq!(logs.value(), Decimal::from(10));
///
/// let locked = Clickable::new("locked").can_click(false).on_click(|| {});
/// assert!(!locked.click());
/// ```
pub struct Clickable {
    label: String,
    can_click: Computable<bool>,
    visibility: Computable<Visibility>,
    display: Computable<String>,
    on_click: Option<Action>,
    on_hold: Option<Action>,
    holding: Cell<bool>,
}

impl Clickable {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            display: Computable::constant(label.clone()),
            label,
            can_click: Computable::constant(true),
            visibility: Computable::constant(Visibility::Visible),
            on_click: None,
            on_hold: None,
            holding: Cell::new(false),
        }
    }

    pub fn can_click(mut self, can_click: impl Into<Computable<bool>>) -> Self {
        self.can_click = can_click.into();
        self
    }

    pub fn visibility(mut self, visibility: impl Into<Computable<Visibility>>) -> Self {
        self.visibility = visibility.into();
        self
    }

    pub fn display(mut self, display: impl Into<Computable<String>>) -> Self {
        self.display = display.into();
        self
    }

    pub fn on_click(mut self, action: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(action));
        self
    }

    /// Action fired on every tick while held.
    pub fn on_hold(mut self, action: impl Fn() + 'static) -> Self {
        self.on_hold = Some(Rc::new(action));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether a click right now would run the action.
    ///
    /// Requires the clickable to be visible and its guard to hold.
    pub fn is_clickable(&self) -> bool {
        self.visibility.get().is_visible() && self.can_click.get()
    }

    pub fn current_visibility(&self) -> Visibility {
        self.visibility.get()
    }

    pub fn current_display(&self) -> String {
        self.display.get()
    }

    /// Run the click action if allowed. Returns whether it ran.
    pub fn click(&self) -> bool {
        self.fire(self.on_click.as_ref(), "click")
    }

    /// Run the hold action if allowed. Returns whether it ran.
    pub fn hold(&self) -> bool {
        self.fire(self.on_hold.as_ref(), "hold")
    }

    fn fire(&self, action: Option<&Action>, kind: &str) -> bool {
        let Some(action) = action else {
            return false;
        };
        if !self.is_clickable() {
            trace!(clickable = %self.label, kind, "rejected");
            return false;
        }
        action();
        true
    }

    pub fn start_holding(&self) {
        self.holding.set(true);
    }

    pub fn stop_holding(&self) {
        self.holding.set(false);
    }

    pub fn is_holding(&self) -> bool {
        self.holding.get()
    }
}

impl fmt::Debug for Clickable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clickable")
            .field("label", &self.label)
            .field("holding", &self.holding.get())
            .finish()
    }
}

/// Click `clickable` on every tick while `active` holds.
///
/// Each tick re-checks `active` and the clickable's own guard. Held
/// clickables fire their hold action as well.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use zzidle::{auto_click, Clickable, Decimal, EventBus, Resource};
///
/// let bus = EventBus::new();
/// let logs = Resource::new("logs", 0);
/// let target = logs.clone();
/// let chop = Rc::new(Clickable::new("chop").on_click(move || target.add(1)));
///
/// let _auto = auto_click(&bus, Rc::clone(&chop), true);
/// bus.update(0.1);
/// bus.update(0.1);
/// assert_eq!(logs.value(), Decimal::from(2));
/// ```
pub fn auto_click(
    bus: &EventBus,
    clickable: Rc<Clickable>,
    active: impl Into<Computable<bool>>,
) -> Subscription {
    let active = active.into();
    bus.on_tick(move |_| {
        if !active.get() {
            return;
        }
        clickable.click();
        if clickable.is_holding() {
            clickable.hold();
        }
    })
}
