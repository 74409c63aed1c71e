//! Active counts.
//!
//! Some buyables represent instances that run at the same time, such as
//! fires burning logs. An `ActiveBuyable` pairs the buyable with a durable
//! count of how many owned instances are currently running. Idle instances
//! stay owned and can be re-activated; nothing is refunded.

use crate::buyable::Buyable;
use crate::numeric::Decimal;
use crate::persistence::Persistent;
use std::ops::Deref;
use tracing::debug;

/// A buyable with an active-instance counter.
///
/// Invariant: `0 <= active <= amount` after every operation of this type.
///
/// # Examples
///
/// ```rust
/// use zzidle::{ActiveBuyable, Buyable, Decimal, Resource};
///
/// let logs = Resource::new("logs", 35);
/// let fires = ActiveBuyable::new(Buyable::new("fires", logs.clone(), |amount| {
///     Decimal::from(10) * Decimal::from(2).pow(amount)
/// }));
///
/// assert_eq!(fires.add(3), 2);
/// assert_eq!(fires.active(), Decimal::from(2));
///
/// fires.remove(5);
/// assert_eq!(fires.active(), Decimal::ZERO);
/// assert_eq!(fires.amount(), Decimal::from(2));
/// ```
#[derive(Debug)]
pub struct ActiveBuyable {
    buyable: Buyable,
    active: Persistent<Decimal>,
}

impl ActiveBuyable {
    /// Wrap a buyable. Every purchase of it, through any purchase path,
    /// starts the new instance active.
    pub fn new(buyable: Buyable) -> Self {
        let active = Persistent::new(Decimal::ZERO);
        let started = active.clone();
        let buyable = buyable.before_purchase(move |_| started.update(|a| *a += Decimal::ONE));
        Self { buyable, active }
    }

    pub fn buyable(&self) -> &Buyable {
        &self.buyable
    }

    pub fn active(&self) -> Decimal {
        self.active.get()
    }

    /// The durable active counter.
    pub fn active_cell(&self) -> &Persistent<Decimal> {
        &self.active
    }

    /// Owned instances that are not running.
    pub fn idle(&self) -> Decimal {
        (self.buyable.amount() - self.active()).max(Decimal::ZERO)
    }

    /// Buy one instance and start it. Returns whether it was bought.
    pub fn purchase(&self) -> bool {
        self.buyable.purchase()
    }

    /// Buy up to `count` new instances, each starting active.
    ///
    /// Stops at the first purchase that is refused, whether for cost or
    /// the purchase limit. Returns the number bought.
    pub fn add(&self, count: u64) -> u64 {
        let mut added = 0;
        while added < count && self.purchase() {
            added += 1;
        }
        debug!(buyable = %self.buyable.label(), added, active = %self.active(), "added active instances");
        added
    }

    /// Stop up to `count` running instances. The active count never goes
    /// below zero; nothing is refunded.
    pub fn remove(&self, count: impl Into<Decimal>) {
        let count = count.into();
        self.active.update(|a| *a = (*a - count).max(Decimal::ZERO));
    }

    /// Restart up to `count` idle instances.
    pub fn activate(&self, count: impl Into<Decimal>) {
        let count = count.into();
        let owned = self.buyable.amount();
        self.active.update(|a| *a = (*a + count).min(owned));
    }

    /// Stop every instance.
    pub fn min(&self) {
        self.active.set(Decimal::ZERO);
    }

    /// Run every owned instance.
    pub fn max(&self) {
        self.active.set(self.buyable.amount());
    }

    /// Clamp the active count back into `0..=amount`.
    pub fn clamp(&self) {
        let owned = self.buyable.amount();
        self.active.update(|a| *a = a.max(Decimal::ZERO).min(owned));
    }
}

impl Deref for ActiveBuyable {
    type Target = Buyable;

    fn deref(&self) -> &Buyable {
        &self.buyable
    }
}
