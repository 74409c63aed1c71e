//! Repeatable purchases.
//!
//! A `Buyable` has an amount counter and a cost that depends on it. Bulk
//! purchases repeat single purchases, so they stop as soon as one is
//! refused.
//!
//! Buy-max relies on the cost never decreasing as the amount grows. That
//! precondition is not checked during purchases; `buy_max` is bounded and
//! reports `UnboundedPurchase` when the bound is hit, and
//! `verify_cost_monotonic` checks the cost curve up front.

use crate::computable::{Computable, Visibility};
use crate::error::FrameworkError;
use crate::numeric::Decimal;
use crate::persistence::Persistent;
use crate::resource::Resource;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Default bound on purchases made by one `buy_max` call.
pub const DEFAULT_MAX_BULK_PURCHASES: u64 = 10_000;

type CostFn = Rc<dyn Fn(Decimal) -> Decimal>;

/// A repeatable purchase with an amount-dependent cost.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Buyable, Decimal, Resource};
///
/// let logs = Resource::new("logs", 35);
/// let planters = Buyable::new("planters", logs.clone(), |amount| {
///     Decimal::from(10) * Decimal::from(2).pow(amount)
/// });
///
/// // levels cost 10, 20, 40: the third is out of reach
/// assert_eq!(planters.buy_many(3), 2);
/// assert_eq!(planters.amount(), Decimal::from(2));
/// assert_eq!(logs.value(), Decimal::from(5));
/// ```
pub struct Buyable {
    label: String,
    amount: Persistent<Decimal>,
    cost: CostFn,
    resource: Option<Resource>,
    purchase_limit: Computable<Decimal>,
    visibility: Computable<Visibility>,
    can_purchase: Option<Computable<bool>>,
    on_purchase: Option<Rc<dyn Fn(Decimal)>>,
    max_bulk: u64,
}

impl Buyable {
    /// A buyable paid from `resource` with the given cost curve.
    pub fn new(
        label: impl Into<String>,
        resource: Resource,
        cost: impl Fn(Decimal) -> Decimal + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            amount: Persistent::new(Decimal::ZERO),
            cost: Rc::new(cost),
            resource: Some(resource),
            purchase_limit: Computable::constant(Decimal::INFINITY),
            visibility: Computable::constant(Visibility::Visible),
            can_purchase: None,
            on_purchase: None,
            max_bulk: DEFAULT_MAX_BULK_PURCHASES,
        }
    }

    /// A buyable with a custom purchase check and no automatic payment.
    ///
    /// The cost curve is still reported through `cost()`; `on_purchase`
    /// is responsible for spending.
    pub fn custom(
        label: impl Into<String>,
        cost: impl Fn(Decimal) -> Decimal + 'static,
        can_purchase: impl Into<Computable<bool>>,
    ) -> Self {
        Self {
            label: label.into(),
            amount: Persistent::new(Decimal::ZERO),
            cost: Rc::new(cost),
            resource: None,
            purchase_limit: Computable::constant(Decimal::INFINITY),
            visibility: Computable::constant(Visibility::Visible),
            can_purchase: Some(can_purchase.into()),
            on_purchase: None,
            max_bulk: DEFAULT_MAX_BULK_PURCHASES,
        }
    }

    pub fn purchase_limit(mut self, limit: impl Into<Computable<Decimal>>) -> Self {
        self.purchase_limit = limit.into();
        self
    }

    pub fn visibility(mut self, visibility: impl Into<Computable<Visibility>>) -> Self {
        self.visibility = visibility.into();
        self
    }

    /// Action run after each purchase, given the cost that was paid.
    pub fn on_purchase(mut self, action: impl Fn(Decimal) + 'static) -> Self {
        self.on_purchase = Some(Rc::new(action));
        self
    }

    /// Run `action` after every purchase, ahead of any `on_purchase` action.
    pub(crate) fn before_purchase(mut self, action: impl Fn(Decimal) + 'static) -> Self {
        let then = self.on_purchase.take();
        self.on_purchase = Some(Rc::new(move |cost| {
            action(cost);
            if let Some(then) = &then {
                then(cost);
            }
        }));
        self
    }

    /// Override the purchase check. Payment from the resource still applies.
    pub fn can_purchase_when(mut self, check: impl Into<Computable<bool>>) -> Self {
        self.can_purchase = Some(check.into());
        self
    }

    /// Bound on purchases made by one `buy_max` call.
    pub fn max_bulk(mut self, limit: u64) -> Self {
        self.max_bulk = limit;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> Decimal {
        self.amount.get()
    }

    /// The durable amount counter.
    pub fn amount_cell(&self) -> &Persistent<Decimal> {
        &self.amount
    }

    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    /// Cost of the next level.
    pub fn cost(&self) -> Decimal {
        (self.cost)(self.amount())
    }

    /// Cost of buying the level after `amount` levels are owned.
    pub fn cost_at(&self, amount: impl Into<Decimal>) -> Decimal {
        (self.cost)(amount.into())
    }

    pub fn limit(&self) -> Decimal {
        self.purchase_limit.get()
    }

    pub fn is_maxed(&self) -> bool {
        self.amount().gte(self.limit())
    }

    pub fn current_visibility(&self) -> Visibility {
        self.visibility.get()
    }

    pub fn can_afford(&self) -> bool {
        match &self.resource {
            Some(resource) => resource.value().gte(self.cost()),
            None => true,
        }
    }

    /// Whether `purchase` would succeed right now.
    pub fn can_purchase(&self) -> bool {
        if !self.visibility.get().is_visible() || self.is_maxed() {
            return false;
        }
        match &self.can_purchase {
            Some(check) => check.get(),
            None => self.can_afford(),
        }
    }

    /// Buy one level if allowed. Returns whether it was bought.
    pub fn purchase(&self) -> bool {
        if !self.can_purchase() {
            trace!(buyable = %self.label, "purchase rejected");
            return false;
        }
        let cost = self.cost();
        if let Some(resource) = &self.resource {
            resource.sub(cost);
        }
        self.amount.update(|a| *a += Decimal::ONE);
        if let Some(action) = &self.on_purchase {
            action(cost);
        }
        trace!(buyable = %self.label, amount = %self.amount(), %cost, "purchased");
        true
    }

    /// Buy up to `count` levels, stopping at the first refusal.
    ///
    /// Returns the number bought.
    pub fn buy_many(&self, count: u64) -> u64 {
        let mut bought = 0;
        while bought < count && self.purchase() {
            bought += 1;
        }
        if bought > 0 {
            debug!(buyable = %self.label, bought, requested = count, "bulk purchase");
        }
        bought
    }

    /// Buy as many levels as possible.
    ///
    /// # Errors
    ///
    /// `UnboundedPurchase` if purchases are still possible after the bulk
    /// bound was reached. The levels bought so far are kept.
    pub fn buy_max(&self) -> Result<u64, FrameworkError> {
        let bought = self.buy_many(self.max_bulk);
        if bought == self.max_bulk && self.can_purchase() {
            return Err(FrameworkError::UnboundedPurchase {
                label: self.label.clone(),
                limit: self.max_bulk,
            });
        }
        Ok(bought)
    }

    /// Check that the cost never decreases over the first `levels` levels.
    ///
    /// # Errors
    ///
    /// `NonMonotonicCost` naming the first level whose successor is cheaper.
    pub fn verify_cost_monotonic(&self, levels: u64) -> Result<(), FrameworkError> {
        let mut previous = self.cost_at(Decimal::ZERO);
        for level in 1..=levels {
            let next = self.cost_at(level);
            if next.lt(previous) {
                return Err(FrameworkError::NonMonotonicCost {
                    label: self.label.clone(),
                    level: level - 1,
                });
            }
            previous = next;
        }
        Ok(())
    }
}

impl fmt::Debug for Buyable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buyable")
            .field("label", &self.label)
            .field("amount", &self.amount())
            .field("cost", &self.cost())
            .field("limit", &self.limit())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn doubling(logs: &Resource) -> Buyable {
        Buyable::new("fires", logs.clone(), |amount| {
            Decimal::from(10) * Decimal::from(2).pow(amount)
        })
    }

    #[test]
    fn test_purchase_pays_and_counts() {
        let logs = Resource::new("logs", 100);
        let fires = doubling(&logs);
        assert_eq!(fires.cost(), Decimal::from(10));
        assert!(fires.purchase());
        assert_eq!(fires.amount(), Decimal::ONE);
        assert_eq!(fires.cost(), Decimal::from(20));
        assert_eq!(logs.value(), Decimal::from(90));
    }

    #[test]
    fn test_purchase_limit() {
        let logs = Resource::new("logs", 1_000);
        let schools = Buyable::new("schools", logs.clone(), |_| Decimal::ONE).purchase_limit(5);
        assert_eq!(schools.buy_many(10), 5);
        assert!(schools.is_maxed());
        assert!(!schools.purchase());
        assert_eq!(logs.value(), Decimal::from(995));
    }

    #[test]
    fn test_on_purchase_receives_cost() {
        let logs = Resource::new("logs", 100);
        let paid = Rc::new(Cell::new(Decimal::ZERO));
        let sink = Rc::clone(&paid);
        let fires = doubling(&logs).on_purchase(move |cost| sink.set(sink.get() + cost));
        fires.buy_many(2);
        assert_eq!(paid.get(), Decimal::from(30));
    }

    #[test]
    fn test_hidden_blocks_purchase() {
        let logs = Resource::new("logs", 100);
        let fires = doubling(&logs).visibility(Visibility::Hidden);
        assert!(!fires.purchase());
        assert_eq!(fires.buy_many(3), 0);
    }

    #[test]
    fn test_buy_max_monotonic() {
        let logs = Resource::new("logs", 149);
        let fires = doubling(&logs);
        assert_eq!(fires.buy_max().unwrap(), 3);
        assert_eq!(logs.value(), Decimal::from(79));
    }

    #[test]
    fn test_buy_max_unbounded() {
        let logs = Resource::new("logs", 10);
        let free = Buyable::new("free", logs, |_| Decimal::ZERO).max_bulk(50);
        let err = free.buy_max().unwrap_err();
        assert_eq!(
            err,
            FrameworkError::UnboundedPurchase {
                label: "free".into(),
                limit: 50,
            }
        );
        assert_eq!(free.amount(), Decimal::from(50));
    }

    #[test]
    fn test_verify_cost_monotonic() {
        let logs = Resource::new("logs", 0);
        assert!(doubling(&logs).verify_cost_monotonic(50).is_ok());

        let discounted = Buyable::new("discounted", logs, |amount| {
            // cost dips once the synergy bonus kicks in at level 3
            let base = Decimal::from(10) * (amount + Decimal::ONE);
            if amount.gte(3) {
                base / Decimal::from(2)
            } else {
                base
            }
        });
        assert_eq!(
            discounted.verify_cost_monotonic(10).unwrap_err(),
            FrameworkError::NonMonotonicCost {
                label: "discounted".into(),
                level: 2,
            }
        );
    }

    #[test]
    fn test_custom_check_skips_payment() {
        let ok = Rc::new(Cell::new(true));
        let gate = Rc::clone(&ok);
        let school = Buyable::custom("school", |_| Decimal::from(1e4), Computable::derived(move || gate.get()));
        assert!(school.purchase());
        ok.set(false);
        assert!(!school.purchase());
        assert_eq!(school.amount(), Decimal::ONE);
        assert!(school.resource().is_none());
    }
}
