//! One-shot upgrades.

use crate::computable::{Computable, Visibility};
use crate::numeric::Decimal;
use crate::persistence::Persistent;
use crate::resource::Resource;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// A purchase that can be made once.
///
/// By default the upgrade is affordable when its resource covers the cost,
/// and purchasing deducts the cost. With a custom `can_afford` (used for
/// costs spread over several resources) nothing is deducted automatically;
/// the `on_purchase` action pays.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Decimal, Resource, Upgrade};
///
/// let coal = Resource::new("coal", 150);
/// let cutters = Upgrade::new("warmerCutters", coal.clone(), 100);
///
/// assert!(cutters.purchase());
/// assert!(cutters.is_bought());
/// assert_eq!(coal.value(), Decimal::from(50));
///
/// // bought at most once
/// assert!(!cutters.purchase());
/// ```
pub struct Upgrade {
    label: String,
    bought: Persistent<bool>,
    cost: Computable<Decimal>,
    resource: Option<Resource>,
    can_afford: Option<Computable<bool>>,
    visibility: Computable<Visibility>,
    on_purchase: Option<Rc<dyn Fn()>>,
}

impl Upgrade {
    /// An upgrade paid from `resource`.
    pub fn new(label: impl Into<String>, resource: Resource, cost: impl Into<Computable<Decimal>>) -> Self {
        Self {
            label: label.into(),
            bought: Persistent::new(false),
            cost: cost.into(),
            resource: Some(resource),
            can_afford: None,
            visibility: Computable::constant(Visibility::Visible),
            on_purchase: None,
        }
    }

    /// An upgrade with a custom affordability check and no automatic payment.
    pub fn custom(label: impl Into<String>, can_afford: impl Into<Computable<bool>>) -> Self {
        Self {
            label: label.into(),
            bought: Persistent::new(false),
            cost: Computable::constant(Decimal::ZERO),
            resource: None,
            can_afford: Some(can_afford.into()),
            visibility: Computable::constant(Visibility::Visible),
            on_purchase: None,
        }
    }

    pub fn visibility(mut self, visibility: impl Into<Computable<Visibility>>) -> Self {
        self.visibility = visibility.into();
        self
    }

    pub fn on_purchase(mut self, action: impl Fn() + 'static) -> Self {
        self.on_purchase = Some(Rc::new(action));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cost(&self) -> Decimal {
        self.cost.get()
    }

    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    pub fn is_bought(&self) -> bool {
        self.bought.get()
    }

    /// The durable flag, for registration and for gating modifiers.
    pub fn bought(&self) -> &Persistent<bool> {
        &self.bought
    }

    pub fn current_visibility(&self) -> Visibility {
        self.visibility.get()
    }

    pub fn can_afford(&self) -> bool {
        match (&self.can_afford, &self.resource) {
            (Some(check), _) => check.get(),
            (None, Some(resource)) => resource.value().gte(self.cost()),
            (None, None) => true,
        }
    }

    /// Whether `purchase` would succeed right now.
    pub fn can_purchase(&self) -> bool {
        !self.is_bought() && self.visibility.get().is_visible() && self.can_afford()
    }

    /// Buy the upgrade if allowed. Returns whether it was bought.
    pub fn purchase(&self) -> bool {
        if !self.can_purchase() {
            return false;
        }
        if self.can_afford.is_none() {
            if let Some(resource) = &self.resource {
                resource.sub(self.cost());
            }
        }
        self.bought.set(true);
        if let Some(action) = &self.on_purchase {
            action();
        }
        debug!(upgrade = %self.label, "purchased");
        true
    }
}

impl fmt::Debug for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upgrade")
            .field("label", &self.label)
            .field("bought", &self.is_bought())
            .field("cost", &self.cost())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unaffordable() {
        let logs = Resource::new("logs", 5);
        let upgrade = Upgrade::new("sharper", logs.clone(), 10);
        assert!(!upgrade.purchase());
        assert!(!upgrade.is_bought());
        assert_eq!(logs.value(), Decimal::from(5));
    }

    #[test]
    fn test_custom_cost_does_not_deduct() {
        let logs = Resource::new("logs", 100);
        let coal = Resource::new("coal", 100);
        let (l, c) = (logs.clone(), coal.clone());
        let (pl, pc) = (logs.clone(), coal.clone());
        let upgrade = Upgrade::custom(
            "schoolbooks",
            Computable::derived(move || l.value().gte(50) && c.value().gte(20)),
        )
        .on_purchase(move || {
            pl.sub(50);
            pc.sub(20);
        });
        assert!(upgrade.purchase());
        assert_eq!(logs.value(), Decimal::from(50));
        assert_eq!(coal.value(), Decimal::from(80));
    }

    #[test]
    fn test_hidden_cannot_purchase() {
        let logs = Resource::new("logs", 100);
        let upgrade = Upgrade::new("secret", logs, 1).visibility(Visibility::Disabled);
        assert!(!upgrade.can_purchase());
        assert!(!upgrade.purchase());
    }

    #[test]
    fn test_bought_flag_shared() {
        let logs = Resource::new("logs", 100);
        let upgrade = Upgrade::new("focus", logs, 1);
        let flag = upgrade.bought().clone();
        upgrade.purchase();
        assert!(flag.get());
    }
}
