//! Progress trackers.
//!
//! A `ProgressTracker` accumulates every increase of a resource into a
//! durable total. Spending does not reduce the total, so it measures how
//! much was ever produced, which is what goals and milestones gate on.

use crate::computable::Computable;
use crate::numeric::Decimal;
use crate::persistence::Persistent;
use crate::resource::Resource;
use std::cell::Cell;
use std::fmt;

/// Accumulated production of a resource, with a goal.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Decimal, ProgressTracker, Resource};
///
/// let coal = Resource::new("coal", 0);
/// let tracker = ProgressTracker::new(coal.clone(), 100);
///
/// coal.add(60);
/// tracker.observe();
/// coal.sub(50);
/// tracker.observe();
/// coal.add(50);
/// tracker.observe();
///
/// assert_eq!(tracker.total(), Decimal::from(110));
/// assert!(tracker.is_complete());
/// ```
pub struct ProgressTracker {
    resource: Resource,
    total: Persistent<Decimal>,
    last_seen: Cell<Decimal>,
    goal: Computable<Decimal>,
}

impl ProgressTracker {
    pub fn new(resource: Resource, goal: impl Into<Computable<Decimal>>) -> Self {
        let last_seen = Cell::new(resource.value());
        Self {
            resource,
            total: Persistent::new(Decimal::ZERO),
            last_seen,
            goal: goal.into(),
        }
    }

    /// Add any increase since the last observation to the total.
    pub fn observe(&self) {
        let current = self.resource.value();
        let delta = current - self.last_seen.get();
        if delta.gt(0) {
            self.total.update(|t| *t += delta);
        }
        self.last_seen.set(current);
    }

    /// Forget the last observation, e.g. after loading a save.
    pub fn resync(&self) {
        self.last_seen.set(self.resource.value());
    }

    pub fn total(&self) -> Decimal {
        self.total.get()
    }

    /// The durable total.
    pub fn total_cell(&self) -> &Persistent<Decimal> {
        &self.total
    }

    pub fn goal(&self) -> Decimal {
        self.goal.get()
    }

    pub fn is_complete(&self) -> bool {
        self.total().gte(self.goal())
    }

    /// Fraction of the goal reached, clamped to `0..=1`.
    pub fn progress(&self) -> f64 {
        let goal = self.goal();
        if goal.lte(0) {
            return 1.0;
        }
        (self.total() / goal).to_f64().clamp(0.0, 1.0)
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("resource", &self.resource.display_name())
            .field("total", &self.total())
            .field("goal", &self.goal())
            .finish()
    }
}
