//! Milestones.
//!
//! A milestone is a one-way flag. `check` polls its predicate and, the
//! first time it holds, sets the flag and runs the completion action.
//! Later checks are no-ops even if the predicate keeps holding.

use crate::computable::{Computable, Visibility};
use crate::persistence::Persistent;
use std::fmt;
use std::rc::Rc;
use tracing::info;

/// A one-way achievement.
///
/// # Examples
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use zzidle::{Computable, Milestone};
///
/// let fired = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&fired);
/// let milestone = Milestone::new("first", true)
///     .on_complete(move || counter.set(counter.get() + 1));
///
/// assert!(milestone.check());
/// assert!(!milestone.check());
/// assert!(milestone.is_earned());
/// assert_eq!(fired.get(), 1);
/// ```
pub struct Milestone {
    label: String,
    earned: Persistent<bool>,
    should_earn: Computable<bool>,
    on_complete: Option<Rc<dyn Fn()>>,
    visibility: Computable<Visibility>,
    requirement: String,
    effect: String,
}

impl Milestone {
    pub fn new(label: impl Into<String>, should_earn: impl Into<Computable<bool>>) -> Self {
        Self {
            label: label.into(),
            earned: Persistent::new(false),
            should_earn: should_earn.into(),
            on_complete: None,
            visibility: Computable::constant(Visibility::Visible),
            requirement: String::new(),
            effect: String::new(),
        }
    }

    /// Action run once, when the milestone is earned.
    pub fn on_complete(mut self, action: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Rc::new(action));
        self
    }

    pub fn visibility(mut self, visibility: impl Into<Computable<Visibility>>) -> Self {
        self.visibility = visibility.into();
        self
    }

    pub fn display(mut self, requirement: impl Into<String>, effect: impl Into<String>) -> Self {
        self.requirement = requirement.into();
        self.effect = effect.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn requirement(&self) -> &str {
        &self.requirement
    }

    pub fn effect(&self) -> &str {
        &self.effect
    }

    pub fn is_earned(&self) -> bool {
        self.earned.get()
    }

    /// The durable earned flag.
    pub fn earned(&self) -> &Persistent<bool> {
        &self.earned
    }

    pub fn current_visibility(&self) -> Visibility {
        self.visibility.get()
    }

    /// Earn the milestone if its predicate holds.
    ///
    /// Returns true only on the transition to earned.
    pub fn check(&self) -> bool {
        if self.is_earned() || !self.should_earn.get() {
            return false;
        }
        self.earned.set(true);
        info!(milestone = %self.label, "milestone earned");
        if let Some(action) = &self.on_complete {
            action();
        }
        true
    }
}

impl fmt::Debug for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Milestone")
            .field("label", &self.label)
            .field("earned", &self.is_earned())
            .finish()
    }
}

/// An ordered progression of milestones.
///
/// Each milestone is displayed once the one before it is earned. Earning
/// is not gated: every milestone's own predicate decides.
#[derive(Debug, Default)]
pub struct MilestoneTrack {
    milestones: Vec<Milestone>,
}

impl MilestoneTrack {
    pub fn new(milestones: Vec<Milestone>) -> Self {
        Self { milestones }
    }

    pub fn push(&mut self, milestone: Milestone) {
        self.milestones.push(milestone);
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn get(&self, index: usize) -> Option<&Milestone> {
        self.milestones.get(index)
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// Check every milestone in order. Returns how many were newly earned.
    pub fn check_all(&self) -> usize {
        self.milestones.iter().filter(|m| m.check()).count()
    }

    pub fn earned_count(&self) -> usize {
        self.milestones.iter().filter(|m| m.is_earned()).count()
    }

    /// Display visibility of the milestone at `index`.
    ///
    /// Hidden until the previous milestone is earned, then the milestone's
    /// own visibility.
    pub fn display_visibility(&self, index: usize) -> Visibility {
        let Some(milestone) = self.milestones.get(index) else {
            return Visibility::Hidden;
        };
        if index > 0 && !self.milestones[index - 1].is_earned() {
            return Visibility::Hidden;
        }
        milestone.current_visibility()
    }
}
