//! Computable values.
//!
//! A `Computable<T>` is either a constant or a derived value recomputed on
//! every read. Features accept computables wherever a value may depend on
//! other game state, and callers read them through `get()` without caring
//! which variant they hold.
//!
//! Derived closures must be pure: they are evaluated arbitrarily often,
//! including several times within one tick.

use crate::numeric::Decimal;
use crate::persistence::Persistent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A value that is either fixed or derived from other state.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Computable, Decimal, Persistent};
///
/// let fixed: Computable<Decimal> = Decimal::from(10).into();
/// assert_eq!(fixed.get(), Decimal::from(10));
///
/// let fires = Persistent::new(Decimal::from(2));
/// let reader = fires.clone();
/// let derived = Computable::derived(move || reader.get() * Decimal::from(1000));
/// assert_eq!(derived.get(), Decimal::from(2000));
///
/// fires.set(Decimal::from(3));
/// assert_eq!(derived.get(), Decimal::from(3000));
/// ```
pub enum Computable<T> {
    /// A fixed value.
    Constant(T),
    /// A value recomputed on each read.
    Derived(Rc<dyn Fn() -> T>),
}

impl<T: Clone> Computable<T> {
    /// Wrap a fixed value.
    pub fn constant(value: T) -> Self {
        Computable::Constant(value)
    }

    /// Wrap a closure that is re-run on every read.
    pub fn derived(f: impl Fn() -> T + 'static) -> Self {
        Computable::Derived(Rc::new(f))
    }

    /// Read the current value.
    pub fn get(&self) -> T {
        match self {
            Computable::Constant(value) => value.clone(),
            Computable::Derived(f) => f(),
        }
    }

    /// Whether this computable is a fixed value.
    pub fn is_constant(&self) -> bool {
        matches!(self, Computable::Constant(_))
    }

    /// Derive a new computable by mapping this one's value.
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(T) -> U + 'static) -> Computable<U>
    where
        T: 'static,
    {
        match self {
            Computable::Constant(value) => Computable::Constant(f(value.clone())),
            Computable::Derived(source) => {
                let source = Rc::clone(source);
                Computable::derived(move || f(source()))
            }
        }
    }
}

impl<T: Clone> Clone for Computable<T> {
    fn clone(&self) -> Self {
        match self {
            Computable::Constant(value) => Computable::Constant(value.clone()),
            Computable::Derived(f) => Computable::Derived(Rc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Computable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Computable::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Computable::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

impl<T: Clone + Default> Default for Computable<T> {
    fn default() -> Self {
        Computable::Constant(T::default())
    }
}

impl From<Decimal> for Computable<Decimal> {
    fn from(value: Decimal) -> Self {
        Computable::Constant(value)
    }
}

impl From<f64> for Computable<Decimal> {
    fn from(value: f64) -> Self {
        Computable::Constant(Decimal::from(value))
    }
}

impl From<i32> for Computable<Decimal> {
    fn from(value: i32) -> Self {
        Computable::Constant(Decimal::from(value))
    }
}

impl From<bool> for Computable<bool> {
    fn from(value: bool) -> Self {
        Computable::Constant(value)
    }
}

impl From<&str> for Computable<String> {
    fn from(value: &str) -> Self {
        Computable::Constant(value.to_string())
    }
}

impl From<String> for Computable<String> {
    fn from(value: String) -> Self {
        Computable::Constant(value)
    }
}

impl From<Visibility> for Computable<Visibility> {
    fn from(value: Visibility) -> Self {
        Computable::Constant(value)
    }
}

/// A durable cell read as a computable tracks the cell's current value.
impl<T: Clone + 'static> From<Persistent<T>> for Computable<T> {
    fn from(cell: Persistent<T>) -> Self {
        Computable::derived(move || cell.get())
    }
}

impl<T: Clone + 'static> From<&Persistent<T>> for Computable<T> {
    fn from(cell: &Persistent<T>) -> Self {
        Computable::from(cell.clone())
    }
}

/// Visibility of a user-facing feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Shown and interactive.
    #[default]
    Visible,
    /// Not shown.
    Hidden,
    /// Shown but not interactive.
    Disabled,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

/// `Visible` when `condition` holds, `Hidden` otherwise.
pub fn show_if(condition: bool) -> Visibility {
    if condition {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_constant() {
        let c: Computable<Decimal> = 5.0.into();
        assert!(c.is_constant());
        assert_eq!(c.get(), Decimal::from(5));
    }

    #[test]
    fn test_derived_is_lazy() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let c = Computable::derived(move || {
            counter.set(counter.get() + 1);
            true
        });
        assert_eq!(calls.get(), 0);
        assert!(c.get());
        assert!(c.get());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_clone_shares_closure() {
        let cell = Persistent::new(Decimal::from(1));
        let c: Computable<Decimal> = Computable::from(&cell);
        let copy = c.clone();
        cell.set(Decimal::from(4));
        assert_eq!(copy.get(), Decimal::from(4));
    }

    #[test]
    fn test_map() {
        let cell = Persistent::new(Decimal::from(2));
        let doubled = Computable::from(&cell).map(|v| v * Decimal::from(2));
        assert_eq!(doubled.get(), Decimal::from(4));
        cell.set(Decimal::from(5));
        assert_eq!(doubled.get(), Decimal::from(10));

        let label = Computable::constant(3).map(|v| format!("{} fires", v));
        assert!(label.is_constant());
        assert_eq!(label.get(), "3 fires");
    }

    #[test]
    fn test_show_if() {
        assert_eq!(show_if(true), Visibility::Visible);
        assert_eq!(show_if(false), Visibility::Hidden);
        assert!(!Visibility::Disabled.is_visible());
    }
}
