//! Resources.
//!
//! A `Resource` is a named quantity backed by a durable cell. Cloning a
//! resource yields another handle to the same value, so layers read and
//! write each other's resources by reference.

use crate::computable::Computable;
use crate::numeric::{format, Decimal};
use crate::persistence::Persistent;
use std::fmt;
use std::rc::Rc;

/// A named, durable numeric quantity.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Decimal, Resource};
///
/// let logs = Resource::new("logs", Decimal::ZERO);
/// let shared = logs.clone();
///
/// shared.add(Decimal::from(35));
/// assert_eq!(logs.value(), Decimal::from(35));
/// assert_eq!(logs.to_string(), "35.00 logs");
/// ```
#[derive(Clone)]
pub struct Resource {
    display_name: Rc<str>,
    value: Persistent<Decimal>,
    precision: usize,
}

impl Resource {
    /// Create a resource starting at `initial`.
    pub fn new(display_name: &str, initial: impl Into<Decimal>) -> Self {
        Self {
            display_name: Rc::from(display_name),
            value: Persistent::new(initial.into()),
            precision: 2,
        }
    }

    /// A resource over an existing cell, such as a buyable's amount.
    ///
    /// The resource and the cell's other owners read and write the same
    /// value. Registration stays with whoever owns the cell.
    pub fn from_cell(display_name: &str, cell: Persistent<Decimal>) -> Self {
        Self {
            display_name: Rc::from(display_name),
            value: cell,
            precision: 2,
        }
    }

    /// Set the number of decimal places used for display.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn value(&self) -> Decimal {
        self.value.get()
    }

    pub fn set(&self, value: impl Into<Decimal>) {
        self.value.set(value.into());
    }

    pub fn add(&self, amount: impl Into<Decimal>) {
        let amount = amount.into();
        self.value.update(|v| *v += amount);
    }

    /// Subtract `amount`. Callers check affordability first.
    pub fn sub(&self, amount: impl Into<Decimal>) {
        let amount = amount.into();
        self.value.update(|v| *v -= amount);
    }

    pub fn reset(&self) {
        self.value.reset();
    }

    /// The durable cell behind this resource, for registration.
    pub fn persistent(&self) -> &Persistent<Decimal> {
        &self.value
    }

    /// A computable that tracks this resource's value.
    pub fn computable(&self) -> Computable<Decimal> {
        Computable::from(&self.value)
    }

    /// Format the current value using this resource's precision.
    pub fn format_value(&self) -> String {
        format(self.value(), self.precision)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format_value(), self.display_name)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("display_name", &self.display_name)
            .field("value", &self.value())
            .finish()
    }
}
