//! Scaling curves for conversions.
//!
//! A scaling maps an amount of base resource to a raw gain, and maps a gain
//! back to the base amount needed to reach it. Both directions are needed:
//! the first to show what a conversion yields, the second to know what it
//! costs.

use crate::computable::Computable;
use crate::numeric::Decimal;

/// A gain curve over a base resource amount.
pub trait Scaling {
    /// Raw gain for `base_amount`, before any gain modifier or rounding.
    fn gain(&self, base_amount: Decimal) -> Decimal;

    /// Base amount needed to reach `gain`. Inverse of [`Scaling::gain`]
    /// above the threshold.
    fn cost_of(&self, gain: Decimal) -> Decimal;

    /// The base amount below which the gain is zero.
    fn threshold(&self) -> Decimal;
}

/// `gain = (amount / base)^(1 / exponent)`, zero below `base`.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Decimal, PolynomialScaling, Scaling};
///
/// let boxes = PolynomialScaling::new(1e10, 1.0);
/// assert_eq!(boxes.gain(Decimal::from(1e10)), Decimal::ONE);
/// assert_eq!(boxes.gain(Decimal::from(5e9)), Decimal::ZERO);
/// assert_eq!(boxes.cost_of(Decimal::from(3)), Decimal::from(3e10));
/// ```
#[derive(Debug, Clone)]
pub struct PolynomialScaling {
    base: Computable<Decimal>,
    exponent: Computable<Decimal>,
}

impl PolynomialScaling {
    pub fn new(base: impl Into<Computable<Decimal>>, exponent: impl Into<Computable<Decimal>>) -> Self {
        Self {
            base: base.into(),
            exponent: exponent.into(),
        }
    }
}

impl Scaling for PolynomialScaling {
    fn gain(&self, base_amount: Decimal) -> Decimal {
        let base = self.base.get();
        if base_amount.lt(base) {
            return Decimal::ZERO;
        }
        (base_amount / base).root(self.exponent.get())
    }

    fn cost_of(&self, gain: Decimal) -> Decimal {
        gain.max(Decimal::ZERO).pow(self.exponent.get()) * self.base.get()
    }

    fn threshold(&self) -> Decimal {
        self.base.get()
    }
}

/// `gain = log_coefficient(amount / base) + 1`, zero below `base`.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Decimal, ExponentialScaling, Scaling};
///
/// let scaling = ExponentialScaling::new(100, 10);
/// assert_eq!(scaling.gain(Decimal::from(1000)), Decimal::from(2));
/// assert_eq!(scaling.cost_of(Decimal::from(3)), Decimal::from(10_000));
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialScaling {
    base: Computable<Decimal>,
    coefficient: Computable<Decimal>,
}

impl ExponentialScaling {
    pub fn new(base: impl Into<Computable<Decimal>>, coefficient: impl Into<Computable<Decimal>>) -> Self {
        Self {
            base: base.into(),
            coefficient: coefficient.into(),
        }
    }
}

impl Scaling for ExponentialScaling {
    fn gain(&self, base_amount: Decimal) -> Decimal {
        let base = self.base.get();
        if base_amount.lt(base) {
            return Decimal::ZERO;
        }
        (base_amount / base).log(self.coefficient.get()) + Decimal::ONE
    }

    fn cost_of(&self, gain: Decimal) -> Decimal {
        if gain.lte(0) {
            return Decimal::ZERO;
        }
        self.coefficient.get().pow(gain - Decimal::ONE) * self.base.get()
    }

    fn threshold(&self) -> Decimal {
        self.base.get()
    }
}
