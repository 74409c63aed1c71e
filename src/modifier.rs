//! Modifiers module.
//!
//! Modifiers transform a base value. Elementary modifiers add, multiply or
//! raise to a power; a `SequentialModifier` folds a value through an
//! ordered list of them. Order is significant: `(10 + 5) × 2` and
//! `10 × 2 + 5` are different modifiers.
//!
//! Every elementary modifier carries an `enabled` gate. A disabled modifier
//! is the identity for both `apply` and `invert`, so toggling a gate never
//! breaks the round-trip `invert(apply(x)) == x`.

use crate::breakdown::BreakdownStep;
use crate::computable::Computable;
use crate::numeric::{format, Decimal};
use std::fmt;
use std::rc::Rc;

/// A describable, optionally invertible transformation of a value.
///
/// Implementations must be pure: `apply` is re-run whenever a rate or
/// cost is read.
pub trait Modifier {
    /// Transform `value`. Disabled modifiers return `value` unchanged.
    fn apply(&self, value: Decimal) -> Decimal;

    /// Undo `apply`, or `None` if this modifier cannot be inverted.
    fn invert(&self, value: Decimal) -> Option<Decimal>;

    /// Whether `invert` is defined.
    fn invertible(&self) -> bool;

    /// Whether the modifier currently contributes.
    fn enabled(&self) -> bool {
        true
    }

    /// Human-readable description for breakdowns.
    fn description(&self) -> Option<String> {
        None
    }

    /// Short form of the effect, e.g. `+5.00` or `×2.00`.
    fn effect(&self) -> String;

    /// Apply while recording each enabled step.
    fn explain(&self, value: Decimal, steps: &mut Vec<BreakdownStep>) -> Decimal {
        if !self.enabled() {
            return value;
        }
        let result = self.apply(value);
        let effect = self.effect();
        steps.push(BreakdownStep {
            description: self.description().unwrap_or_else(|| effect.clone()),
            effect,
            value: result,
        });
        result
    }
}

/// Adds a value.
///
/// # Examples
///
/// ```rust
/// use zzidle::{AdditiveModifier, Decimal, Modifier};
///
/// let planters = AdditiveModifier::new(5.0).described("Planters");
/// assert_eq!(planters.apply(Decimal::from(10)), Decimal::from(15));
/// assert_eq!(planters.invert(Decimal::from(15)), Some(Decimal::from(10)));
/// ```
#[derive(Clone)]
pub struct AdditiveModifier {
    addend: Computable<Decimal>,
    description: Option<String>,
    enabled: Computable<bool>,
}

impl AdditiveModifier {
    pub fn new(addend: impl Into<Computable<Decimal>>) -> Self {
        Self {
            addend: addend.into(),
            description: None,
            enabled: Computable::constant(true),
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enabled_when(mut self, enabled: impl Into<Computable<bool>>) -> Self {
        self.enabled = enabled.into();
        self
    }

    pub fn addend(&self) -> Decimal {
        self.addend.get()
    }
}

impl Modifier for AdditiveModifier {
    fn apply(&self, value: Decimal) -> Decimal {
        if self.enabled.get() {
            value + self.addend.get()
        } else {
            value
        }
    }

    fn invert(&self, value: Decimal) -> Option<Decimal> {
        if self.enabled.get() {
            Some(value - self.addend.get())
        } else {
            Some(value)
        }
    }

    fn invertible(&self) -> bool {
        true
    }

    fn enabled(&self) -> bool {
        self.enabled.get()
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }

    fn effect(&self) -> String {
        let addend = self.addend.get();
        if addend.lt(0) {
            format!("-{}", format(addend.abs(), 2))
        } else {
            format!("+{}", format(addend, 2))
        }
    }
}

/// Multiplies by a value.
///
/// A multiplier of zero is allowed; inverting it yields a non-finite value.
#[derive(Clone)]
pub struct MultiplicativeModifier {
    multiplier: Computable<Decimal>,
    description: Option<String>,
    enabled: Computable<bool>,
}

impl MultiplicativeModifier {
    pub fn new(multiplier: impl Into<Computable<Decimal>>) -> Self {
        Self {
            multiplier: multiplier.into(),
            description: None,
            enabled: Computable::constant(true),
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enabled_when(mut self, enabled: impl Into<Computable<bool>>) -> Self {
        self.enabled = enabled.into();
        self
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier.get()
    }
}

impl Modifier for MultiplicativeModifier {
    fn apply(&self, value: Decimal) -> Decimal {
        if self.enabled.get() {
            value * self.multiplier.get()
        } else {
            value
        }
    }

    fn invert(&self, value: Decimal) -> Option<Decimal> {
        if self.enabled.get() {
            Some(value / self.multiplier.get())
        } else {
            Some(value)
        }
    }

    fn invertible(&self) -> bool {
        true
    }

    fn enabled(&self) -> bool {
        self.enabled.get()
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }

    fn effect(&self) -> String {
        format!("×{}", format(self.multiplier.get(), 2))
    }
}

/// Raises to a power.
///
/// With `support_low_numbers` the value is shifted by one first:
/// `apply(x) = (x + 1)^e - 1`. For `e > 1` this still grows every positive
/// value, including those below one, where a plain power would shrink them.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Decimal, ExponentialModifier, Modifier};
///
/// let plain = ExponentialModifier::new(2.0);
/// assert_eq!(plain.apply(Decimal::from(0.5)), Decimal::from(0.25));
///
/// let low = ExponentialModifier::new(2.0).support_low_numbers();
/// assert_eq!(low.apply(Decimal::from(0.5)), Decimal::from(1.25));
/// ```
#[derive(Clone)]
pub struct ExponentialModifier {
    exponent: Computable<Decimal>,
    description: Option<String>,
    enabled: Computable<bool>,
    low_numbers: bool,
}

impl ExponentialModifier {
    pub fn new(exponent: impl Into<Computable<Decimal>>) -> Self {
        Self {
            exponent: exponent.into(),
            description: None,
            enabled: Computable::constant(true),
            low_numbers: false,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enabled_when(mut self, enabled: impl Into<Computable<bool>>) -> Self {
        self.enabled = enabled.into();
        self
    }

    /// Use the shifted formula that stays monotonic below one.
    pub fn support_low_numbers(mut self) -> Self {
        self.low_numbers = true;
        self
    }

    pub fn exponent(&self) -> Decimal {
        self.exponent.get()
    }
}

impl Modifier for ExponentialModifier {
    fn apply(&self, value: Decimal) -> Decimal {
        if !self.enabled.get() {
            return value;
        }
        let exponent = self.exponent.get();
        if self.low_numbers {
            (value + Decimal::ONE).pow(exponent) - Decimal::ONE
        } else {
            value.pow(exponent)
        }
    }

    fn invert(&self, value: Decimal) -> Option<Decimal> {
        if !self.enabled.get() {
            return Some(value);
        }
        let exponent = self.exponent.get();
        if self.low_numbers {
            Some((value + Decimal::ONE).root(exponent) - Decimal::ONE)
        } else {
            Some(value.root(exponent))
        }
    }

    fn invertible(&self) -> bool {
        true
    }

    fn enabled(&self) -> bool {
        self.enabled.get()
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }

    fn effect(&self) -> String {
        format!("^{}", format(self.exponent.get(), 2))
    }
}

/// A modifier defined by closures, for effects the elementary kinds can't express.
#[derive(Clone)]
pub struct CustomModifier {
    apply: Rc<dyn Fn(Decimal) -> Decimal>,
    invert: Option<Rc<dyn Fn(Decimal) -> Decimal>>,
    description: Option<String>,
    enabled: Computable<bool>,
}

impl CustomModifier {
    pub fn new(apply: impl Fn(Decimal) -> Decimal + 'static) -> Self {
        Self {
            apply: Rc::new(apply),
            invert: None,
            description: None,
            enabled: Computable::constant(true),
        }
    }

    pub fn with_inverse(mut self, invert: impl Fn(Decimal) -> Decimal + 'static) -> Self {
        self.invert = Some(Rc::new(invert));
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn enabled_when(mut self, enabled: impl Into<Computable<bool>>) -> Self {
        self.enabled = enabled.into();
        self
    }
}

impl Modifier for CustomModifier {
    fn apply(&self, value: Decimal) -> Decimal {
        if self.enabled.get() {
            (self.apply)(value)
        } else {
            value
        }
    }

    fn invert(&self, value: Decimal) -> Option<Decimal> {
        let invert = self.invert.as_ref()?;
        if self.enabled.get() {
            Some(invert(value))
        } else {
            Some(value)
        }
    }

    fn invertible(&self) -> bool {
        self.invert.is_some()
    }

    fn enabled(&self) -> bool {
        self.enabled.get()
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }

    fn effect(&self) -> String {
        String::from("custom")
    }
}

/// An ordered list of modifiers applied one after another.
///
/// `apply` folds left to right over the enabled entries. `invert` is only
/// defined when every entry is invertible, and folds right to left.
///
/// # Examples
///
/// ```rust
/// use zzidle::{AdditiveModifier, Decimal, Modifier, MultiplicativeModifier, SequentialModifier};
///
/// let add_then_mul = SequentialModifier::new()
///     .then(AdditiveModifier::new(5.0))
///     .then(MultiplicativeModifier::new(2.0));
/// assert_eq!(add_then_mul.apply(Decimal::from(10)), Decimal::from(30));
///
/// let mul_then_add = SequentialModifier::new()
///     .then(MultiplicativeModifier::new(2.0))
///     .then(AdditiveModifier::new(5.0));
/// assert_eq!(mul_then_add.apply(Decimal::from(10)), Decimal::from(25));
/// ```
#[derive(Default)]
pub struct SequentialModifier {
    entries: Vec<Box<dyn Modifier>>,
}

impl SequentialModifier {
    /// An empty sequence, which is the identity.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Box<dyn Modifier>>) -> Self {
        Self { entries }
    }

    /// Append a modifier.
    pub fn then(mut self, modifier: impl Modifier + 'static) -> Self {
        self.entries.push(Box::new(modifier));
        self
    }

    pub fn push(&mut self, modifier: Box<dyn Modifier>) {
        self.entries.push(modifier);
    }

    pub fn entries(&self) -> &[Box<dyn Modifier>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Modifier for SequentialModifier {
    fn apply(&self, value: Decimal) -> Decimal {
        self.entries
            .iter()
            .filter(|m| m.enabled())
            .fold(value, |acc, m| m.apply(acc))
    }

    fn invert(&self, value: Decimal) -> Option<Decimal> {
        if !self.invertible() {
            return None;
        }
        self.entries
            .iter()
            .rev()
            .filter(|m| m.enabled())
            .try_fold(value, |acc, m| m.invert(acc))
    }

    fn invertible(&self) -> bool {
        self.entries.iter().all(|m| m.invertible())
    }

    fn enabled(&self) -> bool {
        self.entries.iter().any(|m| m.enabled())
    }

    fn description(&self) -> Option<String> {
        let lines: Vec<String> = self
            .entries
            .iter()
            .filter(|m| m.enabled())
            .filter_map(|m| m.description())
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    fn effect(&self) -> String {
        self.entries
            .iter()
            .filter(|m| m.enabled())
            .map(|m| m.effect())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn explain(&self, value: Decimal, steps: &mut Vec<BreakdownStep>) -> Decimal {
        self.entries
            .iter()
            .fold(value, |acc, m| m.explain(acc, steps))
    }
}

impl fmt::Debug for SequentialModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialModifier")
            .field(
                "entries",
                &self.entries.iter().map(|m| m.effect()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Persistent;

    #[test]
    fn test_additive() {
        let m = AdditiveModifier::new(-5.0);
        assert_eq!(m.apply(Decimal::from(10)), Decimal::from(5));
        assert_eq!(m.effect(), "-5.00");
        assert_eq!(AdditiveModifier::new(3).effect(), "+3.00");
    }

    #[test]
    fn test_multiplicative_by_zero() {
        let m = MultiplicativeModifier::new(0.0);
        assert_eq!(m.apply(Decimal::from(10)), Decimal::ZERO);
        assert!(!m.invert(Decimal::ZERO).unwrap().is_finite());
    }

    #[test]
    fn test_disabled_is_identity() {
        let bought = Persistent::new(false);
        let m = MultiplicativeModifier::new(2.0).enabled_when(Computable::from(&bought));
        assert_eq!(m.apply(Decimal::from(10)), Decimal::from(10));
        assert_eq!(m.invert(Decimal::from(10)), Some(Decimal::from(10)));

        bought.set(true);
        assert_eq!(m.apply(Decimal::from(10)), Decimal::from(20));
    }

    #[test]
    fn test_exponential_low_numbers_never_shrinks() {
        let m = ExponentialModifier::new(1.1).support_low_numbers();
        for x in [0.01, 0.1, 0.5, 0.99, 1.0, 2.0, 100.0] {
            let v = Decimal::from(x);
            assert!(m.apply(v) > v, "{} should grow", x);
        }
        let round = m.invert(m.apply(Decimal::from(0.3))).unwrap();
        assert!((round.to_f64() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_sequential_skips_disabled() {
        let seq = SequentialModifier::new()
            .then(AdditiveModifier::new(5.0))
            .then(MultiplicativeModifier::new(3.0).enabled_when(false))
            .then(MultiplicativeModifier::new(2.0));
        assert_eq!(seq.apply(Decimal::from(10)), Decimal::from(30));
        assert_eq!(seq.invert(Decimal::from(30)), Some(Decimal::from(10)));
        assert_eq!(seq.effect(), "+5.00 ×2.00");
    }

    #[test]
    fn test_sequential_invert_requires_all_entries() {
        let seq = SequentialModifier::new()
            .then(AdditiveModifier::new(1.0))
            .then(CustomModifier::new(|v| v.floor()));
        assert!(!seq.invertible());
        assert_eq!(seq.invert(Decimal::from(3)), None);
    }

    #[test]
    fn test_custom_with_inverse() {
        let m = CustomModifier::new(|v| v.sqrt())
            .with_inverse(|v| v.pow(2))
            .described("Classrooms");
        assert_eq!(m.apply(Decimal::from(16)), Decimal::from(4));
        assert_eq!(m.invert(Decimal::from(4)), Some(Decimal::from(16)));
        assert_eq!(m.description().as_deref(), Some("Classrooms"));
    }

    #[test]
    fn test_empty_sequence_is_identity() {
        let seq = SequentialModifier::new();
        assert!(seq.is_empty());
        assert_eq!(seq.apply(Decimal::from(7)), Decimal::from(7));
        assert_eq!(seq.invert(Decimal::from(7)), Some(Decimal::from(7)));
        assert!(!seq.enabled());
    }

    #[test]
    fn test_explain_records_enabled_steps() {
        let seq = SequentialModifier::new()
            .then(AdditiveModifier::new(5.0).described("Planters"))
            .then(MultiplicativeModifier::new(4.0).enabled_when(false))
            .then(MultiplicativeModifier::new(2.0));
        let mut steps = Vec::new();
        let result = seq.explain(Decimal::from(10), &mut steps);
        assert_eq!(result, Decimal::from(30));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].description, "Planters");
        assert_eq!(steps[0].value, Decimal::from(15));
        assert_eq!(steps[1].description, "×2.00");
    }
}
