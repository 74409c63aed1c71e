//! Modifier breakdowns.
//!
//! A `ModifierBreakdown` records how a value was produced: the base, each
//! enabled modifier step with the value after it, and the result. It is
//! read-only and exists for display; game logic never consumes it.

use crate::modifier::Modifier;
use crate::numeric::{format, Decimal};
use serde::{Deserialize, Serialize};

/// One applied modifier in a breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BreakdownStep {
    /// The modifier's description, or its effect when it has none.
    pub description: String,
    /// Short form of the effect, e.g. `×2.00`.
    pub effect: String,
    /// Value after this step.
    pub value: Decimal,
}

/// A titled breakdown of a modified value.
///
/// # Examples
///
/// ```rust
/// use zzidle::{AdditiveModifier, Decimal, ModifierBreakdown, MultiplicativeModifier, SequentialModifier};
///
/// let gain = SequentialModifier::new()
///     .then(AdditiveModifier::new(3.0).described("Small fires"))
///     .then(MultiplicativeModifier::new(2.0).described("Warmer cutters"));
///
/// let breakdown = ModifierBreakdown::of("Log gain", Decimal::ZERO, &gain).with_unit("/s");
/// assert_eq!(breakdown.value, Decimal::from(6));
/// assert_eq!(breakdown.steps.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifierBreakdown {
    pub title: String,
    pub base: Decimal,
    pub steps: Vec<BreakdownStep>,
    pub value: Decimal,
    pub unit: Option<String>,
}

impl ModifierBreakdown {
    /// An empty breakdown whose value is the base.
    pub fn new(title: impl Into<String>, base: Decimal) -> Self {
        Self {
            title: title.into(),
            base,
            steps: Vec::new(),
            value: base,
            unit: None,
        }
    }

    /// Run `base` through `modifier`, recording each enabled step.
    pub fn of(title: impl Into<String>, base: Decimal, modifier: &dyn Modifier) -> Self {
        let mut breakdown = Self::new(title, base);
        breakdown.value = modifier.explain(base, &mut breakdown.steps);
        breakdown
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Append a step and make its value the result.
    pub fn add_step(&mut self, description: impl Into<String>, effect: impl Into<String>, value: Decimal) {
        self.steps.push(BreakdownStep {
            description: description.into(),
            effect: effect.into(),
            value,
        });
        self.value = value;
    }

    /// Render as text, one line per row.
    pub fn render(&self) -> String {
        let unit = self.unit.as_deref().unwrap_or("");
        let mut lines = Vec::with_capacity(self.steps.len() + 3);
        lines.push(self.title.clone());
        lines.push(format!("  Base: {}{}", format(self.base, 2), unit));
        for step in &self.steps {
            lines.push(format!("  {}: {}", step.description, step.effect));
        }
        lines.push(format!("  Total: {}{}", format(self.value, 2), unit));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{AdditiveModifier, MultiplicativeModifier, SequentialModifier};

    #[test]
    fn test_breakdown_from_modifier() {
        let gain = SequentialModifier::new()
            .then(AdditiveModifier::new(0.1).described("Base XP"))
            .then(MultiplicativeModifier::new(3.0).enabled_when(false).described("Focus"));
        let breakdown = ModifierBreakdown::of("XP gain", Decimal::ZERO, &gain);
        assert_eq!(breakdown.steps.len(), 1);
        assert_eq!(breakdown.value, Decimal::from(0.1));
    }

    #[test]
    fn test_manual_steps() {
        let mut breakdown = ModifierBreakdown::new("Cost", Decimal::from(10));
        breakdown.add_step("Level 2", "×4.00", Decimal::from(40));
        assert_eq!(breakdown.value, Decimal::from(40));
        assert_eq!(breakdown.base, Decimal::from(10));
    }

    #[test]
    fn test_render() {
        let gain = SequentialModifier::new().then(AdditiveModifier::new(5.0).described("Planters"));
        let text = ModifierBreakdown::of("Log gain", Decimal::ZERO, &gain)
            .with_unit("/s")
            .render();
        assert_eq!(text, "Log gain\n  Base: 0.00/s\n  Planters: +5.00\n  Total: 5.00/s");
    }

    #[test]
    fn test_serde() {
        let breakdown = ModifierBreakdown::new("Coal gain", Decimal::from(2));
        let json = serde_json::to_string(&breakdown).unwrap();
        let back: ModifierBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(back, breakdown);
    }
}
