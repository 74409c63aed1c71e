//! Conversions.
//!
//! A `Conversion` trades a base resource for a gain resource along a
//! scaling curve. The gain is run through an optional gain modifier; the
//! cost side uses the modifier's inverse to find how much base resource a
//! given gain corresponds to.
//!
//! Two kinds exist. A cumulative conversion adds its gain to the gain
//! resource. An independent conversion treats the gain as a total to reach,
//! so only the part above what is already owned is granted.

use crate::computable::Computable;
use crate::modifier::Modifier;
use crate::numeric::Decimal;
use crate::resource::Resource;
use crate::scaling::Scaling;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// How a conversion's gain relates to the gain resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// Gain is added on top of what is owned.
    Cumulative,
    /// Gain is a total; the owned amount counts toward it.
    Independent,
}

/// Trades a base resource for a gain resource.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Conversion, Decimal, PolynomialScaling, Resource};
///
/// let logs = Resource::new("logs", 0);
/// let boxes = Resource::new("boxes", 0);
/// let conversion = Conversion::cumulative(
///     PolynomialScaling::new(1e10, 1.0),
///     logs.clone(),
///     boxes.clone(),
/// )
/// .round_up_cost(true);
///
/// assert!(!conversion.convert());
///
/// logs.set(1e10);
/// assert_eq!(conversion.current_gain(), Decimal::ONE);
/// assert!(conversion.convert());
/// assert_eq!(boxes.value(), Decimal::ONE);
/// assert_eq!(logs.value(), Decimal::ZERO);
/// ```
pub struct Conversion {
    kind: ConversionKind,
    scaling: Box<dyn Scaling>,
    base_resource: Resource,
    gain_resource: Resource,
    gain_modifier: Option<Box<dyn Modifier>>,
    buy_max: Computable<bool>,
    round_up_cost: bool,
    on_convert: Option<Rc<dyn Fn(Decimal)>>,
}

impl Conversion {
    pub fn new(
        kind: ConversionKind,
        scaling: impl Scaling + 'static,
        base_resource: Resource,
        gain_resource: Resource,
    ) -> Self {
        Self {
            kind,
            scaling: Box::new(scaling),
            base_resource,
            gain_resource,
            gain_modifier: None,
            buy_max: Computable::constant(true),
            round_up_cost: false,
            on_convert: None,
        }
    }

    pub fn cumulative(scaling: impl Scaling + 'static, base_resource: Resource, gain_resource: Resource) -> Self {
        Self::new(ConversionKind::Cumulative, scaling, base_resource, gain_resource)
    }

    pub fn independent(scaling: impl Scaling + 'static, base_resource: Resource, gain_resource: Resource) -> Self {
        Self::new(ConversionKind::Independent, scaling, base_resource, gain_resource)
    }

    pub fn gain_modifier(mut self, modifier: impl Modifier + 'static) -> Self {
        self.gain_modifier = Some(Box::new(modifier));
        self
    }

    /// When false, one conversion yields at most one unit.
    pub fn buy_max(mut self, buy_max: impl Into<Computable<bool>>) -> Self {
        self.buy_max = buy_max.into();
        self
    }

    /// Only convert whole units, and spend only what those units cost.
    pub fn round_up_cost(mut self, round_up: bool) -> Self {
        self.round_up_cost = round_up;
        self
    }

    /// Action run after each conversion, given the granted gain.
    pub fn on_convert(mut self, action: impl Fn(Decimal) + 'static) -> Self {
        self.on_convert = Some(Rc::new(action));
        self
    }

    pub fn kind(&self) -> ConversionKind {
        self.kind
    }

    pub fn base_resource(&self) -> &Resource {
        &self.base_resource
    }

    pub fn gain_resource(&self) -> &Resource {
        &self.gain_resource
    }

    /// The gain modifier, if one was set.
    pub fn modifier(&self) -> Option<&dyn Modifier> {
        self.gain_modifier.as_deref()
    }

    fn modify(&self, raw: Decimal) -> Decimal {
        match &self.gain_modifier {
            Some(modifier) => modifier.apply(raw),
            None => raw,
        }
    }

    fn unmodify(&self, gain: Decimal) -> Decimal {
        match &self.gain_modifier {
            Some(modifier) => modifier.invert(gain).unwrap_or(gain),
            None => gain,
        }
    }

    /// Gain available from the current base amount.
    ///
    /// For independent conversions this is the total the gain resource
    /// would reach, not the increment.
    pub fn current_gain(&self) -> Decimal {
        let mut gain = self.modify(self.scaling.gain(self.base_resource.value()));
        if self.round_up_cost {
            gain = gain.floor();
        }
        gain = gain.max(Decimal::ZERO);
        if !self.buy_max.get() {
            let cap = match self.kind {
                ConversionKind::Cumulative => Decimal::ONE,
                ConversionKind::Independent => self.gain_resource.value() + Decimal::ONE,
            };
            gain = gain.min(cap);
        }
        gain
    }

    /// What `convert` would add to the gain resource.
    pub fn actual_gain(&self) -> Decimal {
        match self.kind {
            ConversionKind::Cumulative => self.current_gain(),
            ConversionKind::Independent => {
                (self.current_gain() - self.gain_resource.value()).max(Decimal::ZERO)
            }
        }
    }

    /// Base amount corresponding to the current gain.
    pub fn current_at(&self) -> Decimal {
        self.scaling.cost_of(self.unmodify(self.current_gain()))
    }

    /// Base amount needed for the next unit of gain.
    pub fn next_at(&self) -> Decimal {
        let next = self.current_gain() + Decimal::ONE;
        self.scaling
            .cost_of(self.unmodify(next))
            .max(self.scaling.threshold())
    }

    /// Whether `convert` would do anything.
    pub fn can_convert(&self) -> bool {
        let gain = self.actual_gain();
        if self.round_up_cost {
            gain.gte(1)
        } else {
            gain.gt(0)
        }
    }

    /// Perform the conversion. Returns whether anything changed.
    ///
    /// With `round_up_cost` the base resource is reduced by the cost of the
    /// granted gain; otherwise the whole base resource is spent. Nothing is
    /// mutated when the gain is below one unit under `round_up_cost`, or
    /// zero otherwise.
    pub fn convert(&self) -> bool {
        if !self.can_convert() {
            return false;
        }
        let gain = self.actual_gain();
        let spent = if self.round_up_cost {
            self.current_at()
        } else {
            self.base_resource.value()
        };

        self.gain_resource.add(gain);
        self.base_resource.sub(spent);
        if let Some(action) = &self.on_convert {
            action(gain);
        }
        debug!(
            from = %self.base_resource.display_name(),
            to = %self.gain_resource.display_name(),
            %gain,
            %spent,
            "converted"
        );
        true
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion")
            .field("kind", &self.kind)
            .field("base_resource", &self.base_resource)
            .field("gain_resource", &self.gain_resource)
            .field("round_up_cost", &self.round_up_cost)
            .finish()
    }
}
