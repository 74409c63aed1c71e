//! Plastic layer: refineries turn ash into plastic.
//!
//! Refineries are bought with coal. Plastic buys upgrades whose price rises
//! with every upgrade already bought in this layer.

use super::{derive, with_world, World};
use crate::active::ActiveBuyable;
use crate::breakdown::ModifierBreakdown;
use crate::buyable::Buyable;
use crate::computable::{show_if, Computable};
use crate::error::FrameworkError;
use crate::events::Subscription;
use crate::layer::{Layer, LayerInfo};
use crate::modifier::{AdditiveModifier, Modifier, MultiplicativeModifier, SequentialModifier};
use crate::numeric::Decimal;
use crate::resource::Resource;
use crate::upgrade::Upgrade;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

pub const ID: &str = "plastic";
pub const DAY: u32 = 10;

/// Ash each running refinery consumes per second.
pub const REFINERY_ASH: f64 = 10.0;

pub struct Plastic {
    info: LayerInfo,
    ash: Resource,
    pub plastic: Resource,
    pub refineries: ActiveBuyable,
    pub plastic_gain: SequentialModifier,
    pub box_tools: Upgrade,
    pub box_elf: Upgrade,
    /// Packs one percent of the current box gain per second, per level.
    pub passive_boxes: Buyable,
    _tick: Subscription,
}

pub(crate) fn build(world: &Rc<World>) -> Result<Plastic, FrameworkError> {
    let game = Rc::clone(world.game());
    let weak = Rc::downgrade(world);
    let (coal, ash) = {
        let layer = world.coal.try_get()?;
        (layer.coal.clone(), layer.ash.clone())
    };

    let info = LayerInfo::new(ID, "Plastic", DAY);
    game.register_layer(info.clone())?;

    let plastic = Resource::new("plastic", 0);
    let max_bulk = game.config().max_bulk_purchases;

    let refineries = ActiveBuyable::new(
        Buyable::new("buildRefinery", coal, |amount| {
            Decimal::from(1.2).pow(amount).times(1e3)
        })
        .max_bulk(max_bulk),
    );

    let upgrade_cost = derive(&weak, Decimal::INFINITY, |w| w.plastic.upgrade_cost());
    let box_tools = Upgrade::new("boxTools", plastic.clone(), upgrade_cost.clone());
    let box_elf = Upgrade::new("boxElf", plastic.clone(), upgrade_cost)
        .visibility(Computable::from(box_tools.bought()).map(show_if));

    let passive_boxes = Buyable::new("passiveBoxes", plastic.clone(), |amount| {
        Decimal::from(1.3).pow(amount).times(100)
    })
    .visibility(Computable::from(box_elf.bought()).map(show_if))
    .max_bulk(max_bulk);

    let active: Computable<Decimal> = refineries.active_cell().into();
    let plastic_gain = SequentialModifier::new()
        .then(
            AdditiveModifier::new(active.clone())
                .described("Refineries")
                .enabled_when(active.map(|n| n.gt(0))),
        )
        .then(
            MultiplicativeModifier::new(2)
                .described("Box elf recruitment")
                .enabled_when(box_elf.bought()),
        )
        .then(
            MultiplicativeModifier::new(2)
                .described("Gingersnap level 1")
                .enabled_when(derive(&weak, false, |w| w.management.milestone_earned("Gingersnap", 0))),
        );

    let id = &info.id;
    game.persist(id.key("plastic"), plastic.persistent())?;
    game.persist(id.key("buildRefinery"), refineries.amount_cell())?;
    game.persist(id.key("activeRefinery"), refineries.active_cell())?;
    game.persist(id.key("boxTools"), box_tools.bought())?;
    game.persist(id.key("boxElf"), box_elf.bought())?;
    game.persist(id.key("passiveBoxes"), passive_boxes.amount_cell())?;

    let tick = game.on_tick(move |delta| with_world(&weak, |w| w.plastic.tick(w, delta)));

    Ok(Plastic {
        info,
        ash,
        plastic,
        refineries,
        plastic_gain,
        box_tools,
        box_elf,
        passive_boxes,
        _tick: tick,
    })
}

impl Plastic {
    fn tick(&self, world: &World, delta: f64) {
        if !world.game().calendar().is_unlocked(self.info.day) {
            return;
        }
        let needed = self.refineries.active().times(REFINERY_ASH).times(delta);
        if needed.gt(self.ash.value()) {
            trace!(%needed, ash = %self.ash.value(), "refineries starved, tick skipped");
            return;
        }
        self.ash.sub(needed);
        self.plastic.add(self.plastic_gain.apply(Decimal::ZERO).times(delta));
        self.refineries.clamp();
    }

    /// `5^(bought + 2)` over every upgrade in this layer.
    pub fn upgrade_cost(&self) -> Decimal {
        let bought = [&self.box_tools, &self.box_elf]
            .iter()
            .filter(|u| u.is_bought())
            .count();
        Decimal::from(5).pow(bought + 2)
    }

    pub fn plastic_rate(&self) -> Decimal {
        self.plastic_gain.apply(Decimal::ZERO)
    }

    pub fn plastic_gain_breakdown(&self) -> ModifierBreakdown {
        ModifierBreakdown::of("Plastic gain", Decimal::ZERO, &self.plastic_gain).with_unit("/s")
    }
}

impl Layer for Plastic {
    fn info(&self) -> &LayerInfo {
        &self.info
    }
}

impl fmt::Debug for Plastic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plastic")
            .field("plastic", &self.plastic)
            .field("refineries", &self.refineries.amount())
            .field("active", &self.refineries.active())
            .finish()
    }
}
