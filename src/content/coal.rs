//! Coal layer: small fires burn logs into coal and ash.
//!
//! Fires are an active buyable paid in logs. Each running fire burns logs
//! every tick; if the logs for the whole tick are not there, the tick does
//! nothing at all. Once unlocked, bonfires are bought with owned fires and
//! burn hotter.

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
use crate::tracker::ProgressTracker;
use crate::upgrade::Upgrade;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

pub const ID: &str = "coal";
pub const DAY: u32 = 3;

pub const COAL_GOAL: f64 = 1e7;

/// Logs burned per second by one fire.
pub const FIRE_LOGS: f64 = 1000.0;
pub const FIRE_COAL: f64 = 0.1;
pub const FIRE_ASH: f64 = 50.0;

/// Fires spent on one bonfire, and on the bonfire unlock.
pub const BONFIRE_COST: f64 = 10.0;
pub const BONFIRE_LOGS: f64 = 10_000.0;
pub const BONFIRE_COAL: f64 = 10.0;
pub const BONFIRE_ASH: f64 = 1000.0;

/// Logs needed for the next fire when `amount` are owned.
///
/// Squared twice past 100 and 10000 fires, then raised to 1.5.
pub fn fire_cost(amount: Decimal) -> Decimal {
    let mut v = amount;
    if v.gte(100) {
        v = v.pow(2).div_by(100);
    }
    if v.gte(10_000) {
        v = v.pow(2).div_by(10_000);
    }
    v.pow(1.5).times(1e4)
}

pub struct Coal {
    info: LayerInfo,
    logs: Resource,
    pub coal: Resource,
    pub ash: Resource,
    pub total_coal: ProgressTracker,
    pub fires: ActiveBuyable,
    /// Paid in owned fires; each bonfire also puts out that many running fires.
    pub bonfires: ActiveBuyable,
    /// Logs per second, applied to zero. Negative while fires burn.
    pub log_consumption: SequentialModifier,
    pub coal_gain: SequentialModifier,
    pub ash_gain: SequentialModifier,
    pub warmer_cutters: Upgrade,
    pub warmer_planters: Upgrade,
    pub basic_fertilizer: Upgrade,
    /// Paid in fires and refunded on purchase.
    pub unlock_bonfire: Upgrade,
    _tick: Subscription,
}

pub(crate) fn build(world: &Rc<World>) -> Result<Coal, FrameworkError> {
    let game = Rc::clone(world.game());
    let weak = Rc::downgrade(world);
    let logs = world.trees.try_get()?.logs.clone();

    let info = LayerInfo::new(ID, "Coal", DAY);
    game.register_layer(info.clone())?;

    let coal = Resource::new("coal", 0);
    let ash = Resource::new("ash", 0);

    let fires = ActiveBuyable::new(
        Buyable::new("fires", logs.clone(), fire_cost).max_bulk(game.config().max_bulk_purchases),
    );
    let active: Computable<Decimal> = fires.active_cell().into();

    let fire_resource = Resource::from_cell("small fires", fires.amount_cell().clone());
    let refund = fire_resource.clone();
    let unlock_bonfire = Upgrade::new("unlockBonfire", fire_resource.clone(), BONFIRE_COST)
        .on_purchase(move || refund.add(BONFIRE_COST));
    let fires_active = fires.active_cell().clone();
    let bonfires = ActiveBuyable::new(
        Buyable::new("bonfires", fire_resource, |_| Decimal::from(BONFIRE_COST))
            .visibility(Computable::from(unlock_bonfire.bought()).map(show_if))
            .on_purchase(move |cost| fires_active.update(|a| *a = (*a - cost).max(Decimal::ZERO)))
            .max_bulk(game.config().max_bulk_purchases),
    );
    let bonfire_active: Computable<Decimal> = bonfires.active_cell().into();
    let bonfires_lit = bonfire_active.map(|n| n.gt(0));
    let joy_trained = derive(&weak, false, |w| w.management.milestone_earned("Joy", 0));

    let log_consumption = SequentialModifier::new()
        .then(AdditiveModifier::new(active.map(|n| n.times(-FIRE_LOGS))).described("Small fires"))
        .then(
            AdditiveModifier::new(bonfire_active.map(|n| n.times(-BONFIRE_LOGS)))
                .described("Bonfires")
                .enabled_when(bonfires_lit.clone()),
        );

    let coal_gain = SequentialModifier::new()
        .then(AdditiveModifier::new(active.map(|n| n.times(FIRE_COAL))).described("Small fires"))
        .then(
            AdditiveModifier::new(bonfire_active.map(|n| n.times(BONFIRE_COAL)))
                .described("Bonfires")
                .enabled_when(bonfires_lit.clone()),
        )
        .then(
            MultiplicativeModifier::new(5)
                .described("Joy level 1")
                .enabled_when(joy_trained.clone()),
        )
        .then(
            MultiplicativeModifier::new(2)
                .described("Carry coal in boxes")
                .enabled_when(derive(&weak, false, |w| w.boxes.coal_upgrade.is_bought())),
        )
        .then(
            MultiplicativeModifier::new(derive(&weak, Decimal::ONE, |w| w.boxes.coal_box_multiplier()))
                .described("Carry more coal"),
        );

    let ash_gain = SequentialModifier::new()
        .then(AdditiveModifier::new(active.map(|n| n.times(FIRE_ASH))).described("Small fires"))
        .then(
            AdditiveModifier::new(bonfire_active.map(|n| n.times(BONFIRE_ASH)))
                .described("Bonfires")
                .enabled_when(bonfires_lit),
        )
        .then(
            MultiplicativeModifier::new(5)
                .described("Joy level 1")
                .enabled_when(joy_trained),
        )
        .then(
            MultiplicativeModifier::new(2)
                .described("Carry ash in boxes")
                .enabled_when(derive(&weak, false, |w| w.boxes.ash_upgrade.is_bought())),
        )
        .then(
            MultiplicativeModifier::new(derive(&weak, Decimal::ONE, |w| w.boxes.ash_box_multiplier()))
                .described("Carry more ash"),
        );

    let warmer_cutters = Upgrade::new("warmerCutters", coal.clone(), 5);
    let warmer_planters = Upgrade::new("warmerPlanters", coal.clone(), 5);
    let basic_fertilizer = Upgrade::new("basicFertilizer", ash.clone(), 5000).visibility(
        Computable::from(warmer_planters.bought()).map(show_if),
    );

    let total_coal = ProgressTracker::new(coal.clone(), COAL_GOAL);

    let id = &info.id;
    game.persist(id.key("coal"), coal.persistent())?;
    game.persist(id.key("ash"), ash.persistent())?;
    game.persist(id.key("totalCoal"), total_coal.total_cell())?;
    game.persist(id.key("buildFire"), fires.amount_cell())?;
    game.persist(id.key("activeFires"), fires.active_cell())?;
    game.persist(id.key("buildBonfire"), bonfires.amount_cell())?;
    game.persist(id.key("activeBonfires"), bonfires.active_cell())?;
    game.persist(id.key("unlockBonfire"), unlock_bonfire.bought())?;
    game.persist(id.key("warmerCutters"), warmer_cutters.bought())?;
    game.persist(id.key("warmerPlanters"), warmer_planters.bought())?;
    game.persist(id.key("basicFertilizer"), basic_fertilizer.bought())?;

    let tick = game.on_tick(move |delta| with_world(&weak, |w| w.coal.tick(w, delta)));

    Ok(Coal {
        info,
        logs,
        coal,
        ash,
        total_coal,
        fires,
        bonfires,
        log_consumption,
        coal_gain,
        ash_gain,
        warmer_cutters,
        warmer_planters,
        basic_fertilizer,
        unlock_bonfire,
        _tick: tick,
    })
}

impl Coal {
    fn tick(&self, world: &World, delta: f64) {
        if !world.game().calendar().is_unlocked(self.info.day) {
            return;
        }
        let consumed = self.log_consumption.apply(Decimal::ZERO).times(delta);
        let needed = -consumed;
        if needed.gt(self.logs.value()) {
            trace!(%needed, logs = %self.logs.value(), "fires starved, tick skipped");
            return;
        }
        self.logs.add(consumed);
        self.coal.add(self.coal_gain.apply(Decimal::ZERO).times(delta));
        self.ash.add(self.ash_gain.apply(Decimal::ZERO).times(delta));
        self.fires.clamp();
        self.bonfires.clamp();
        self.total_coal.observe();
    }

    pub fn coal_rate(&self) -> Decimal {
        self.coal_gain.apply(Decimal::ZERO)
    }

    pub fn ash_rate(&self) -> Decimal {
        self.ash_gain.apply(Decimal::ZERO)
    }

    /// Logs burned per second; positive.
    pub fn log_burn_rate(&self) -> Decimal {
        -self.log_consumption.apply(Decimal::ZERO)
    }

    pub fn breakdowns(&self) -> Vec<ModifierBreakdown> {
        vec![
            ModifierBreakdown::of("Log consumption", Decimal::ZERO, &self.log_consumption).with_unit("/s"),
            ModifierBreakdown::of("Coal gain", Decimal::ZERO, &self.coal_gain).with_unit("/s"),
            ModifierBreakdown::of("Ash gain", Decimal::ZERO, &self.ash_gain).with_unit("/s"),
        ]
    }
}

impl Layer for Coal {
    fn info(&self) -> &LayerInfo {
        &self.info
    }
}

impl fmt::Debug for Coal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coal")
            .field("coal", &self.coal)
            .field("ash", &self.ash)
            .field("fires", &self.fires.amount())
            .field("active", &self.fires.active())
            .field("bonfires", &self.bonfires.amount())
            .field("active_bonfires", &self.bonfires.active())
            .finish()
    }
}
