//! Trees layer: the first resource.
//!
//! Logs come from chopping by hand and from planters. Log gain depends on
//! later layers (coal, boxes, management), read when the gain is evaluated.

use super::{derive, with_world, World};
use crate::breakdown::ModifierBreakdown;
use crate::buyable::Buyable;
use crate::clickable::{auto_click, Clickable};
use crate::computable::Computable;
use crate::error::FrameworkError;
use crate::events::Subscription;
use crate::layer::{Layer, LayerInfo};
use crate::modifier::{AdditiveModifier, Modifier, MultiplicativeModifier, SequentialModifier};
use crate::numeric::Decimal;
use crate::resource::Resource;
use crate::tracker::ProgressTracker;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

pub const ID: &str = "trees";
pub const DAY: u32 = 1;

/// Logs an unlocked game must produce to complete the day.
pub const LOG_GOAL: f64 = 1e4;

pub struct Trees {
    info: LayerInfo,
    pub logs: Resource,
    pub total_logs: ProgressTracker,
    pub planters: Buyable,
    /// Passive logs per second, applied to zero.
    pub log_gain: SequentialModifier,
    /// Logs per chop, applied to zero.
    pub manual_gain: SequentialModifier,
    pub chop: Rc<Clickable>,
    _auto_chop: Subscription,
    _tick: Subscription,
}

pub(crate) fn build(world: &Rc<World>) -> Result<Trees, FrameworkError> {
    let game = Rc::clone(world.game());
    let weak = Rc::downgrade(world);
    let info = LayerInfo::new(ID, "Trees", DAY);
    game.register_layer(info.clone())?;

    let logs = Resource::new("logs", 0);
    let planters = Buyable::new("planters", logs.clone(), |amount| {
        Decimal::from(1.15).pow(amount).times(10).floor()
    })
    .max_bulk(game.config().max_bulk_purchases);

    let log_gain = SequentialModifier::new()
        .then(AdditiveModifier::new(planters.amount_cell()).described("Planters"))
        .then(
            MultiplicativeModifier::new(2)
                .described("Warmer planters")
                .enabled_when(derive(&weak, false, |w| w.coal.warmer_planters.is_bought())),
        )
        .then(
            MultiplicativeModifier::new(1.25)
                .described("Ashy soil")
                .enabled_when(derive(&weak, false, |w| w.coal.basic_fertilizer.is_bought())),
        )
        .then(
            MultiplicativeModifier::new(2)
                .described("Carry logs in boxes")
                .enabled_when(derive(&weak, false, |w| w.boxes.logs_upgrade.is_bought())),
        )
        .then(
            MultiplicativeModifier::new(derive(&weak, Decimal::ONE, |w| w.boxes.log_box_multiplier()))
                .described("Carry more logs"),
        )
        .then(
            MultiplicativeModifier::new(3)
                .described("Faith level 1")
                .enabled_when(derive(&weak, false, |w| w.management.milestone_earned("Faith", 0))),
        );

    let manual_gain = SequentialModifier::new()
        .then(AdditiveModifier::new(1).described("Chopping"))
        .then(
            MultiplicativeModifier::new(Computable::from(planters.amount_cell()).map(|n| n.times(0.1).plus(1)))
                .described("Planters"),
        )
        .then(
            MultiplicativeModifier::new(2)
                .described("Warmer cutters")
                .enabled_when(derive(&weak, false, |w| w.coal.warmer_cutters.is_bought())),
        )
        .then(
            MultiplicativeModifier::new(3)
                .described("Holly level 1")
                .enabled_when(derive(&weak, false, |w| w.management.milestone_earned("Holly", 0))),
        );

    let calendar = game.calendar().clone();
    let chop_weak = weak.clone();
    let chop = Rc::new(
        Clickable::new("chop")
            .can_click(derive(&weak, false, move |_| calendar.is_unlocked(DAY)))
            .display("Chop a tree")
            .on_click(move || {
                with_world(&chop_weak, |w| {
                    let trees = &*w.trees;
                    trees.logs.add(trees.manual_gain.apply(Decimal::ZERO));
                    trees.total_logs.observe();
                })
            }),
    );

    let auto_chop = auto_click(
        game.bus(),
        Rc::clone(&chop),
        derive(&weak, false, |w| w.management.milestone_earned("Holly", 1)),
    );

    let total_logs = ProgressTracker::new(logs.clone(), LOG_GOAL);

    game.persist(info.id.key("logs"), logs.persistent())?;
    game.persist(info.id.key("totalLogs"), total_logs.total_cell())?;
    game.persist(info.id.key("planters"), planters.amount_cell())?;

    let tick_weak = weak;
    let tick = game.on_tick(move |delta| with_world(&tick_weak, |w| w.trees.tick(w, delta)));

    Ok(Trees {
        info,
        logs,
        total_logs,
        planters,
        log_gain,
        manual_gain,
        chop,
        _auto_chop: auto_chop,
        _tick: tick,
    })
}

impl Trees {
    fn tick(&self, world: &World, delta: f64) {
        if !world.game().calendar().is_unlocked(self.info.day) {
            return;
        }
        let gain = self.log_gain.apply(Decimal::ZERO).times(delta);
        self.logs.add(gain);
        self.total_logs.observe();
        trace!(%gain, logs = %self.logs.value(), "trees tick");
    }

    /// Logs per second from planters and every boost.
    pub fn log_rate(&self) -> Decimal {
        self.log_gain.apply(Decimal::ZERO)
    }

    pub fn log_gain_breakdown(&self) -> ModifierBreakdown {
        ModifierBreakdown::of("Log gain", Decimal::ZERO, &self.log_gain).with_unit("/s")
    }
}

impl Layer for Trees {
    fn info(&self) -> &LayerInfo {
        &self.info
    }
}

impl fmt::Debug for Trees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trees")
            .field("logs", &self.logs)
            .field("planters", &self.planters.amount())
            .finish()
    }
}
