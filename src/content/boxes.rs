//! Boxes layer: logs are packed into boxes.
//!
//! Boxes come from a cumulative conversion of logs and are spent on
//! upgrades and buyables that boost the trees and coal layers.

use super::{derive, with_world, World};
use crate::breakdown::ModifierBreakdown;
use crate::buyable::Buyable;
use crate::clickable::Clickable;
use crate::computable::{show_if, Computable};
use crate::conversion::Conversion;
use crate::error::FrameworkError;
use crate::events::Subscription;
use crate::layer::{Layer, LayerInfo};
use crate::modifier::{ExponentialModifier, SequentialModifier};
use crate::numeric::{format_whole, Decimal};
use crate::resource::Resource;
use crate::scaling::PolynomialScaling;
use crate::tracker::ProgressTracker;
use crate::upgrade::Upgrade;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

pub const ID: &str = "boxes";
pub const DAY: u32 = 6;

pub const BOX_GOAL: f64 = 5e4;

/// Logs per box.
pub const LOGS_PER_BOX: f64 = 1e10;

pub struct Boxes {
    info: LayerInfo,
    pub boxes: Resource,
    pub total_boxes: ProgressTracker,
    pub conversion: Conversion,
    pub make_boxes: Rc<Clickable>,
    pub logs_upgrade: Upgrade,
    pub ash_upgrade: Upgrade,
    pub coal_upgrade: Upgrade,
    pub log_boxes: Buyable,
    pub ash_boxes: Buyable,
    pub coal_boxes: Buyable,
    _tick: Subscription,
}

/// A box buyable costing `base * 3^amount`, or `base * 2^amount` once
/// Bell reaches level 3. Hidden until `unlocked_by` is bought.
fn box_buyable(
    label: &str,
    boxes: &Resource,
    base: f64,
    weak: &Weak<World>,
    unlocked_by: &Upgrade,
    max_bulk: u64,
) -> Buyable {
    let bell = derive(weak, false, |w| w.management.milestone_earned("Bell", 2));
    Buyable::new(label, boxes.clone(), move |amount| {
        let scaling = if bell.get() { 2 } else { 3 };
        Decimal::from(scaling).pow(amount).times(base)
    })
    .visibility(Computable::from(unlocked_by.bought()).map(show_if))
    .max_bulk(max_bulk)
}

pub(crate) fn build(world: &Rc<World>) -> Result<Boxes, FrameworkError> {
    let game = Rc::clone(world.game());
    let weak = Rc::downgrade(world);
    let logs = world.trees.try_get()?.logs.clone();

    let info = LayerInfo::new(ID, "Boxes", DAY);
    game.register_layer(info.clone())?;

    let boxes = Resource::new("boxes", 0);

    let box_gain = SequentialModifier::new().then(
        ExponentialModifier::new(1.1)
            .support_low_numbers()
            .described("Bell level 2")
            .enabled_when(derive(&weak, false, |w| w.management.milestone_earned("Bell", 1))),
    );
    let conversion = Conversion::cumulative(
        PolynomialScaling::new(LOGS_PER_BOX, 1),
        logs,
        boxes.clone(),
    )
    .round_up_cost(true)
    .gain_modifier(box_gain);

    let calendar = game.calendar().clone();
    let can_make = derive(&weak, false, move |w| {
        calendar.is_unlocked(DAY) && w.boxes.conversion.can_convert()
    });
    let click_weak = weak.clone();
    let display_weak = weak.clone();
    let make_boxes = Rc::new(
        Clickable::new("makeBoxes")
            .can_click(can_make)
            .display(derive(&display_weak, String::new(), |w| {
                let conversion = &w.boxes.conversion;
                let cost = if conversion.actual_gain().gte(1) {
                    conversion.current_at()
                } else {
                    conversion.next_at()
                };
                format!(
                    "Create {} boxes for {} logs",
                    format_whole(conversion.current_gain()),
                    format_whole(cost)
                )
            }))
            .on_click(move || {
                with_world(&click_weak, |w| {
                    w.boxes.conversion.convert();
                })
            }),
    );

    let logs_upgrade = Upgrade::new("logsUpgrade", boxes.clone(), 100);
    let ash_upgrade = Upgrade::new("ashUpgrade", boxes.clone(), 1000);
    let coal_upgrade = Upgrade::new("coalUpgrade", boxes.clone(), 4000);

    let max_bulk = game.config().max_bulk_purchases;
    let log_boxes = box_buyable("logBoxesBuyable", &boxes, 100.0, &weak, &logs_upgrade, max_bulk);
    let ash_boxes = box_buyable("ashBoxesBuyable", &boxes, 1000.0, &weak, &ash_upgrade, max_bulk);
    let coal_boxes = box_buyable("coalBoxesBuyable", &boxes, 1000.0, &weak, &coal_upgrade, max_bulk);

    let total_boxes = ProgressTracker::new(boxes.clone(), BOX_GOAL);

    let id = &info.id;
    game.persist(id.key("boxes"), boxes.persistent())?;
    game.persist(id.key("totalBoxes"), total_boxes.total_cell())?;
    game.persist(id.key("logsUpgrade"), logs_upgrade.bought())?;
    game.persist(id.key("ashUpgrade"), ash_upgrade.bought())?;
    game.persist(id.key("coalUpgrade"), coal_upgrade.bought())?;
    game.persist(id.key("logBoxesBuyable"), log_boxes.amount_cell())?;
    game.persist(id.key("ashBoxesBuyable"), ash_boxes.amount_cell())?;
    game.persist(id.key("coalBoxesBuyable"), coal_boxes.amount_cell())?;

    let tick = game.on_tick(move |delta| with_world(&weak, |w| w.boxes.tick(w, delta)));

    Ok(Boxes {
        info,
        boxes,
        total_boxes,
        conversion,
        make_boxes,
        logs_upgrade,
        ash_upgrade,
        coal_upgrade,
        log_boxes,
        ash_boxes,
        coal_boxes,
        _tick: tick,
    })
}

fn half_plus_one(buyable: &Buyable) -> Decimal {
    buyable.amount().div_by(2).plus(1)
}

impl Boxes {
    fn tick(&self, world: &World, delta: f64) {
        if !world.game().calendar().is_unlocked(self.info.day) {
            return;
        }
        // passive packing: one percent of the current gain per folder
        let folders = world.plastic.passive_boxes.amount();
        if folders.gt(0) {
            let packed = self
                .conversion
                .current_gain()
                .times(folders)
                .times(delta)
                .div_by(100);
            self.boxes.add(packed);
            trace!(%packed, "passive boxes");
        }
        self.total_boxes.observe();
    }

    pub fn log_box_multiplier(&self) -> Decimal {
        half_plus_one(&self.log_boxes)
    }

    pub fn ash_box_multiplier(&self) -> Decimal {
        half_plus_one(&self.ash_boxes)
    }

    pub fn coal_box_multiplier(&self) -> Decimal {
        half_plus_one(&self.coal_boxes)
    }

    /// Box buyables the player can see.
    pub fn visible_buyables(&self) -> Vec<&Buyable> {
        [&self.log_boxes, &self.ash_boxes, &self.coal_boxes]
            .into_iter()
            .filter(|b| b.current_visibility().is_visible())
            .collect()
    }

    /// Breakdown of the box gain modifier, from a base of one box.
    pub fn box_gain_breakdown(&self) -> Option<ModifierBreakdown> {
        self.conversion
            .modifier()
            .map(|modifier| ModifierBreakdown::of("Boxes gain", Decimal::ONE, modifier))
    }
}

impl Layer for Boxes {
    fn info(&self) -> &LayerInfo {
        &self.info
    }
}

impl fmt::Debug for Boxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boxes")
            .field("boxes", &self.boxes)
            .field("conversion", &self.conversion)
            .finish()
    }
}
