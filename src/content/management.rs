//! Management layer: training elves.
//!
//! Each trainee gains experience every tick, levels up on a logarithmic
//! curve capped by the number of schools, and earns one milestone per
//! level. Milestones boost the other layers. Focus temporarily multiplies
//! the experience gain of a few randomly chosen trainees.

use super::{derive, with_world, World};
use crate::breakdown::ModifierBreakdown;
use crate::buyable::Buyable;
use crate::clickable::Clickable;
use crate::computable::{show_if, Computable};
use crate::error::FrameworkError;
use crate::events::Subscription;
use crate::layer::{Layer, LayerInfo};
use crate::milestone::{Milestone, MilestoneTrack};
use crate::modifier::{AdditiveModifier, Modifier, MultiplicativeModifier, SequentialModifier};
use crate::numeric::Decimal;
use crate::persistence::Persistent;
use crate::resource::Resource;
use crate::upgrade::Upgrade;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

pub const ID: &str = "management";
pub const DAY: u32 = 12;

/// Trainees in roll order.
pub const TRAINEES: [&str; 6] = ["Holly", "Joy", "Faith", "Snowball", "Bell", "Gingersnap"];

/// Milestones per trainee, one per level.
pub const MILESTONES_PER_TRAINEE: usize = 5;

/// Base experience per second, before modifiers.
pub const BASE_XP: f64 = 0.1;

/// Index range rolled by the focus button. Larger than the trainee count, so
/// a roll can land on nobody.
pub const FOCUS_RANGE: usize = 12;

/// Seconds a focus lasts.
pub const FOCUS_DURATION: f64 = 10.0;

pub const SCHOOL_LIMIT: u32 = 5;

/// Effect text of each trainee's milestones.
const MILESTONE_EFFECTS: [[&str; MILESTONES_PER_TRAINEE]; 6] = [
    [
        "Chopping yields three times as many logs",
        "Chops a tree every tick",
        "No bonus",
        "No bonus",
        "No bonus",
    ],
    [
        "Small fires produce five times as much coal and ash",
        "No bonus",
        "Sweeps away all ash",
        "No bonus",
        "No bonus",
    ],
    [
        "Planters produce three times as many logs",
        "No bonus",
        "No bonus",
        "No bonus",
        "No bonus",
    ],
    [
        "Doubles experience gain for every trainee",
        "No bonus",
        "No bonus",
        "No bonus",
        "No bonus",
    ],
    [
        "No bonus",
        "Box gain is raised to the 1.1",
        "Box buyables scale by 2 instead of 3",
        "No bonus",
        "No bonus",
    ],
    [
        "Doubles plastic gain",
        "No bonus",
        "No bonus",
        "No bonus",
        "No bonus",
    ],
];

/// Level reached with `exp` experience, before the school cap.
///
/// Level `n` needs `(10^n - 1) / 9 * 1e4` experience.
pub fn level_for(exp: Decimal) -> Decimal {
    exp.times(9).div_by(1e4).plus(1).log10().floor()
}

fn capped_level(exp: &Persistent<Decimal>, schools: &Persistent<Decimal>) -> Decimal {
    level_for(exp.get()).min(schools.get())
}

/// Resources one school or classroom costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiCost {
    pub logs: Decimal,
    pub coal: Decimal,
    pub boxes: Decimal,
    pub plastic: Decimal,
}

impl MultiCost {
    fn scaled(factor: Decimal, logs: f64, coal: f64, boxes: f64, plastic: f64) -> Self {
        Self {
            logs: factor.times(logs),
            coal: factor.times(coal),
            boxes: factor.times(boxes),
            plastic: factor.times(plastic),
        }
    }

    /// Cost of the school after `schools` are built.
    pub fn school(schools: Decimal) -> Self {
        Self::scaled(Decimal::from(10).pow(schools), 1e5, 1e3, 10.0, 1.0)
    }

    /// Cost of a classroom while `schools` are built.
    pub fn classroom(schools: Decimal) -> Self {
        Self::scaled(schools.plus(1).pow(1.5), 1e6, 0.0, 100.0, 10.0)
    }
}

/// An elf in training.
pub struct Trainee {
    name: &'static str,
    pub exp: Persistent<Decimal>,
    schools: Persistent<Decimal>,
    /// Experience per second, applied to [`BASE_XP`].
    pub xp_gain: SequentialModifier,
    pub milestones: MilestoneTrack,
}

impl Trainee {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current level, capped by the number of schools.
    pub fn level(&self) -> Decimal {
        capped_level(&self.exp, &self.schools)
    }

    /// Whether the school cap stops further experience.
    pub fn is_capped(&self) -> bool {
        self.level().gte(self.schools.get())
    }

    pub fn xp_rate(&self) -> Decimal {
        self.xp_gain.apply(Decimal::from(BASE_XP))
    }

    /// Experience earned within the current level.
    pub fn exp_to_next_level(&self) -> Decimal {
        let floor = Decimal::from(10).pow(self.level()).minus(1).div_by(9).times(1e4);
        self.exp.get() - floor
    }

    /// Experience the current level spans.
    pub fn exp_required_for_next_level(&self) -> Decimal {
        Decimal::from(10).pow(self.level()).times(1e4)
    }

    pub fn xp_breakdown(&self) -> ModifierBreakdown {
        ModifierBreakdown::of(
            format!("{} XP gain", self.name),
            Decimal::from(BASE_XP),
            &self.xp_gain,
        )
        .with_unit("/s")
    }
}

impl fmt::Debug for Trainee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trainee")
            .field("name", &self.name)
            .field("exp", &self.exp.get())
            .field("level", &self.level())
            .field("milestones", &self.milestones.earned_count())
            .finish()
    }
}

pub struct Management {
    info: LayerInfo,
    logs: Resource,
    coal: Resource,
    boxes: Resource,
    plastic: Resource,
    pub trainees: Vec<Trainee>,
    pub teaching: Upgrade,
    pub classroom_upgrade: Upgrade,
    pub schools: Buyable,
    pub classrooms: Buyable,
    /// Multiplier shared by every trainee, applied to one.
    pub global_xp: SequentialModifier,
    pub focus_multi: Persistent<Decimal>,
    pub focus_targets: Persistent<BTreeSet<String>>,
    pub focus_cooldown: Persistent<Decimal>,
    pub focus_time: Persistent<Decimal>,
    pub focus_max_multi_modifiers: SequentialModifier,
    pub maximum_elves_modifier: SequentialModifier,
    pub cooldown_modifiers: SequentialModifier,
    pub focus_upgrade1: Upgrade,
    pub focus_upgrade2: Upgrade,
    pub focus_upgrade3: Upgrade,
    pub focus_button: Rc<Clickable>,
    rng: RefCell<ChaCha8Rng>,
    _tick: Subscription,
}

fn build_trainee(
    index: usize,
    name: &'static str,
    weak: &Weak<World>,
    schools: &Persistent<Decimal>,
    focus_multi: &Persistent<Decimal>,
    focus_time: &Persistent<Decimal>,
    focus_targets: &Persistent<BTreeSet<String>>,
) -> Trainee {
    let exp = Persistent::new(Decimal::ZERO);

    let time = focus_time.clone();
    let targets = focus_targets.clone();
    let focused = Computable::derived(move || {
        time.get().gt(0) && targets.with(|t| t.contains(name))
    });
    let xp_gain = SequentialModifier::new()
        .then(
            MultiplicativeModifier::new(derive(weak, Decimal::ONE, |w| {
                w.management.global_xp.apply(Decimal::ONE)
            }))
            .described("Global XP multiplier"),
        )
        .then(
            MultiplicativeModifier::new(focus_multi)
                .described("Focus multiplier")
                .enabled_when(focused),
        );

    let mut milestones = MilestoneTrack::new(Vec::new());
    for (level, effect) in MILESTONE_EFFECTS[index].iter().enumerate() {
        let required = Decimal::from(level + 1);
        let (exp, schools) = (exp.clone(), schools.clone());
        let mut milestone = Milestone::new(
            format!("{name}Milestone{level}"),
            Computable::derived(move || capped_level(&exp, &schools).gte(required)),
        )
        .display(format!("{name} reaches level {}", level + 1), *effect);
        if name == "Joy" && level == 2 {
            let weak = weak.clone();
            milestone = milestone.on_complete(move || {
                with_world(&weak, |w| {
                    w.coal.ash.set(0);
                    info!("Joy swept away the ash");
                })
            });
        }
        milestones.push(milestone);
    }

    Trainee {
        name,
        exp,
        schools: schools.clone(),
        xp_gain,
        milestones,
    }
}

pub(crate) fn build(world: &Rc<World>) -> Result<Management, FrameworkError> {
    let game = Rc::clone(world.game());
    let weak = Rc::downgrade(world);
    let logs = world.trees.try_get()?.logs.clone();
    let coal = world.coal.try_get()?.coal.clone();
    let boxes = world.boxes.try_get()?.boxes.clone();
    let plastic = world.plastic.try_get()?.plastic.clone();

    let info = LayerInfo::new(ID, "Management", DAY);
    game.register_layer(info.clone())?;

    let teaching = Upgrade::new("teaching", logs.clone(), 1e6);
    let classroom_upgrade = Upgrade::new("classroomUpgrade", boxes.clone(), 1e3)
        .visibility(Computable::from(teaching.bought()).map(show_if));

    let school_weak = weak.clone();
    let schools = Buyable::custom(
        "schools",
        |amount| Decimal::from(10).pow(amount),
        derive(&weak, false, |w| w.management.can_afford(&w.management.school_cost())),
    )
    .purchase_limit(Decimal::from(SCHOOL_LIMIT))
    .visibility(Computable::from(teaching.bought()).map(show_if))
    .on_purchase(move |_| {
        with_world(&school_weak, |w| {
            let built = w.management.schools.amount().minus(1);
            w.management.spend(&MultiCost::school(built));
        })
    });

    let classroom_weak = weak.clone();
    let classrooms = Buyable::custom(
        "classrooms",
        |amount| amount.plus(1),
        derive(&weak, false, |w| w.management.can_afford(&w.management.classroom_cost())),
    )
    .visibility(Computable::from(classroom_upgrade.bought()).map(show_if))
    .on_purchase(move |_| {
        with_world(&classroom_weak, |w| {
            let cost = w.management.classroom_cost();
            w.management.spend(&cost);
        })
    });

    let global_xp = SequentialModifier::new()
        .then(
            MultiplicativeModifier::new(Computable::from(classrooms.amount_cell()).map(|n| n.plus(1).sqrt()))
                .described("Classroom effect")
                .enabled_when(classroom_upgrade.bought()),
        )
        .then(
            MultiplicativeModifier::new(2)
                .described("Snowball level 1")
                .enabled_when(derive(&weak, false, |w| w.management.milestone_earned("Snowball", 0))),
        );

    let focus_multi = Persistent::new(Decimal::ONE);
    let focus_targets = Persistent::new(BTreeSet::new());
    let focus_cooldown = Persistent::new(Decimal::ZERO);
    let focus_time = Persistent::new(Decimal::ZERO);

    let focus_upgrade1 = Upgrade::new("focusUpgrade1", logs.clone(), 1e8);
    let focus_upgrade2 = Upgrade::new("focusUpgrade2", logs.clone(), 1e9);
    let focus_upgrade3 = Upgrade::new("focusUpgrade3", logs.clone(), 1e10);

    let focus_max_multi_modifiers = SequentialModifier::new().then(
        MultiplicativeModifier::new(2)
            .described("Focus upgrade 1")
            .enabled_when(focus_upgrade1.bought()),
    );
    let maximum_elves_modifier = SequentialModifier::new().then(
        AdditiveModifier::new(1)
            .described("Focus upgrade 2")
            .enabled_when(focus_upgrade2.bought()),
    );
    let cooldown_modifiers = SequentialModifier::new().then(
        AdditiveModifier::new(-5)
            .described("Focus upgrade 3")
            .enabled_when(focus_upgrade3.bought()),
    );

    let calendar = game.calendar().clone();
    let cooldown = focus_cooldown.clone();
    let focus_weak = weak.clone();
    let focus_button = Rc::new(
        Clickable::new("focus")
            .can_click(Computable::derived(move || {
                calendar.is_unlocked(DAY) && cooldown.get().is_zero()
            }))
            .on_click(move || with_world(&focus_weak, |w| w.management.start_focus())),
    );

    let trainees: Vec<Trainee> = TRAINEES
        .iter()
        .enumerate()
        .map(|(index, &name)| {
            build_trainee(
                index,
                name,
                &weak,
                schools.amount_cell(),
                &focus_multi,
                &focus_time,
                &focus_targets,
            )
        })
        .collect();

    let id = &info.id;
    for trainee in &trainees {
        game.persist(id.key(&format!("{}Exp", trainee.name)), &trainee.exp)?;
        for milestone in trainee.milestones.milestones() {
            game.persist(id.key(milestone.label()), milestone.earned())?;
        }
    }
    game.persist(id.key("teaching"), teaching.bought())?;
    game.persist(id.key("classroomUpgrade"), classroom_upgrade.bought())?;
    game.persist(id.key("schools"), schools.amount_cell())?;
    game.persist(id.key("classrooms"), classrooms.amount_cell())?;
    game.persist(id.key("focusMultiplier"), &focus_multi)?;
    game.persist(id.key("focusTargets"), &focus_targets)?;
    game.persist(id.key("focusCooldown"), &focus_cooldown)?;
    game.persist(id.key("focusTime"), &focus_time)?;
    game.persist(id.key("focusUpgrade1"), focus_upgrade1.bought())?;
    game.persist(id.key("focusUpgrade2"), focus_upgrade2.bought())?;
    game.persist(id.key("focusUpgrade3"), focus_upgrade3.bought())?;

    let rng = RefCell::new(ChaCha8Rng::seed_from_u64(game.config().rng_seed));
    let tick = game.on_tick(move |delta| with_world(&weak, |w| w.management.tick(w, delta)));

    Ok(Management {
        info,
        logs,
        coal,
        boxes,
        plastic,
        trainees,
        teaching,
        classroom_upgrade,
        schools,
        classrooms,
        global_xp,
        focus_multi,
        focus_targets,
        focus_cooldown,
        focus_time,
        focus_max_multi_modifiers,
        maximum_elves_modifier,
        cooldown_modifiers,
        focus_upgrade1,
        focus_upgrade2,
        focus_upgrade3,
        focus_button,
        rng,
        _tick: tick,
    })
}

impl Management {
    fn tick(&self, world: &World, delta: f64) {
        if !world.game().calendar().is_unlocked(self.info.day) {
            return;
        }

        for trainee in &self.trainees {
            if !trainee.is_capped() {
                let gained = trainee.xp_rate().times(delta);
                trainee.exp.update(|e| *e += gained);
            }
        }
        for trainee in &self.trainees {
            trainee.milestones.check_all();
        }

        self.focus_time.update(|t| *t = (*t - Decimal::from(delta)).max(Decimal::ZERO));
        self.focus_cooldown.update(|c| *c = (*c - Decimal::from(delta)).max(Decimal::ZERO));
        if self.focus_time.get().is_zero() {
            let swing = 1.0 - (world.game().now() * 2.0).sin().abs();
            self.focus_multi.set(self.focus_max_multi().pow(swing));
        }
    }

    pub fn trainee(&self, name: &str) -> Option<&Trainee> {
        self.trainees.iter().find(|t| t.name == name)
    }

    /// Whether `name` has earned the milestone at `index`.
    pub fn milestone_earned(&self, name: &str, index: usize) -> bool {
        self.trainee(name)
            .and_then(|t| t.milestones.get(index))
            .map_or(false, |m| m.is_earned())
    }

    /// Sum of every trainee's level.
    pub fn total_levels(&self) -> Decimal {
        self.trainees.iter().map(|t| t.level()).sum()
    }

    pub fn school_cost(&self) -> MultiCost {
        MultiCost::school(self.schools.amount())
    }

    pub fn classroom_cost(&self) -> MultiCost {
        MultiCost::classroom(self.schools.amount())
    }

    pub fn can_afford(&self, cost: &MultiCost) -> bool {
        self.logs.value().gte(cost.logs)
            && self.coal.value().gte(cost.coal)
            && self.boxes.value().gte(cost.boxes)
            && self.plastic.value().gte(cost.plastic)
    }

    fn spend(&self, cost: &MultiCost) {
        self.logs.sub(cost.logs);
        self.coal.sub(cost.coal);
        self.boxes.sub(cost.boxes);
        self.plastic.sub(cost.plastic);
    }

    pub fn focus_max_multi(&self) -> Decimal {
        self.focus_max_multi_modifiers.apply(Decimal::from(10))
    }

    pub fn maximum_elves(&self) -> Decimal {
        self.maximum_elves_modifier.apply(Decimal::from(3))
    }

    /// Seconds before focus can be used again.
    pub fn cooldown(&self) -> Decimal {
        self.cooldown_modifiers.apply(Decimal::from(15))
    }

    pub fn is_focused(&self, name: &str) -> bool {
        self.focus_time.get().gt(0) && self.focus_targets.with(|t| t.contains(name))
    }

    fn start_focus(&self) {
        self.focus_cooldown.set(self.cooldown());
        self.focus_time.set(Decimal::from(FOCUS_DURATION));
        self.reroll_focus_targets(FOCUS_RANGE, self.maximum_elves());
    }

    /// Pick new focus targets by rolling indices in `0..range`.
    ///
    /// Rolls continue until `min(count, range) + 1` distinct outcomes were
    /// drawn. An index past the last trainee yields the empty name, which
    /// counts as an outcome but focuses nobody. Rolling stops early once
    /// every possible outcome has been drawn.
    pub fn reroll_focus_targets(&self, range: usize, count: Decimal) {
        let mut targets = BTreeSet::new();
        if range == 0 {
            self.focus_targets.set(targets);
            return;
        }
        let name_at = |index: usize| {
            self.trainees
                .get(index)
                .map(|t| t.name.to_string())
                .unwrap_or_default()
        };
        let outcomes: BTreeSet<String> = (0..range).map(name_at).collect();
        let new_count = count.min(Decimal::from(range));

        let mut rng = self.rng.borrow_mut();
        let mut picked: u64 = 0;
        while new_count.gte(picked) {
            if targets.len() == outcomes.len() {
                warn!(
                    requested = %new_count,
                    outcomes = outcomes.len(),
                    "focus reroll exhausted every outcome"
                );
                break;
            }
            let roll = name_at(rng.gen_range(0..range));
            if targets.insert(roll) {
                picked += 1;
            }
        }
        debug!(?targets, "focus targets rerolled");
        self.focus_targets.set(targets);
    }

    pub fn breakdowns(&self) -> Vec<ModifierBreakdown> {
        vec![
            ModifierBreakdown::of("Global XP", Decimal::ONE, &self.global_xp),
            ModifierBreakdown::of("Maximum focus effect", Decimal::from(10), &self.focus_max_multi_modifiers),
            ModifierBreakdown::of("Elves affected by focus", Decimal::from(3), &self.maximum_elves_modifier),
            ModifierBreakdown::of("Focus cooldown", Decimal::from(15), &self.cooldown_modifiers)
                .with_unit("s"),
        ]
    }
}

impl Layer for Management {
    fn info(&self) -> &LayerInfo {
        &self.info
    }
}

impl fmt::Debug for Management {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Management")
            .field("trainees", &self.trainees)
            .field("schools", &self.schools.amount())
            .field("focus_targets", &self.focus_targets.get())
            .finish()
    }
}
