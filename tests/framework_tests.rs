use std::cell::Cell;
use std::rc::Rc;
use zzidle::*;

fn approx(a: Decimal, b: Decimal) -> bool {
    let (a, b) = (a.to_f64(), b.to_f64());
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Disabled entries contribute nothing; enabled ones fold in list order.
#[test]
fn test_sequential_skips_disabled_entries() {
    let boost = Persistent::new(false);
    let gain = SequentialModifier::new()
        .then(AdditiveModifier::new(5).described("Base"))
        .then(
            MultiplicativeModifier::new(3)
                .described("Boost")
                .enabled_when(&boost),
        )
        .then(ExponentialModifier::new(2).described("Square"));

    assert_eq!(gain.apply(Decimal::ONE), Decimal::from(36));
    boost.set(true);
    assert_eq!(gain.apply(Decimal::ONE), Decimal::from(324));
}

/// invert(apply(x)) == x when every entry is invertible.
#[test]
fn test_sequential_round_trip() {
    let gain = SequentialModifier::new()
        .then(AdditiveModifier::new(7))
        .then(MultiplicativeModifier::new(1.5))
        .then(ExponentialModifier::new(1.1).support_low_numbers())
        .then(AdditiveModifier::new(-2));

    for x in [0.0, 0.5, 1.0, 42.0, 1e6] {
        let x = Decimal::from(x);
        let back = gain.invert(gain.apply(x)).unwrap();
        assert!(approx(back, x), "{} came back as {}", x, back);
    }
}

#[test]
fn test_custom_without_inverse_blocks_invert() {
    let gain = SequentialModifier::new()
        .then(AdditiveModifier::new(1))
        .then(CustomModifier::new(|x| x.floor()));
    assert_eq!(gain.apply(Decimal::from(1.5)), Decimal::from(2));
    assert_eq!(gain.invert(Decimal::from(2)), None);
}

#[test]
fn test_low_numbers_never_shrink_small_inputs() {
    let modifier = ExponentialModifier::new(1.5).support_low_numbers();
    for x in [0.01, 0.25, 0.5, 0.99] {
        let x = Decimal::from(x);
        assert!(modifier.apply(x).gte(x));
    }
    assert!(modifier.apply(Decimal::from(4)).gt(4));
}

#[test]
fn test_shipped_cost_curves_are_monotonic() {
    let logs = Resource::new("logs", 0);
    let planters = Buyable::new("planters", logs.clone(), |n| {
        Decimal::from(1.15).pow(n).times(10).floor()
    });
    let fires = Buyable::new("fires", logs, zzidle::content::coal::fire_cost);
    assert!(planters.verify_cost_monotonic(500).is_ok());
    assert!(fires.verify_cost_monotonic(5_000).is_ok());

    let game = Rc::new(Game::new(GameConfig::default().with_starting_day(12)).unwrap());
    let world = zzidle::content::World::new(game);
    world.initialize().unwrap();
    let boxes = &world.boxes;
    let plastic = &world.plastic;
    let box_curves = [&boxes.log_boxes, &boxes.ash_boxes, &boxes.coal_boxes];

    assert!(plastic.refineries.verify_cost_monotonic(500).is_ok());
    assert!(plastic.passive_boxes.verify_cost_monotonic(500).is_ok());
    assert!(approx(plastic.refineries.cost_at(2), Decimal::from(1440)));
    assert!(approx(plastic.passive_boxes.cost_at(2), Decimal::from(169)));
    for (buyable, base) in box_curves.iter().zip([100, 1000, 1000]) {
        assert!(buyable.verify_cost_monotonic(200).is_ok());
        assert!(approx(buyable.cost_at(2), Decimal::from(base * 9)));
    }

    // Bell level 3 slows box prices to doubling
    let management = &world.management;
    management.schools.amount_cell().set(Decimal::from(5));
    management.trainee("Bell").unwrap().exp.set(Decimal::from(2e6));
    world.update(0.0);
    assert!(management.milestone_earned("Bell", 2));
    for (buyable, base) in box_curves.iter().zip([100, 1000, 1000]) {
        assert!(buyable.verify_cost_monotonic(200).is_ok());
        assert!(approx(buyable.cost_at(2), Decimal::from(base * 4)));
    }
}

#[test]
fn test_non_monotonic_cost_is_reported() {
    let synergy = Persistent::new(Decimal::ONE);
    let bonus = synergy.clone();
    let logs = Resource::new("logs", 0);
    // price divided by a bonus that grows faster than the price
    let buyable = Buyable::new("synergy", logs, move |n| {
        Decimal::from(10).times(n.plus(1)).div_by(bonus.get().times(n.plus(1).pow(2)))
    });
    synergy.set(Decimal::from(2));
    assert_eq!(
        buyable.verify_cost_monotonic(10),
        Err(FrameworkError::NonMonotonicCost {
            label: "synergy".into(),
            level: 0,
        })
    );
}

#[test]
fn test_buy_max_is_bounded() {
    let gems = Resource::new("gems", 1e9);
    let free = Buyable::new("free", gems.clone(), |_| Decimal::ZERO).max_bulk(50);
    let err = free.buy_max().unwrap_err();
    assert_eq!(
        err,
        FrameworkError::UnboundedPurchase {
            label: "free".into(),
            limit: 50,
        }
    );
    assert_eq!(free.amount(), Decimal::from(50));

    let capped = Buyable::new("capped", gems, |_| Decimal::ZERO)
        .purchase_limit(Decimal::from(5))
        .max_bulk(50);
    assert_eq!(capped.buy_max(), Ok(5));
}

#[test]
fn test_round_up_conversion_below_one_unit_is_inert() {
    let logs = Resource::new("logs", 9.9e9);
    let boxes = Resource::new("boxes", 3);
    let conversion = Conversion::cumulative(PolynomialScaling::new(1e10, 1), logs.clone(), boxes.clone())
        .round_up_cost(true);

    assert_eq!(conversion.actual_gain(), Decimal::ZERO);
    assert!(!conversion.can_convert());
    assert!(!conversion.convert());
    assert_eq!(logs.value(), Decimal::from(9.9e9));
    assert_eq!(boxes.value(), Decimal::from(3));
    assert_eq!(conversion.next_at(), Decimal::from(1e10));
}

#[test]
fn test_milestone_fires_once() {
    let total = Persistent::new(Decimal::ZERO);
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let goal = total.clone();
    let milestone = Milestone::new("first", Computable::derived(move || goal.get().gte(10)))
        .on_complete(move || counter.set(counter.get() + 1));

    let bus = EventBus::new();
    let milestone = Rc::new(milestone);
    let checked = Rc::clone(&milestone);
    let _sub = bus.on_tick(move |_| {
        checked.check();
    });

    bus.update(1.0);
    assert_eq!(fired.get(), 0);
    total.set(Decimal::from(10));
    for _ in 0..5 {
        bus.update(1.0);
    }
    assert_eq!(fired.get(), 1);
    assert!(milestone.is_earned());
}

#[test]
fn test_trainee_track_visibility_follows_previous_milestone() {
    let exp = Persistent::new(Decimal::ZERO);
    let levels: Vec<Milestone> = (1..=3)
        .map(|n| {
            let exp = exp.clone();
            Milestone::new(format!("level{}", n), Computable::derived(move || exp.get().gte(n)))
        })
        .collect();
    let track = MilestoneTrack::new(levels);

    assert_eq!(track.display_visibility(0), Visibility::Visible);
    assert_eq!(track.display_visibility(1), Visibility::Hidden);

    // earning is independent of display order
    exp.set(Decimal::from(3));
    assert_eq!(track.check_all(), 3);
    assert_eq!(track.display_visibility(2), Visibility::Visible);
}

/// A handler gated on a later day leaves its resources alone.
#[test]
fn test_day_gate_leaves_resources_unchanged() {
    let game = Rc::new(Game::new(GameConfig::default()).unwrap());
    let coal = Resource::new("coal", 7);
    let sink = coal.clone();
    let calendar = game.calendar().clone();
    let _tick = game.on_tick(move |delta| {
        if !calendar.is_unlocked(3) {
            return;
        }
        sink.add(Decimal::from(delta).times(2));
    });

    game.update(1.0);
    game.update(1.0);
    assert_eq!(coal.value(), Decimal::from(7));

    game.calendar().set_day(3);
    game.update(1.0);
    assert_eq!(coal.value(), Decimal::from(9));
}

/// Scenario A: polynomial(1e10, 1) conversion.
#[test]
fn test_scenario_polynomial_conversion() {
    let logs = Resource::new("logs", 0);
    let boxes = Resource::new("boxes", 0);
    let conversion = Conversion::cumulative(PolynomialScaling::new(1e10, 1), logs.clone(), boxes.clone())
        .round_up_cost(true)
        .gain_modifier(SequentialModifier::new());

    logs.set(1e10);
    assert_eq!(conversion.current_gain(), Decimal::ONE);
    assert!(conversion.convert());
    assert_eq!(boxes.value(), Decimal::ONE);
    assert_eq!(logs.value(), Decimal::ZERO);
}

/// Scenario B: the same two modifiers in opposite orders.
#[test]
fn test_scenario_modifier_order() {
    let add_then_mul = SequentialModifier::new()
        .then(AdditiveModifier::new(5))
        .then(MultiplicativeModifier::new(2));
    let mul_then_add = SequentialModifier::new()
        .then(MultiplicativeModifier::new(2))
        .then(AdditiveModifier::new(5));

    assert_eq!(add_then_mul.apply(Decimal::from(10)), Decimal::from(30));
    assert_eq!(mul_then_add.apply(Decimal::from(10)), Decimal::from(25));
}

/// Scenario C: add(3) stops after two affordable levels.
#[test]
fn test_scenario_active_add() {
    let logs = Resource::new("logs", 35);
    let fires = ActiveBuyable::new(Buyable::new("fires", logs.clone(), |n| {
        Decimal::from(2).pow(n).times(10)
    }));

    assert_eq!(fires.add(3), 2);
    assert_eq!(fires.amount(), Decimal::from(2));
    assert_eq!(fires.active(), Decimal::from(2));
    assert_eq!(logs.value(), Decimal::from(5));

    fires.remove(5);
    assert_eq!(fires.active(), Decimal::ZERO);
    assert_eq!(logs.value(), Decimal::from(5));
    fires.max();
    assert_eq!(fires.active(), Decimal::from(2));
}

/// Scenario D: consumption that cannot be covered skips the whole step.
#[test]
fn test_scenario_all_or_nothing_consumption() {
    let game = Game::new(GameConfig::default()).unwrap();
    let logs = Resource::new("logs", 60);
    let coal = Resource::new("coal", 0);
    let (fuel, product) = (logs.clone(), coal.clone());
    let _tick = game.on_tick(move |delta| {
        let needed = Decimal::from(50).times(delta);
        if needed.gt(fuel.value()) {
            return;
        }
        fuel.sub(needed);
        product.add(delta);
    });

    game.update(2.0);
    assert_eq!(logs.value(), Decimal::from(60));
    assert_eq!(coal.value(), Decimal::ZERO);

    game.update(1.0);
    assert_eq!(logs.value(), Decimal::from(10));
    assert_eq!(coal.value(), Decimal::ONE);
}

#[test]
fn test_handlers_run_in_registration_order() {
    let bus = EventBus::new();
    let log = Rc::new(std::cell::RefCell::new(Vec::new()));
    let subs: Vec<Subscription> = ["trees", "coal", "boxes"]
        .into_iter()
        .map(|name| {
            let log = Rc::clone(&log);
            bus.on_tick(move |_| log.borrow_mut().push(name))
        })
        .collect();

    bus.update(0.5);
    assert_eq!(*log.borrow(), vec!["trees", "coal", "boxes"]);

    drop(subs);
    bus.update(0.5);
    assert_eq!(log.borrow().len(), 3);
    assert_eq!(bus.handler_count(), 0);
}

#[test]
fn test_rejected_actions_do_not_mutate() {
    let coal = Resource::new("coal", 4);
    let upgrade = Upgrade::new("warmerCutters", coal.clone(), 5);
    assert!(!upgrade.purchase());
    assert_eq!(coal.value(), Decimal::from(4));

    let pressed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&pressed);
    let button = Clickable::new("focus")
        .can_click(false)
        .on_click(move || flag.set(true));
    assert!(!button.click());
    assert!(!pressed.get());
}

#[test]
fn test_game_save_round_trip() {
    let game = Game::new(GameConfig::default()).unwrap();
    let logs = Resource::new("logs", 0);
    let bought = Persistent::new(false);
    game.persist("trees.logs", logs.persistent()).unwrap();
    game.persist("coal.warmerCutters", &bought).unwrap();

    logs.set(1234);
    bought.set(true);
    let json = game.save().unwrap().to_json().unwrap();

    game.reset();
    assert_eq!(logs.value(), Decimal::ZERO);
    assert!(!bought.get());

    game.load(&SaveData::from_json(&json).unwrap()).unwrap();
    assert_eq!(logs.value(), Decimal::from(1234));
    assert!(bought.get());
}

#[test]
fn test_breakdown_lists_enabled_steps() {
    let unlocked = Persistent::new(false);
    let gain = SequentialModifier::new()
        .then(AdditiveModifier::new(5).described("Planters"))
        .then(
            MultiplicativeModifier::new(2)
                .described("Warmer planters")
                .enabled_when(&unlocked),
        );

    let breakdown = ModifierBreakdown::of("Log gain", Decimal::ZERO, &gain);
    assert_eq!(breakdown.steps.len(), 1);
    assert_eq!(breakdown.value, Decimal::from(5));

    unlocked.set(true);
    let breakdown = ModifierBreakdown::of("Log gain", Decimal::ZERO, &gain).with_unit("/s");
    assert_eq!(breakdown.steps.len(), 2);
    assert_eq!(breakdown.value, Decimal::from(10));
    assert!(breakdown.render().contains("Warmer planters"));
}
