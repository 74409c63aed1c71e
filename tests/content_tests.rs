use std::rc::Rc;
use zzidle::content::{management, World};
use zzidle::*;

fn world_on_day(day: u32) -> Rc<World> {
    let game = Rc::new(Game::new(GameConfig::default().with_starting_day(day).with_seed(7)).unwrap());
    let world = World::new(game);
    world.initialize().unwrap();
    world
}

fn position(order: &[String], label: &str) -> usize {
    order.iter().position(|l| l == label).unwrap()
}

#[test]
fn test_construction_follows_eager_dependencies() {
    let world = world_on_day(1);
    let order = world.construction_order().unwrap();
    assert_eq!(order.len(), 5);
    assert!(position(&order, "trees") < position(&order, "coal"));
    assert!(position(&order, "coal") < position(&order, "plastic"));
    assert!(position(&order, "plastic") < position(&order, "management"));
    assert!(position(&order, "boxes") < position(&order, "management"));
    assert_eq!(world.construction_dependencies("coal"), vec!["trees".to_string()]);

    let mut ids: Vec<String> = world.game().layer_ids().iter().map(|id| id.to_string()).collect();
    let mut built = order.clone();
    ids.sort();
    built.sort();
    assert_eq!(ids, built);
}

#[test]
fn test_access_builds_only_what_is_needed() {
    let game = Rc::new(Game::new(GameConfig::default()).unwrap());
    let world = World::new(game);
    assert!(!world.trees.is_initialized());

    world.coal.try_get().unwrap();
    assert!(world.trees.is_initialized());
    assert!(!world.boxes.is_initialized());
    assert!(!world.management.is_initialized());
}

#[test]
fn test_layers_read_each_other_both_ways() {
    let world = world_on_day(6);

    // trees reads boxes when its gain is evaluated
    world.trees.planters.amount_cell().set(Decimal::from(4));
    assert_eq!(world.trees.log_rate(), Decimal::from(4));
    world.boxes.log_boxes.amount_cell().set(Decimal::from(2));
    assert_eq!(world.trees.log_rate(), Decimal::from(8));

    // boxes converts the trees layer's logs
    world.trees.logs.set(2.5e10);
    assert!(world.boxes.make_boxes.click());
    assert_eq!(world.boxes.boxes.value(), Decimal::from(2));
    assert_eq!(world.trees.logs.value(), Decimal::from(5e9));
}

#[test]
fn test_make_boxes_waits_for_its_day() {
    let world = world_on_day(5);
    world.trees.logs.set(1e11);
    assert!(!world.boxes.make_boxes.click());
    assert_eq!(world.boxes.boxes.value(), Decimal::ZERO);

    world.game().calendar().advance();
    assert!(world.boxes.make_boxes.click());
    assert_eq!(world.boxes.boxes.value(), Decimal::from(10));
}

#[test]
fn test_coal_is_gated_by_day() {
    let world = world_on_day(1);
    let coal = &world.coal;
    assert_eq!(coal.fires.add(1), 1);
    world.trees.logs.set(5000);

    world.update(1.0);
    assert_eq!(coal.coal.value(), Decimal::ZERO);
    assert_eq!(world.trees.logs.value(), Decimal::from(5000));

    world.game().calendar().set_day(3);
    world.update(1.0);
    assert_eq!(world.trees.logs.value(), Decimal::from(4000));
    assert_eq!(coal.coal.value(), Decimal::from(0.1));
    assert_eq!(coal.ash.value(), Decimal::from(50));
}

#[test]
fn test_fires_skip_the_tick_when_logs_run_short() {
    let world = world_on_day(3);
    let coal = &world.coal;
    coal.fires.add(1);
    world.trees.logs.set(600);

    world.update(1.0);
    assert_eq!(world.trees.logs.value(), Decimal::from(600));
    assert_eq!(coal.coal.value(), Decimal::ZERO);
    assert_eq!(coal.ash.value(), Decimal::ZERO);

    // idling the fire lets the logs pile up again
    coal.fires.min();
    assert_eq!(coal.log_burn_rate(), Decimal::ZERO);
}

#[test]
fn test_bonfires_are_paid_in_fires() {
    let world = world_on_day(3);
    let coal = &world.coal;
    world.trees.logs.set(1e9);
    assert_eq!(coal.fires.add(20), 20);

    assert!(!coal.bonfires.current_visibility().is_visible());
    assert!(!coal.bonfires.purchase());

    // the unlock costs ten fires and gives them straight back
    assert!(coal.unlock_bonfire.purchase());
    assert_eq!(coal.fires.amount(), Decimal::from(20));

    assert!(coal.bonfires.purchase());
    assert_eq!(coal.fires.amount(), Decimal::from(10));
    assert_eq!(coal.fires.active(), Decimal::from(10));
    assert_eq!(coal.bonfires.active(), Decimal::ONE);
    assert_eq!(coal.log_burn_rate(), Decimal::from(20_000));
    assert!((coal.coal_rate().to_f64() - 11.0).abs() < 1e-9);
    assert!((coal.ash_rate().to_f64() - 1500.0).abs() < 1e-9);

    assert_eq!(coal.bonfires.buy_max(), Ok(1));
    assert_eq!(coal.fires.amount(), Decimal::ZERO);
    assert_eq!(coal.fires.active(), Decimal::ZERO);
    assert_eq!(coal.bonfires.active(), Decimal::from(2));
    assert_eq!(coal.log_burn_rate(), Decimal::from(20_000));
}

#[test]
fn test_chop_uses_manual_gain() {
    let world = world_on_day(1);
    assert!(world.trees.chop.click());
    assert_eq!(world.trees.logs.value(), Decimal::ONE);

    world.coal.coal.set(5);
    assert!(world.coal.warmer_cutters.purchase());
    assert_eq!(world.coal.coal.value(), Decimal::ZERO);
    world.trees.chop.click();
    assert_eq!(world.trees.logs.value(), Decimal::from(3));
    assert_eq!(world.trees.total_logs.total(), Decimal::from(3));
}

#[test]
fn test_milestone_side_effect_runs_once() {
    let world = world_on_day(12);
    let management = &world.management;
    management.schools.amount_cell().set(Decimal::from(5));
    let joy = management.trainee("Joy").unwrap();
    joy.exp.set(Decimal::from(2e6));
    world.coal.ash.set(700);

    world.update(0.0);
    assert_eq!(joy.level(), Decimal::from(3));
    assert!(management.milestone_earned("Joy", 2));
    assert_eq!(world.coal.ash.value(), Decimal::ZERO);

    world.coal.ash.set(300);
    world.update(0.0);
    world.update(0.0);
    assert_eq!(world.coal.ash.value(), Decimal::from(300));
    assert_eq!(joy.milestones.earned_count(), 3);
}

#[test]
fn test_trainee_level_is_capped_by_schools() {
    let world = world_on_day(12);
    let holly = world.management.trainee("Holly").unwrap();
    holly.exp.set(Decimal::from(1e9));
    assert_eq!(holly.level(), Decimal::ZERO);
    assert!(holly.is_capped());

    world.update(1.0);
    assert_eq!(holly.exp.get(), Decimal::from(1e9));
    assert_eq!(holly.milestones.earned_count(), 0);

    world.management.schools.amount_cell().set(Decimal::ONE);
    world.update(0.0);
    assert_eq!(holly.level(), Decimal::ONE);
    assert!(world.management.milestone_earned("Holly", 0));
    assert_eq!(holly.milestones.display_visibility(1), Visibility::Visible);
    assert_eq!(holly.milestones.display_visibility(2), Visibility::Hidden);
}

#[test]
fn test_schools_spend_every_resource() {
    let world = world_on_day(12);
    let management = &world.management;
    world.trees.logs.set(1.1e6);
    assert!(management.teaching.purchase());

    world.coal.coal.set(1e3);
    world.boxes.boxes.set(10);
    world.plastic.plastic.set(1);
    assert!(management.schools.purchase());
    assert_eq!(management.schools.amount(), Decimal::ONE);
    assert_eq!(world.trees.logs.value(), Decimal::ZERO);
    assert_eq!(world.coal.coal.value(), Decimal::ZERO);
    assert_eq!(world.boxes.boxes.value(), Decimal::ZERO);
    assert_eq!(world.plastic.plastic.value(), Decimal::ZERO);

    assert!(!management.schools.purchase());
    assert_eq!(management.school_cost().logs, Decimal::from(1e6));
}

#[test]
fn test_schools_stop_at_limit() {
    let world = world_on_day(12);
    let management = &world.management;
    management.teaching.bought().set(true);
    for resource in [&world.trees.logs, &world.coal.coal, &world.boxes.boxes, &world.plastic.plastic] {
        resource.set(1e30);
    }
    assert_eq!(management.schools.buy_max(), Ok(5));
    assert!(management.schools.is_maxed());
}

#[test]
fn test_plastic_upgrade_cost_grows_with_purchases() {
    let world = world_on_day(10);
    let plastic = &world.plastic;
    assert_eq!(plastic.upgrade_cost(), Decimal::from(25));
    assert!(!plastic.box_elf.current_visibility().is_visible());

    plastic.plastic.set(25);
    assert!(plastic.box_tools.purchase());
    assert_eq!(plastic.upgrade_cost(), Decimal::from(125));
    assert!(plastic.box_elf.current_visibility().is_visible());
}

#[test]
fn test_refineries_burn_ash() {
    let world = world_on_day(10);
    let plastic = &world.plastic;
    world.coal.coal.set(1e3);
    assert!(plastic.refineries.purchase());
    world.coal.ash.set(25);

    world.update(2.0);
    assert_eq!(world.coal.ash.value(), Decimal::from(5));
    assert_eq!(plastic.plastic.value(), Decimal::from(2));

    world.update(1.0);
    assert_eq!(world.coal.ash.value(), Decimal::from(5));
    assert_eq!(plastic.plastic.value(), Decimal::from(2));
}

#[test]
fn test_focus_button_rolls_one_more_than_maximum() {
    let world = world_on_day(12);
    let management = &world.management;
    assert!(management.focus_button.click());
    assert_eq!(management.focus_targets.with(|t| t.len()), 4);
    assert_eq!(management.focus_cooldown.get(), Decimal::from(15));
    assert_eq!(management.focus_time.get(), Decimal::from(management::FOCUS_DURATION));
    assert!(!management.focus_button.click());

    world.update(10.0);
    assert_eq!(management.focus_time.get(), Decimal::ZERO);
    assert_eq!(management.focus_cooldown.get(), Decimal::from(5));
    let multi = management.focus_multi.get();
    assert!(multi.gte(1) && multi.lte(management.focus_max_multi()));
}

#[test]
fn test_focused_trainee_gains_faster() {
    let world = world_on_day(12);
    let management = &world.management;
    // at time zero the multiplier sits at its maximum
    world.update(0.0);
    assert_eq!(management.focus_multi.get(), Decimal::from(10));

    management.focus_button.click();
    let targets = management.focus_targets.get();
    let focused = management::TRAINEES.iter().find(|n| targets.contains(**n)).unwrap();
    let idle = management::TRAINEES.iter().find(|n| !targets.contains(**n)).unwrap();
    assert!(management.is_focused(focused));
    assert!(!management.is_focused(idle));

    let expected = management.focus_multi.get().times(management::BASE_XP);
    assert_eq!(management.trainee(focused).unwrap().xp_rate(), expected);
    assert_eq!(management.trainee(idle).unwrap().xp_rate(), Decimal::from(management::BASE_XP));
}

#[test]
fn test_reroll_stops_when_outcomes_run_out() {
    let world = world_on_day(12);
    let management = &world.management;

    management.reroll_focus_targets(management::FOCUS_RANGE, Decimal::from(20));
    let targets = management.focus_targets.get();
    assert_eq!(targets.len(), management::TRAINEES.len() + 1);
    assert!(targets.contains(""));

    management.reroll_focus_targets(6, Decimal::from(10));
    let targets = management.focus_targets.get();
    assert_eq!(targets.len(), 6);
    assert!(!targets.contains(""));

    management.reroll_focus_targets(0, Decimal::from(3));
    assert!(management.focus_targets.get().is_empty());
}

#[test]
fn test_focus_upgrades_reshape_focus() {
    let world = world_on_day(12);
    let management = &world.management;
    world.trees.logs.set(1e11);
    assert!(management.focus_upgrade1.purchase());
    assert!(management.focus_upgrade2.purchase());
    assert!(management.focus_upgrade3.purchase());
    assert_eq!(management.focus_max_multi(), Decimal::from(20));
    assert_eq!(management.maximum_elves(), Decimal::from(4));
    assert_eq!(management.cooldown(), Decimal::from(10));

    management.focus_button.click();
    assert_eq!(management.focus_targets.with(|t| t.len()), 5);
}

#[test]
fn test_same_seed_same_targets() {
    let first = world_on_day(12);
    let second = world_on_day(12);
    first.management.focus_button.click();
    second.management.focus_button.click();
    assert_eq!(first.management.focus_targets.get(), second.management.focus_targets.get());
}

#[test]
fn test_save_and_restore_world() {
    let world = world_on_day(3);
    world.trees.logs.set(20_000);
    assert_eq!(world.coal.fires.add(2), 2);
    world.trees.logs.set(1234);
    world.trees.planters.amount_cell().set(Decimal::from(3));
    world.game().calendar().advance();
    let json = world.save().unwrap().to_json().unwrap();

    world.game().reset();
    assert_eq!(world.trees.logs.value(), Decimal::ZERO);
    assert_eq!(world.coal.fires.active(), Decimal::ZERO);
    assert_eq!(world.game().calendar().day(), 3);

    world.load(&SaveData::from_json(&json).unwrap()).unwrap();
    assert_eq!(world.trees.logs.value(), Decimal::from(1234));
    assert_eq!(world.trees.planters.amount(), Decimal::from(3));
    assert_eq!(world.coal.fires.amount(), Decimal::from(2));
    assert_eq!(world.coal.fires.active(), Decimal::from(2));
    assert_eq!(world.game().calendar().day(), 4);
}

#[test]
fn test_second_world_on_same_game_is_rejected() {
    let game = Rc::new(Game::new(GameConfig::default()).unwrap());
    let first = World::new(Rc::clone(&game));
    first.initialize().unwrap();

    let second = World::new(game);
    assert_eq!(
        second.initialize(),
        Err(FrameworkError::DuplicateLayer(LayerId::from("trees")))
    );
}

#[test]
fn test_breakdowns_name_cross_layer_boosts() {
    let world = world_on_day(6);
    world.trees.planters.amount_cell().set(Decimal::from(2));
    world.boxes.logs_upgrade.bought().set(true);
    let rendered = world.trees.log_gain_breakdown().render();
    assert!(rendered.contains("Planters"));
    assert!(rendered.contains("Carry logs in boxes"));
    assert!(!rendered.contains("Warmer planters"));
    assert!(rendered.contains("Total: 4.00/s"));
}
