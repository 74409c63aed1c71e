//! Advent example: a scripted run through the demonstration layers
//!
//! This example demonstrates:
//! - Building a world of layers that reference each other
//! - Day gating (each layer wakes up on its own day)
//! - Buying, clicking, converting and ticking
//! - Saving and restoring the whole world
//!
//! Run with `RUST_LOG=zzidle=debug` to see construction and purchases.

use std::rc::Rc;
use zzidle::content::{boxes, coal, management, World};
use zzidle::*;

fn main() -> Result<(), FrameworkError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let game = Rc::new(Game::new(GameConfig::default())?);
    let world = World::new(Rc::clone(&game));
    world.initialize()?;
    println!("Construction order: {:?}", world.construction_order()?);

    // ========================================================================
    // Day 1: chop trees and buy planters
    // ========================================================================

    println!("\n--- Day {} ---", game.calendar().day());
    for _ in 0..50 {
        world.trees.chop.click();
    }
    let planters = world.trees.planters.buy_many(3);
    println!("Chopped 50 times, bought {} planters", planters);
    println!("Logs: {}", world.trees.logs);
    for _ in 0..60 {
        world.update(1.0);
    }
    println!("After a minute: {} logs", world.trees.logs);
    println!("{}", world.trees.log_gain_breakdown().render());

    // ========================================================================
    // Day 3: light fires
    // ========================================================================

    game.calendar().set_day(coal::DAY);
    println!("\n--- Day {} ---", game.calendar().day());
    world.trees.logs.set(50_000);
    let fires = world.coal.fires.add(3);
    println!("Built {} fires, {} logs left", fires, world.trees.logs);
    for _ in 0..10 {
        world.update(1.0);
    }
    println!("Coal: {}  Ash: {}  Logs: {}", world.coal.coal, world.coal.ash, world.trees.logs);

    // ========================================================================
    // Day 6: pack logs into boxes
    // ========================================================================

    game.calendar().set_day(boxes::DAY);
    println!("\n--- Day {} ---", game.calendar().day());
    world.trees.logs.set(3.5e10);
    println!("{}", world.boxes.make_boxes.current_display());
    world.boxes.make_boxes.click();
    println!("Boxes: {}  Logs: {}", world.boxes.boxes, world.trees.logs);

    world.boxes.boxes.add(100);
    if world.boxes.logs_upgrade.purchase() {
        println!("Bought the log box upgrade; log gain is now {}/s", world.trees.log_rate());
    }

    // ========================================================================
    // Day 12: train elves
    // ========================================================================

    game.calendar().set_day(management::DAY);
    println!("\n--- Day {} ---", game.calendar().day());
    let elves = &world.management;
    world.trees.logs.set(2e6);
    world.coal.coal.set(1e4);
    world.boxes.boxes.add(100);
    world.plastic.plastic.set(10);
    elves.teaching.purchase();
    elves.schools.purchase();
    println!("Schools: {}", elves.schools.amount());

    elves.focus_button.click();
    println!("Focus targets: {:?}", elves.focus_targets.get());
    for _ in 0..10 {
        world.update(1.0);
    }
    for trainee in management::TRAINEES.iter().filter_map(|name| elves.trainee(name)) {
        println!(
            "  {:<10} level {}  exp {}  xp/s {}",
            trainee.name(),
            trainee.level(),
            numeric::format(trainee.exp.get(), 2),
            numeric::format(trainee.xp_rate(), 2)
        );
    }

    // ========================================================================
    // Save and restore
    // ========================================================================

    let json = world.save()?.to_json()?;
    println!("\nSaved {} bytes", json.len());
    game.reset();
    println!("After reset: {} logs on day {}", world.trees.logs, game.calendar().day());
    world.load(&SaveData::from_json(&json)?)?;
    println!("After load: {} logs on day {}", world.trees.logs, game.calendar().day());

    Ok(())
}
