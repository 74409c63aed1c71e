//! Modifiers example: composing, inverting and explaining production formulas
//!
//! This example demonstrates:
//! - Ordered modifier chains
//! - Gates driven by durable state
//! - Inverting a chain to find the base value behind a target
//! - Breakdowns for display

use zzidle::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let planters = Persistent::new(Decimal::from(4));
    let warmer_planters = Persistent::new(false);

    let log_gain = SequentialModifier::new()
        .then(AdditiveModifier::new(&planters).described("Planters"))
        .then(
            MultiplicativeModifier::new(2)
                .described("Warmer planters")
                .enabled_when(&warmer_planters),
        )
        .then(ExponentialModifier::new(1.1).described("Synergy").support_low_numbers());

    println!("=== Log gain ===");
    println!("Without upgrade: {}", log_gain.apply(Decimal::ZERO));
    warmer_planters.set(true);
    println!("With upgrade:    {}", log_gain.apply(Decimal::ZERO));

    planters.set(Decimal::from(20));
    println!("\n{}", ModifierBreakdown::of("Log gain", Decimal::ZERO, &log_gain).with_unit("/s").render());

    // Inverting answers "what base gives this result?"
    let target = Decimal::from(1000);
    match log_gain.invert(target) {
        Some(base) => println!("\nBase for {} logs/s: {}", target, numeric::format(base, 2)),
        None => println!("\nChain is not invertible"),
    }

    // A custom step without an inverse blocks inversion of the whole chain
    let capped = SequentialModifier::new()
        .then(MultiplicativeModifier::new(3))
        .then(CustomModifier::new(|v| v.min(50)).described("Cap at 50"));
    println!("Capped chain applied to 20: {}", capped.apply(Decimal::from(20)));
    println!("Capped chain invertible: {}", capped.invertible());
}
