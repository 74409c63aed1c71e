//! # zzidle - Reactive Framework for Incremental Games
//!
//! A framework for building idle games out of layers that feed each other:
//! - **Composable** production formulas (ordered, invertible, describable modifiers)
//! - **Lazy** layer construction, so layers can reference each other both ways
//! - **Tick-driven** simulation (one tick event drives every layer, in order)
//! - **Guarded** purchases (a rejected click or purchase never mutates state)
//!
//! ## Core Concepts
//!
//! ### Production Pipeline
//!
//! Every tick flows through the same pipeline:
//!
//! ```text
//! [Game::update] → [EventBus] → [layer handler] → [Modifier chain] → [Resource]
//! ```
//!
//! 1. **Game** advances the clock and raises one tick
//! 2. **Handlers** run in registration order, gated by the calendar day
//! 3. **Modifier chains** turn current state into rates
//! 4. **Resources** change by `rate × delta`
//!
//! ### Key Features
//!
//! - **Computables**: constants and derived closures read through one accessor
//! - **Lazy Proxies**: one-shot construction with circular-construction detection
//! - **Durable State**: every persistent cell is registered under a unique key
//! - **Breakdowns**: each modifier step can be listed for display
//! - **Bounded Bulk Buying**: buy-max stops at a configured bound
//!
//! ## Example
//!
//! ```rust
//! use zzidle::*;
//!
//! let logs = Resource::new("logs", 35);
//! let planters = Buyable::new("planters", logs.clone(), |amount| {
//!     Decimal::from(2).pow(amount).times(10)
//! });
//!
//! // Costs 10, 20, 40: the third level is out of reach
//! assert_eq!(planters.buy_many(3), 2);
//! assert_eq!(logs.value(), Decimal::from(5));
//!
//! // Order matters: (10 + 5) * 2 versus 10 * 2 + 5
//! let gain = SequentialModifier::new()
//!     .then(AdditiveModifier::new(5))
//!     .then(MultiplicativeModifier::new(2));
//! assert_eq!(gain.apply(Decimal::from(10)), Decimal::from(30));
//! assert_eq!(gain.invert(Decimal::from(30)), Some(Decimal::from(10)));
//! ```
//!
//! ## Modules
//!
//! - [`numeric`] - Decimal value type and display helpers
//! - [`computable`] - Constant-or-derived values, visibility
//! - [`persistence`] - Durable cells, save data, persistence registry
//! - [`lazy`] - Lazy proxies
//! - [`graph`] - Construction graph of lazy proxies
//! - [`resource`] - Named quantities
//! - [`modifier`] - Modifier trait and composition
//! - [`breakdown`] - Step-by-step modifier breakdowns
//! - [`events`] - Tick bus and subscriptions
//! - [`clickable`] - Guarded click actions, auto clicking
//! - [`upgrade`] - One-shot purchases
//! - [`buyable`] - Repeatable purchases
//! - [`active`] - Buyables with an active count
//! - [`scaling`] - Conversion scaling curves
//! - [`conversion`] - Resource conversions
//! - [`milestone`] - One-way achievements
//! - [`tracker`] - Accumulated production with goals
//! - [`layer`] - Layers, registry, calendar
//! - [`game`] - Game root
//! - [`config`] - Game configuration
//! - [`content`] - Demonstration layers
//! - [`error`] - Error types

pub mod active;
pub mod breakdown;
pub mod buyable;
pub mod clickable;
pub mod computable;
pub mod config;
pub mod content;
pub mod conversion;
pub mod error;
pub mod events;
pub mod game;
pub mod graph;
pub mod layer;
pub mod layer_id;
pub mod lazy;
pub mod milestone;
pub mod modifier;
pub mod numeric;
pub mod persistence;
pub mod resource;
pub mod scaling;
pub mod tracker;
pub mod upgrade;

// Re-export main types for convenience
pub use config::GameConfig;
pub use error::FrameworkError;
pub use game::Game;
pub use layer::{Calendar, Layer, LayerInfo, LayerRegistry};
pub use layer_id::LayerId;
pub use numeric::Decimal;

// Re-export reactive building blocks
pub use computable::{show_if, Computable, Visibility};
pub use events::{EventBus, Subscription};
pub use lazy::LazyProxy;
pub use persistence::{Durable, PersistenceRegistry, Persistent, SaveData};

// Re-export modifiers
pub use breakdown::{BreakdownStep, ModifierBreakdown};
pub use modifier::{
    AdditiveModifier, CustomModifier, ExponentialModifier, Modifier, MultiplicativeModifier,
    SequentialModifier,
};

// Re-export features
pub use active::ActiveBuyable;
pub use buyable::Buyable;
pub use clickable::{auto_click, Clickable};
pub use conversion::{Conversion, ConversionKind};
pub use milestone::{Milestone, MilestoneTrack};
pub use resource::Resource;
pub use scaling::{ExponentialScaling, PolynomialScaling, Scaling};
pub use tracker::ProgressTracker;
pub use upgrade::Upgrade;
