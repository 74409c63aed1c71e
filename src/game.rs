//! The game root.
//!
//! `Game` owns the shared services every layer is built against: the tick
//! bus, the layer registry, the persistence registry, the calendar and a
//! simulated clock. It is created once and handed to layers by reference.

use crate::config::GameConfig;
use crate::error::FrameworkError;
use crate::events::{EventBus, Subscription};
use crate::layer::{Calendar, LayerInfo, LayerRegistry};
use crate::layer_id::LayerId;
use crate::persistence::{PersistenceRegistry, Persistent, SaveData};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use tracing::{debug, info};

/// Persistence key of the calendar day.
pub const DAY_KEY: &str = "main.day";

/// Shared services for one running game.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use zzidle::{Decimal, Game, GameConfig, LayerInfo, Persistent};
///
/// let game = Rc::new(Game::new(GameConfig::default()).unwrap());
/// game.register_layer(LayerInfo::new("trees", "Trees", 1)).unwrap();
///
/// let logs = Persistent::new(Decimal::ZERO);
/// game.persist("trees.logs", &logs).unwrap();
///
/// let sink = logs.clone();
/// let _tick = game.on_tick(move |delta| sink.update(|v| *v += Decimal::from(delta)));
/// game.update(2.0);
///
/// assert_eq!(logs.get(), Decimal::from(2));
/// assert_eq!(game.now(), 2.0);
/// ```
pub struct Game {
    config: GameConfig,
    bus: EventBus,
    layers: RefCell<LayerRegistry>,
    persistence: RefCell<PersistenceRegistry>,
    calendar: Calendar,
    clock: Cell<f64>,
}

impl Game {
    /// Create a game. The calendar day is registered as durable state.
    ///
    /// # Errors
    ///
    /// `Config` if the configuration is invalid.
    pub fn new(config: GameConfig) -> Result<Self, FrameworkError> {
        config.validate()?;
        let calendar = Calendar::new(config.starting_day);
        let mut persistence = PersistenceRegistry::new();
        persistence.register(DAY_KEY, calendar.day_cell())?;
        info!(day = config.starting_day, seed = config.rng_seed, "game created");
        Ok(Self {
            config,
            bus: EventBus::new(),
            layers: RefCell::new(LayerRegistry::new()),
            persistence: RefCell::new(persistence),
            calendar,
            clock: Cell::new(0.0),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Subscribe a tick handler on the game's bus.
    #[must_use = "dropping the subscription removes the handler"]
    pub fn on_tick(&self, handler: impl Fn(f64) + 'static) -> Subscription {
        self.bus.on_tick(handler)
    }

    /// Register a layer.
    ///
    /// # Errors
    ///
    /// `DuplicateLayer` if the id is taken.
    pub fn register_layer(&self, info: LayerInfo) -> Result<(), FrameworkError> {
        self.layers.borrow_mut().register(info)
    }

    /// Registered layer ids, in registration order.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.borrow().ids()
    }

    pub fn layer(&self, id: &LayerId) -> Option<LayerInfo> {
        self.layers.borrow().get(id).cloned()
    }

    /// Register a durable cell.
    ///
    /// # Errors
    ///
    /// `DuplicatePersistentKey` if the key is taken.
    pub fn persist<T>(&self, key: impl Into<String>, cell: &Persistent<T>) -> Result<(), FrameworkError>
    where
        T: Clone + Serialize + DeserializeOwned + 'static,
    {
        self.persistence.borrow_mut().register(key, cell)
    }

    pub fn persistent_keys(&self) -> Vec<String> {
        self.persistence.borrow().keys().map(String::from).collect()
    }

    /// Fields the layer `id` has registered, without the layer prefix.
    pub fn layer_fields(&self, id: &LayerId) -> Vec<String> {
        self.persistence
            .borrow()
            .keys()
            .filter_map(|key| id.field_of(key))
            .map(String::from)
            .collect()
    }

    /// Snapshot all durable state.
    pub fn save(&self) -> Result<SaveData, FrameworkError> {
        self.persistence.borrow().snapshot()
    }

    /// Restore durable state. Call before the first tick.
    pub fn load(&self, save: &SaveData) -> Result<(), FrameworkError> {
        self.persistence.borrow().restore(save)
    }

    /// Reset all durable state to defaults and rewind the clock.
    pub fn reset(&self) {
        self.persistence.borrow().reset_all();
        self.clock.set(0.0);
        debug!("game reset");
    }

    /// Seconds of simulated time elapsed.
    pub fn now(&self) -> f64 {
        self.clock.get()
    }

    /// Advance the clock and dispatch one tick.
    ///
    /// Invalid deltas are rejected by the bus and do not move the clock.
    pub fn update(&self, delta: f64) {
        if delta.is_finite() && delta >= 0.0 && !self.bus.is_dispatching() {
            self.clock.set(self.clock.get() + delta);
        }
        self.bus.update(delta);
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("config", &self.config)
            .field("day", &self.calendar.day())
            .field("now", &self.now())
            .field("layers", &self.layer_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Decimal;

    #[test]
    fn test_day_is_durable() {
        let game = Game::new(GameConfig::default().with_starting_day(3)).unwrap();
        assert!(game.persistent_keys().contains(&DAY_KEY.to_string()));
        game.calendar().advance();
        let save = game.save().unwrap();
        game.reset();
        assert_eq!(game.calendar().day(), 3);
        game.load(&save).unwrap();
        assert_eq!(game.calendar().day(), 4);
    }

    #[test]
    fn test_invalid_config() {
        let config = GameConfig {
            max_bulk_purchases: 0,
            ..GameConfig::default()
        };
        assert!(Game::new(config).is_err());
    }

    #[test]
    fn test_invalid_delta_does_not_advance_clock() {
        let game = Game::new(GameConfig::default()).unwrap();
        game.update(1.5);
        game.update(-3.0);
        game.update(f64::NAN);
        assert_eq!(game.now(), 1.5);
        assert_eq!(game.bus().tick_count(), 1);
    }

    #[test]
    fn test_duplicate_layer() {
        let game = Game::new(GameConfig::default()).unwrap();
        game.register_layer(LayerInfo::new("coal", "Coal", 3)).unwrap();
        assert!(matches!(
            game.register_layer(LayerInfo::new("coal", "Coal", 3)),
            Err(FrameworkError::DuplicateLayer(_))
        ));
        assert_eq!(game.layer_ids().len(), 1);
        assert_eq!(game.layer(&"coal".into()).unwrap().day, 3);
    }

    #[test]
    fn test_duplicate_persistent_key() {
        let game = Game::new(GameConfig::default()).unwrap();
        let cell = Persistent::new(Decimal::ZERO);
        game.persist("coal.coal", &cell).unwrap();
        assert!(game.persist("coal.coal", &cell).is_err());
    }

    #[test]
    fn test_layer_fields_stay_in_their_namespace() {
        let game = Game::new(GameConfig::default()).unwrap();
        let cell = Persistent::new(Decimal::ZERO);
        game.persist("coal.buildFire", &cell).unwrap();
        game.persist("coal.activeFires", &cell).unwrap();
        game.persist("coalition.buildFire", &cell).unwrap();
        assert_eq!(game.layer_fields(&"coal".into()), vec!["activeFires", "buildFire"]);
    }
}
