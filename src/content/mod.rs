//! Demonstration content built on the framework.
//!
//! A `World` holds five layers as lazy proxies. Layers read each other in
//! two ways:
//!
//! * at construction, by taking a handle to another layer's resource (coal
//!   pays for fires with the trees layer's logs), which forces that layer
//!   to be built first;
//! * at evaluation time, through computables that look the other layer up
//!   in the world when read (the trees layer's log gain depends on boxes
//!   owned in the boxes layer, which itself converts logs).
//!
//! The second kind is what lets layers reference each other in both
//! directions. Closures hold a `Weak<World>`, so the world owns its layers
//! and the game's bus holds no strong references back.

pub mod boxes;
pub mod coal;
pub mod management;
pub mod plastic;
pub mod trees;

use crate::computable::Computable;
use crate::error::FrameworkError;
use crate::game::Game;
use crate::graph::{InitGraph, InitTracker};
use crate::lazy::LazyProxy;
use crate::persistence::SaveData;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::info;

pub use boxes::Boxes;
pub use coal::Coal;
pub use management::{Management, Trainee};
pub use plastic::Plastic;
pub use trees::Trees;

/// All content layers of one game.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use zzidle::content::World;
/// use zzidle::{Game, GameConfig};
///
/// let game = Rc::new(Game::new(GameConfig::default()).unwrap());
/// let world = World::new(game);
/// world.initialize().unwrap();
///
/// world.trees.chop.click();
/// assert!(world.trees.logs.value() > zzidle::Decimal::ZERO);
/// ```
pub struct World {
    game: Rc<Game>,
    tracker: InitTracker,
    pub trees: LazyProxy<Trees>,
    pub coal: LazyProxy<Coal>,
    pub boxes: LazyProxy<Boxes>,
    pub plastic: LazyProxy<Plastic>,
    pub management: LazyProxy<Management>,
}

type Builder<T> = fn(&Rc<World>) -> Result<T, FrameworkError>;

fn layer_proxy<T: 'static>(
    label: &str,
    tracker: &InitTracker,
    world: &Weak<World>,
    build: Builder<T>,
) -> LazyProxy<T> {
    let world = world.clone();
    LazyProxy::tracked(label, Rc::clone(tracker), move || {
        let world = world.upgrade().ok_or(FrameworkError::DetachedWorld)?;
        build(&world)
    })
}

impl World {
    /// Declare every layer. Nothing is built until first access or
    /// [`World::initialize`].
    pub fn new(game: Rc<Game>) -> Rc<World> {
        let tracker = InitGraph::tracker();
        Rc::new_cyclic(|weak: &Weak<World>| World {
            trees: layer_proxy(trees::ID, &tracker, weak, trees::build),
            coal: layer_proxy(coal::ID, &tracker, weak, coal::build),
            boxes: layer_proxy(boxes::ID, &tracker, weak, boxes::build),
            plastic: layer_proxy(plastic::ID, &tracker, weak, plastic::build),
            management: layer_proxy(management::ID, &tracker, weak, management::build),
            tracker,
            game,
        })
    }

    /// Build every layer.
    ///
    /// # Errors
    ///
    /// The first construction error: a duplicate layer id or persistent
    /// key, or a circular construction.
    pub fn initialize(&self) -> Result<(), FrameworkError> {
        self.trees.try_get()?;
        self.coal.try_get()?;
        self.boxes.try_get()?;
        self.plastic.try_get()?;
        self.management.try_get()?;
        info!(order = ?self.construction_order()?, "world initialized");
        Ok(())
    }

    pub fn game(&self) -> &Rc<Game> {
        &self.game
    }

    /// Layer labels, every eager dependency ahead of its dependents.
    pub fn construction_order(&self) -> Result<Vec<String>, FrameworkError> {
        self.tracker.borrow().construction_order()
    }

    /// Direct construction dependencies of a layer.
    pub fn construction_dependencies(&self, label: &str) -> Vec<String> {
        self.tracker.borrow().dependencies_of(label)
    }

    /// Advance the game by `delta` seconds.
    pub fn update(&self, delta: f64) {
        self.game.update(delta);
    }

    pub fn save(&self) -> Result<SaveData, FrameworkError> {
        self.game.save()
    }

    /// Restore a save. Call after [`World::initialize`] and before the
    /// first tick.
    pub fn load(&self, save: &SaveData) -> Result<(), FrameworkError> {
        self.game.load(save)?;
        self.trees.try_get()?.total_logs.resync();
        self.coal.try_get()?.total_coal.resync();
        self.boxes.try_get()?.total_boxes.resync();
        Ok(())
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("game", &self.game)
            .field("trees", &self.trees.is_initialized())
            .field("coal", &self.coal.is_initialized())
            .field("boxes", &self.boxes.is_initialized())
            .field("plastic", &self.plastic.is_initialized())
            .field("management", &self.management.is_initialized())
            .finish()
    }
}

/// A computable that reads the world when evaluated.
///
/// Yields `fallback` once the world is gone.
pub(crate) fn derive<T: Clone + 'static>(
    world: &Weak<World>,
    fallback: T,
    f: impl Fn(&World) -> T + 'static,
) -> Computable<T> {
    let world = world.clone();
    Computable::derived(move || match world.upgrade() {
        Some(world) => f(&world),
        None => fallback.clone(),
    })
}

/// Run `f` against the world if it still exists.
pub(crate) fn with_world(world: &Weak<World>, f: impl FnOnce(&World)) {
    if let Some(world) = world.upgrade() {
        f(&world);
    }
}
