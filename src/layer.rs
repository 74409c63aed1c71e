//! Layers module.
//!
//! A layer is one progression branch of the game: its resources,
//! purchasables and a single tick handler. Layers are registered in a
//! `LayerRegistry` under unique ids, and gated by the `Calendar`: a
//! layer's handler does nothing before the layer's unlock day.

use crate::error::FrameworkError;
use crate::layer_id::LayerId;
use crate::persistence::Persistent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Static description of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub id: LayerId,
    pub name: String,
    /// First day on which the layer's handler runs.
    pub day: u32,
}

impl LayerInfo {
    pub fn new(id: impl Into<LayerId>, name: impl Into<String>, day: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            day,
        }
    }
}

/// A layer exposes its identity. Its fields are its public surface: other
/// layers read them directly.
pub trait Layer {
    fn info(&self) -> &LayerInfo;

    fn id(&self) -> &LayerId {
        &self.info().id
    }

    fn name(&self) -> &str {
        &self.info().name
    }

    fn day(&self) -> u32 {
        self.info().day
    }
}

/// Ordered registry of layers.
///
/// # Examples
///
/// ```rust
/// use zzidle::{FrameworkError, LayerInfo, LayerRegistry};
///
/// let mut registry = LayerRegistry::new();
/// registry.register(LayerInfo::new("trees", "Trees", 1)).unwrap();
/// registry.register(LayerInfo::new("coal", "Coal", 3)).unwrap();
///
/// let err = registry.register(LayerInfo::new("coal", "Coal again", 4)).unwrap_err();
/// assert!(matches!(err, FrameworkError::DuplicateLayer(_)));
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: Vec<LayerInfo>,
    index: HashMap<LayerId, usize>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer.
    ///
    /// # Errors
    ///
    /// `DuplicateLayer` if the id is taken. The registry is left unchanged.
    pub fn register(&mut self, info: LayerInfo) -> Result<(), FrameworkError> {
        if self.index.contains_key(&info.id) {
            return Err(FrameworkError::DuplicateLayer(info.id));
        }
        debug!(layer = %info.id, day = info.day, "registered layer");
        self.index.insert(info.id.clone(), self.layers.len());
        self.layers.push(info);
        Ok(())
    }

    pub fn get(&self, id: &LayerId) -> Option<&LayerInfo> {
        self.index.get(id).map(|&i| &self.layers[i])
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.index.contains_key(id)
    }

    /// Layer ids in registration order.
    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerInfo> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// The current game day, which gates layers.
///
/// Cloning shares the same day counter.
#[derive(Debug, Clone)]
pub struct Calendar {
    day: Persistent<u32>,
}

impl Calendar {
    pub fn new(starting_day: u32) -> Self {
        Self {
            day: Persistent::new(starting_day),
        }
    }

    pub fn day(&self) -> u32 {
        self.day.get()
    }

    pub fn set_day(&self, day: u32) {
        self.day.set(day);
    }

    pub fn advance(&self) {
        self.day.update(|d| *d = d.saturating_add(1));
    }

    /// Whether content for `day` is available.
    pub fn is_unlocked(&self, day: u32) -> bool {
        self.day() >= day
    }

    /// The durable day counter.
    pub fn day_cell(&self) -> &Persistent<u32> {
        &self.day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        info: LayerInfo,
    }

    impl Layer for Dummy {
        fn info(&self) -> &LayerInfo {
            &self.info
        }
    }

    #[test]
    fn test_registration_order() {
        let mut registry = LayerRegistry::new();
        for (id, day) in [("trees", 1), ("coal", 3), ("boxes", 5)] {
            registry.register(LayerInfo::new(id, id, day)).unwrap();
        }
        let ids: Vec<String> = registry.ids().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["trees", "coal", "boxes"]);
        assert_eq!(registry.get(&"coal".into()).unwrap().day, 3);
        assert!(!registry.contains(&"plastic".into()));
    }

    #[test]
    fn test_duplicate_leaves_registry_unchanged() {
        let mut registry = LayerRegistry::new();
        registry.register(LayerInfo::new("trees", "Trees", 1)).unwrap();
        assert_eq!(
            registry.register(LayerInfo::new("trees", "Other", 9)),
            Err(FrameworkError::DuplicateLayer("trees".into()))
        );
        assert_eq!(registry.get(&"trees".into()).unwrap().name, "Trees");
    }

    #[test]
    fn test_calendar_gate() {
        let calendar = Calendar::new(1);
        assert!(calendar.is_unlocked(1));
        assert!(!calendar.is_unlocked(3));
        calendar.advance();
        calendar.advance();
        assert_eq!(calendar.day(), 3);
        assert!(calendar.is_unlocked(3));
    }

    #[test]
    fn test_layer_trait_defaults() {
        let layer = Dummy {
            info: LayerInfo::new("plastic", "Plastic", 8),
        };
        assert_eq!(layer.id().as_str(), "plastic");
        assert_eq!(layer.name(), "Plastic");
        assert_eq!(layer.day(), 8);
    }
}
