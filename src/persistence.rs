//! Durable state.
//!
//! Every piece of state that must survive a restart lives in a
//! `Persistent<T>` cell. Cells are registered with a `PersistenceRegistry`
//! under a unique key; the registry turns the whole set into a `SaveData`
//! snapshot and writes snapshots back. Storage itself (files, browser
//! storage, network) is the caller's concern.
//!
//! Derived values are never registered: they are recomputed from durable
//! cells.

use crate::error::FrameworkError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

struct Slot<T> {
    value: RefCell<T>,
    default: T,
}

/// A shared, durable value cell.
///
/// Cloning a `Persistent` clones the handle, not the value: every clone
/// reads and writes the same cell. This is how layers hand out references
/// to their state.
///
/// # Examples
///
/// ```rust
/// use zzidle::Persistent;
///
/// let fires = Persistent::new(0u32);
/// let handle = fires.clone();
///
/// handle.update(|v| *v += 3);
/// assert_eq!(fires.get(), 3);
///
/// fires.reset();
/// assert_eq!(handle.get(), 0);
/// ```
pub struct Persistent<T> {
    cell: Rc<Slot<T>>,
}

impl<T: Clone> Persistent<T> {
    /// Create a cell holding `default`. Resetting restores this value.
    pub fn new(default: T) -> Self {
        Self {
            cell: Rc::new(Slot {
                value: RefCell::new(default.clone()),
                default,
            }),
        }
    }

    pub fn get(&self) -> T {
        self.cell.value.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.cell.value.borrow_mut() = value;
    }

    /// Mutate the value in place.
    ///
    /// The closure must not read this cell.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.cell.value.borrow_mut());
    }

    /// Read through a borrow without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.value.borrow())
    }

    /// Restore the default value.
    pub fn reset(&self) {
        self.set(self.cell.default.clone());
    }

    pub fn default_value(&self) -> &T {
        &self.cell.default
    }

    /// Whether two handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Clone for Persistent<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Persistent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistent")
            .field("value", &self.cell.value.borrow())
            .field("default", &self.cell.default)
            .finish()
    }
}

/// A parsed value waiting to be written into its cell.
pub type StagedWrite = Box<dyn FnOnce()>;

/// Type-erased view of a durable cell.
pub trait Durable {
    /// Serialize the current value.
    fn save(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Parse a serialized value without touching the cell.
    ///
    /// The returned action writes the parsed value when run.
    fn stage(&self, value: serde_json::Value) -> Result<StagedWrite, serde_json::Error>;

    /// Replace the current value with a serialized one.
    fn load(&self, value: serde_json::Value) -> Result<(), serde_json::Error> {
        let write = self.stage(value)?;
        write();
        Ok(())
    }

    /// Restore the default value.
    fn reset(&self);
}

impl<T> Durable for Persistent<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
        self.with(|value| serde_json::to_value(value))
    }

    fn stage(&self, value: serde_json::Value) -> Result<StagedWrite, serde_json::Error> {
        let parsed: T = serde_json::from_value(value)?;
        let cell = self.clone();
        Ok(Box::new(move || cell.set(parsed)))
    }

    fn reset(&self) {
        Persistent::reset(self);
    }
}

/// A serialized snapshot of every registered durable cell.
///
/// # Examples
///
/// ```rust
/// use zzidle::SaveData;
///
/// let mut save = SaveData::new();
/// save.set("coal.activeFires", 3);
///
/// let active: Option<u32> = save.get("coal.activeFires");
/// assert_eq!(active, Some(3));
///
/// let json = save.to_json().unwrap();
/// let back = SaveData::from_json(&json).unwrap();
/// assert_eq!(back, save);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveData {
    data: BTreeMap<String, serde_json::Value>,
}

impl SaveData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value. Values that fail to serialize are skipped.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.data.insert(key.into(), json_value);
        }
    }

    /// Read a value, or `None` if it is missing or has the wrong shape.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn raw(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_json(&self) -> Result<String, FrameworkError> {
        serde_json::to_string(self).map_err(|e| FrameworkError::Persistence {
            key: String::from("<save>"),
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, FrameworkError> {
        serde_json::from_str(json).map_err(|e| FrameworkError::Persistence {
            key: String::from("<save>"),
            reason: e.to_string(),
        })
    }
}

/// Registry of durable cells keyed by `"<layer>.<field>"`.
///
/// # Examples
///
/// ```rust
/// use zzidle::{Decimal, Persistent, PersistenceRegistry};
///
/// let logs = Persistent::new(Decimal::ZERO);
/// let mut registry = PersistenceRegistry::new();
/// registry.register("trees.logs", &logs).unwrap();
///
/// logs.set(Decimal::from(120));
/// let save = registry.snapshot().unwrap();
///
/// logs.set(Decimal::from(5));
/// registry.restore(&save).unwrap();
/// assert_eq!(logs.get(), Decimal::from(120));
/// ```
#[derive(Default)]
pub struct PersistenceRegistry {
    cells: BTreeMap<String, Box<dyn Durable>>,
}

impl PersistenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a durable cell.
    ///
    /// # Errors
    ///
    /// `DuplicatePersistentKey` if the key is already taken.
    pub fn register<T>(&mut self, key: impl Into<String>, cell: &Persistent<T>) -> Result<(), FrameworkError>
    where
        T: Clone + Serialize + DeserializeOwned + 'static,
    {
        let key = key.into();
        if self.cells.contains_key(&key) {
            return Err(FrameworkError::DuplicatePersistentKey(key));
        }
        trace!(key = %key, "registered durable cell");
        self.cells.insert(key, Box::new(cell.clone()));
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cells.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Serialize every registered cell.
    pub fn snapshot(&self) -> Result<SaveData, FrameworkError> {
        let mut save = SaveData::new();
        for (key, cell) in &self.cells {
            let value = cell.save().map_err(|e| FrameworkError::Persistence {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            save.data.insert(key.clone(), value);
        }
        Ok(save)
    }

    /// Write a snapshot back into the registered cells.
    ///
    /// Cells missing from the snapshot keep their current value. Keys in
    /// the snapshot that no cell claims are ignored.
    ///
    /// # Errors
    ///
    /// `Persistence` naming the first value that does not parse. Every
    /// value is parsed before any cell is written, so a failed restore
    /// leaves all cells unchanged.
    pub fn restore(&self, save: &SaveData) -> Result<(), FrameworkError> {
        let mut staged = Vec::with_capacity(save.len());
        for (key, cell) in &self.cells {
            if let Some(value) = save.data.get(key) {
                let write = cell.stage(value.clone()).map_err(|e| FrameworkError::Persistence {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
                staged.push(write);
            }
        }
        let restored = staged.len();
        for write in staged {
            write();
        }
        debug!(restored, total = self.cells.len(), "restored save data");
        Ok(())
    }

    /// Reset every registered cell to its default.
    pub fn reset_all(&self) {
        for cell in self.cells.values() {
            cell.reset();
        }
    }
}

impl fmt::Debug for PersistenceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceRegistry")
            .field("keys", &self.cells.keys().collect::<Vec<_>>())
            .finish()
    }
}
