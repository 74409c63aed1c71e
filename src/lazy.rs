//! Lazy proxies.
//!
//! A `LazyProxy<T>` holds a factory and builds its value on first access.
//! Features that reference each other across layers are declared as
//! proxies, so a definition may name a sibling that hasn't been built yet.
//!
//! Construction runs at most once. A proxy that is accessed again while its
//! own factory is still running reports `CircularInitialization` instead of
//! recursing, and a factory failure is cached and returned on every later
//! access.

use crate::error::FrameworkError;
use crate::graph::InitTracker;
use std::cell::{Cell, OnceCell};
use std::fmt;
use std::ops::Deref;
use tracing::{debug, warn};

type Factory<T> = Box<dyn FnOnce() -> Result<T, FrameworkError>>;

/// A value constructed on first access.
///
/// # Examples
///
/// ```rust
/// use zzidle::LazyProxy;
///
/// let proxy = LazyProxy::new("answer", || Ok(6 * 7));
/// assert!(!proxy.is_initialized());
///
/// assert_eq!(*proxy.try_get().unwrap(), 42);
/// assert_eq!(*proxy, 42);
/// assert!(proxy.is_initialized());
/// ```
pub struct LazyProxy<T> {
    label: String,
    value: OnceCell<Result<T, FrameworkError>>,
    factory: Cell<Option<Factory<T>>>,
    constructing: Cell<bool>,
    tracker: Option<InitTracker>,
}

impl<T> LazyProxy<T> {
    /// Create an untracked proxy.
    pub fn new(
        label: impl Into<String>,
        factory: impl FnOnce() -> Result<T, FrameworkError> + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            value: OnceCell::new(),
            factory: Cell::new(Some(Box::new(factory))),
            constructing: Cell::new(false),
            tracker: None,
        }
    }

    /// Create a proxy that records its construction in `tracker`.
    ///
    /// Proxies sharing one tracker report the full construction path when
    /// a cycle is hit, and the tracker's graph yields the order in which
    /// they were built.
    pub fn tracked(
        label: impl Into<String>,
        tracker: InitTracker,
        factory: impl FnOnce() -> Result<T, FrameworkError> + 'static,
    ) -> Self {
        let mut proxy = Self::new(label, factory);
        proxy.tracker = Some(tracker);
        proxy
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether construction has finished, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Get the value, constructing it if needed.
    ///
    /// # Errors
    ///
    /// * `CircularInitialization` if called while this proxy's factory is
    ///   running. The proxy stays unbuilt; the outer construction decides
    ///   what to do with the error.
    /// * Whatever the factory returned, cached for every later call.
    pub fn try_get(&self) -> Result<&T, FrameworkError> {
        if let Some(result) = self.value.get() {
            self.record_access();
            return result.as_ref().map_err(Clone::clone);
        }
        if self.constructing.get() {
            let path = match &self.tracker {
                Some(tracker) => tracker.borrow().reentry_path(&self.label),
                None => vec![self.label.clone(), self.label.clone()],
            };
            warn!(proxy = %self.label, ?path, "re-entered lazy proxy during construction");
            return Err(FrameworkError::CircularInitialization { path });
        }

        self.value
            .get_or_init(|| self.construct())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// A built proxy read inside another construction is still a dependency
    /// of that construction.
    fn record_access(&self) {
        if let Some(tracker) = &self.tracker {
            let mut graph = tracker.borrow_mut();
            if let Some(parent) = graph.in_progress().last().cloned() {
                graph.add_edge(&parent, &self.label);
            }
        }
    }

    fn construct(&self) -> Result<T, FrameworkError> {
        self.constructing.set(true);
        if let Some(tracker) = &self.tracker {
            tracker.borrow_mut().enter(&self.label);
        }
        debug!(proxy = %self.label, "constructing");

        let result = match self.factory.take() {
            Some(factory) => factory(),
            None => Err(FrameworkError::InitializationFailed {
                label: self.label.clone(),
                reason: String::from("factory already consumed"),
            }),
        };

        if let Some(tracker) = &self.tracker {
            tracker.borrow_mut().exit();
        }
        self.constructing.set(false);

        if let Err(err) = &result {
            warn!(proxy = %self.label, error = %err, "construction failed");
        }
        result
    }
}

/// Dereferencing forces construction.
///
/// # Panics
///
/// Panics if construction fails or re-enters. Use [`LazyProxy::try_get`]
/// where that can happen; after a successful `try_get` dereferencing never
/// panics.
impl<T> Deref for LazyProxy<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("lazy proxy `{}` is unavailable: {}", self.label, err),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyProxy")
            .field("label", &self.label)
            .field("value", &self.value.get())
            .finish()
    }
}
