//! Error types for the framework.
//!
//! Every configuration error the framework can detect is represented by
//! the `FrameworkError` enum. Rejected purchases and clicks are not errors;
//! they are reported as `false` by the operation that was refused.

use crate::layer_id::LayerId;
use thiserror::Error;

/// Format a construction path as a readable string.
fn format_init_path(path: &[String]) -> String {
    if path.is_empty() {
        return String::from("(empty path)");
    }
    path.join(" -> ")
}

/// Errors raised by the framework.
///
/// These are configuration errors: they indicate a broken game definition
/// and are meant to surface loudly at startup.
///
/// # Examples
///
/// ```rust
/// use zzidle::{FrameworkError, LayerId};
///
/// let err = FrameworkError::DuplicateLayer(LayerId::from_str("coal"));
/// assert_eq!(err.to_string(), "Duplicate layer id: coal");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FrameworkError {
    /// Two layers were registered under the same id.
    #[error("Duplicate layer id: {0}")]
    DuplicateLayer(LayerId),

    /// A lazy proxy was accessed while it was still being constructed.
    ///
    /// The path lists the proxies whose construction was in progress,
    /// closed by the proxy that was re-entered.
    #[error("Circular initialization: {}", format_init_path(.path))]
    CircularInitialization { path: Vec<String> },

    /// A lazy proxy's factory failed. The failure is cached.
    #[error("Initialization of {label} failed: {reason}")]
    InitializationFailed { label: String, reason: String },

    /// Two durable cells were registered under the same key.
    #[error("Duplicate persistent key: {0}")]
    DuplicatePersistentKey(String),

    /// A durable cell could not be serialized or restored.
    #[error("Persistence error for {key}: {reason}")]
    Persistence { key: String, reason: String },

    /// A bulk purchase did not terminate within the configured bound.
    ///
    /// This happens when a buyable's cost does not grow with its amount.
    #[error("Purchase loop for {label} exceeded {limit} iterations")]
    UnboundedPurchase { label: String, limit: u64 },

    /// A buyable's cost decreased from one level to the next.
    #[error("Cost of {label} decreases at level {level}")]
    NonMonotonicCost { label: String, level: u64 },

    /// A layer factory ran after the world that owns it was dropped.
    #[error("World was dropped before layer construction")]
    DetachedWorld,

    /// Malformed configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
