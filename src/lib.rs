//! # Typed Store
//!
//! A small in-process key-value store with a fixed capacity, a closed set
//! of value kinds, and type checking on every access.
//!
//! ## Core Concepts
//!
//! - **Values**: integers, text, colors, integer arrays and color arrays
//! - **Store**: a bounded map guarded by a single lock; setting a key
//!   replaces its kind, getting a key checks it
//! - **Alerts**: non-error notifications delivered to one observer on the
//!   thread that registered it
//! - **Watcher**: an optional background sweep that re-inspects stored values
//!
//! ## Example
//!
//! ```ignore
//! use typed_store::{Color, Store, StoreError};
//!
//! let (store, mut home) = Store::with_observer(&observer);
//! store.initialize(2)?;
//!
//! store.set_integer("a", 5)?;
//! store.set_color("b", Color::parse("red")?)?;
//! assert!(matches!(store.get_string("a"), Err(StoreError::InvalidType { .. })));
//!
//! home.dispatch_pending();
//! store.finalize()?;
//! ```

pub mod alerts;
pub mod color;
pub mod error;
pub mod store;
pub mod types;
pub mod watcher;

// Re-exports
pub use alerts::{Alert, AlertChannel, AlertObserver, AlertPolicy, AlertRules, HomeContext, NoAlerts};
pub use color::Color;
pub use error::{Result, StoreError};
pub use store::{Store, StoreConfig, DEFAULT_CAPACITY};
pub use types::{Parsed, Value, ValueKind, ARRAY_SEPARATOR};
pub use watcher::WatcherConfig;
