//! Alert delivery to a single observer.
//!
//! Alerts are non-error notifications about stored values. The store (or
//! its background watcher) enqueues them on an [`AlertChannel`]; they are
//! delivered in enqueue order on the observer's [`HomeContext`], which is
//! pinned to the thread that registered the observer.
//!
//! - The channel never blocks the sender
//! - Delivery happens outside every store lock
//! - Alerts for a dropped observer or a dropped home context are discarded
//!
//! # Example
//!
//! ```ignore
//! let observer = Rc::new(MyObserver::default());
//! let (mut home, alerts) = HomeContext::register(&observer);
//!
//! let store = Store::new(alerts).with_policy(Arc::new(
//!     AlertRules::new().allowed_integers(-1000..=1000),
//! ));
//! store.initialize(16)?;
//! store.set_integer("temperature", 4000)?;
//!
//! // On the registering thread:
//! home.dispatch_pending();
//! ```

mod channel;
mod policy;
mod types;

pub use channel::{AlertChannel, HomeContext};
pub use policy::{AlertPolicy, AlertRules, NoAlerts};
pub use types::{Alert, AlertObserver};
