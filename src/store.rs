//! Main Store struct tying the value map, alerts and watcher together.

use crate::alerts::{Alert, AlertChannel, AlertObserver, AlertPolicy, HomeContext, NoAlerts};
use crate::color::Color;
use crate::error::{Result, StoreError};
use crate::types::{Value, ValueKind};
use crate::watcher::{Watcher, WatcherConfig};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 16;

/// Store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of distinct keys.
    pub capacity: usize,

    /// Background watcher settings (None = no watcher).
    pub watcher: Option<WatcherConfig>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            watcher: None,
        }
    }
}

/// The bounded key to value map guarded by the store lock.
#[derive(Debug)]
pub(crate) struct Entries {
    map: HashMap<String, Value>,
    capacity: usize,
}

impl Entries {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    fn get(&self, key: &str) -> Result<&Value> {
        self.map
            .get(key)
            .ok_or_else(|| StoreError::NotExistingKey(key.to_string()))
    }

    /// Insert or overwrite. Only new keys count against capacity.
    fn insert(&mut self, key: &str, value: Value) -> Result<()> {
        if let Some(slot) = self.map.get_mut(key) {
            *slot = value;
            return Ok(());
        }
        if self.map.len() >= self.capacity {
            warn!(key, capacity = self.capacity, "store full, rejecting new key");
            return Err(StoreError::StoreFull {
                capacity: self.capacity,
            });
        }
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    /// Increment the integer under `key`, if there is one.
    pub(crate) fn increment(&mut self, key: &str) {
        if let Some(Value::Integer(i)) = self.map.get_mut(key) {
            *i = i.wrapping_add(1);
        }
    }

    /// Copy of every entry, for inspection outside the lock.
    pub(crate) fn snapshot(&self) -> Vec<(String, Value)> {
        self.map
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// State shared between the store and its watcher thread.
pub(crate) type SharedEntries = Arc<Mutex<Option<Entries>>>;

/// A bounded, type-checked key-value store.
///
/// Every read and write takes the same exclusive lock, so operations on one
/// store observe a single total order. Parsing, policy evaluation and alert
/// delivery all happen outside that lock.
pub struct Store {
    /// Entries, `None` while not initialized.
    entries: SharedEntries,

    /// Channel to the registered observer.
    alerts: AlertChannel,

    /// Decides which values raise alerts.
    policy: Arc<dyn AlertPolicy>,

    /// Watcher started by `initialize` when configured.
    watcher_config: Option<WatcherConfig>,

    /// Running watcher. Also serializes initialize/finalize.
    watcher: Mutex<Option<Watcher>>,
}

impl Store {
    /// Create an uninitialized store bound to an observer's alert channel.
    pub fn new(alerts: AlertChannel) -> Self {
        Self {
            entries: Arc::new(Mutex::new(None)),
            alerts,
            policy: Arc::new(NoAlerts),
            watcher_config: None,
            watcher: Mutex::new(None),
        }
    }

    /// Register `observer` on the current thread and bind a new store to it.
    pub fn with_observer<O: AlertObserver + ?Sized>(observer: &Rc<O>) -> (Self, HomeContext<O>) {
        let (home, alerts) = HomeContext::register(observer);
        (Self::new(alerts), home)
    }

    /// Replace the alert policy.
    pub fn with_policy(mut self, policy: Arc<dyn AlertPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Run a background watcher whenever the store is initialized.
    pub fn with_watcher(mut self, config: WatcherConfig) -> Self {
        self.watcher_config = Some(config);
        self
    }

    // --- Lifecycle ---

    /// Allocate an empty store holding at most `capacity` keys.
    pub fn initialize(&self, capacity: usize) -> Result<()> {
        self.initialize_with(StoreConfig {
            capacity,
            watcher: self.watcher_config.clone(),
        })
    }

    /// Allocate an empty store from a full configuration.
    pub fn initialize_with(&self, config: StoreConfig) -> Result<()> {
        if config.capacity == 0 {
            return Err(StoreError::InvalidCapacity);
        }

        let mut watcher = self.watcher.lock();
        {
            let mut entries = self.entries.lock();
            if entries.is_some() {
                return Err(StoreError::AlreadyInitialized);
            }
            *entries = Some(Entries::new(config.capacity));
        }

        if let Some(watcher_config) = config.watcher {
            match Watcher::spawn(
                watcher_config,
                Arc::clone(&self.entries),
                self.alerts.clone(),
                Arc::clone(&self.policy),
            ) {
                Ok(started) => *watcher = Some(started),
                Err(err) => {
                    *self.entries.lock() = None;
                    return Err(err);
                }
            }
        }

        info!(capacity = config.capacity, "store initialized");
        Ok(())
    }

    /// Stop the watcher and release every entry.
    pub fn finalize(&self) -> Result<()> {
        let mut watcher = self.watcher.lock();
        if let Some(running) = watcher.take() {
            running.stop();
        }

        let released = self
            .entries
            .lock()
            .take()
            .ok_or(StoreError::NotInitialized)?;
        info!(entries = released.map.len(), "store finalized");
        Ok(())
    }

    /// Whether `initialize` has run without a matching `finalize`.
    pub fn is_initialized(&self) -> bool {
        self.entries.lock().is_some()
    }

    // --- Reads ---

    fn with_entries<T>(&self, f: impl FnOnce(&mut Entries) -> Result<T>) -> Result<T> {
        let mut guard = self.entries.lock();
        let entries = guard.as_mut().ok_or(StoreError::NotInitialized)?;
        f(entries)
    }

    fn read<T>(
        &self,
        key: &str,
        expected: ValueKind,
        extract: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<T> {
        self.with_entries(|entries| {
            let value = entries.get(key)?;
            extract(value).ok_or_else(|| StoreError::InvalidType {
                key: key.to_string(),
                expected,
                found: value.kind(),
            })
        })
    }

    /// Fetch a copy of the value under `key`, which must be of `kind`.
    pub fn get(&self, key: &str, kind: ValueKind) -> Result<Value> {
        self.with_entries(|entries| Ok(entries.get(key)?.expect_kind(key, kind)?.clone()))
    }

    /// Get the integer under `key`.
    pub fn get_integer(&self, key: &str) -> Result<i32> {
        self.read(key, ValueKind::Integer, Value::as_integer)
    }

    /// Get a copy of the text under `key`.
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.read(key, ValueKind::Text, |v| v.as_text().map(str::to_string))
    }

    /// Get the color under `key`.
    pub fn get_color(&self, key: &str) -> Result<Color> {
        self.read(key, ValueKind::Color, Value::as_color)
    }

    /// Get a copy of the integer array under `key`.
    pub fn get_integer_array(&self, key: &str) -> Result<Vec<i32>> {
        self.read(key, ValueKind::IntegerArray, |v| {
            v.as_integer_array().map(<[i32]>::to_vec)
        })
    }

    /// Get a copy of the color array under `key`.
    pub fn get_color_array(&self, key: &str) -> Result<Vec<Color>> {
        self.read(key, ValueKind::ColorArray, |v| {
            v.as_color_array().map(<[Color]>::to_vec)
        })
    }

    /// Render the value under `key` in its textual exchange form.
    pub fn get_text(&self, key: &str, kind: ValueKind) -> Result<String> {
        // Rendering happens after the lock is released.
        Ok(self.get(key, kind)?.to_string())
    }

    // --- Writes ---

    /// Insert or overwrite `key`, replacing whatever kind it held.
    ///
    /// Alerts raised by the policy are sent once the value is committed.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let mut alerts = Vec::new();
        self.policy.inspect(key, &value, &mut alerts);

        let kind = value.kind();
        self.with_entries(|entries| entries.insert(key, value))?;
        debug!(key, %kind, alerts = alerts.len(), "value set");

        self.alerts.notify_all(alerts);
        Ok(())
    }

    /// Store an integer under `key`.
    pub fn set_integer(&self, key: &str, value: i32) -> Result<()> {
        self.set(key, Value::Integer(value))
    }

    /// Store text under `key`.
    pub fn set_string(&self, key: &str, value: impl Into<String>) -> Result<()> {
        self.set(key, Value::Text(value.into()))
    }

    /// Store a color under `key`.
    pub fn set_color(&self, key: &str, value: Color) -> Result<()> {
        self.set(key, Value::Color(value))
    }

    /// Store an integer array under `key`.
    pub fn set_integer_array(&self, key: &str, values: impl Into<Vec<i32>>) -> Result<()> {
        self.set(key, Value::IntegerArray(values.into()))
    }

    /// Store a color array under `key`.
    pub fn set_color_array(&self, key: &str, values: impl Into<Vec<Color>>) -> Result<()> {
        self.set(key, Value::ColorArray(values.into()))
    }

    /// Parse `text` as `kind` and store it.
    ///
    /// Scalars that fail to parse are returned as errors. Array elements that
    /// fail to parse are left out of the stored array and each one is sent to
    /// the observer as a text alert once the array is stored.
    pub fn set_text(&self, key: &str, kind: ValueKind, text: &str) -> Result<()> {
        let parsed = kind.parse(text)?;
        self.set(key, parsed.value)?;
        if !parsed.rejected.is_empty() {
            debug!(key, rejected = parsed.rejected.len(), "array elements rejected");
            self.alerts
                .notify_all(parsed.rejected.into_iter().map(Alert::Text));
        }
        Ok(())
    }

    // --- Introspection ---

    /// Number of keys currently held.
    pub fn len(&self) -> Result<usize> {
        self.with_entries(|entries| Ok(entries.map.len()))
    }

    /// Whether no key is held.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Maximum number of distinct keys.
    pub fn capacity(&self) -> Result<usize> {
        self.with_entries(|entries| Ok(entries.capacity))
    }

    /// Whether `key` holds a value of any kind.
    pub fn contains_key(&self, key: &str) -> Result<bool> {
        self.with_entries(|entries| Ok(entries.map.contains_key(key)))
    }

    /// Kind of the value under `key`, if present.
    pub fn kind_of(&self, key: &str) -> Result<Option<ValueKind>> {
        self.with_entries(|entries| Ok(entries.map.get(key).map(Value::kind)))
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        // Best-effort finalize so the watcher thread does not outlive us
        if self.is_initialized() {
            let _ = self.finalize();
        }
    }
}
