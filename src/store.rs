//! Widget store
//!
//! An in-memory map from widget id to widget, guarded by a single mutex.
//! Every operation takes the lock exactly once, so each one is atomic with
//! respect to concurrent requests. The lock is never held across an
//! `.await`: callers are synchronous and short.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::StoreError;

/// The single managed resource
///
/// Every field defaults to the empty string when absent from a decoded body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Widget {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Source of fresh widget ids
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String, StoreError>;
}

/// Random (v4) UUIDs, hyphenated lowercase
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String, StoreError> {
        Ok(uuid::Uuid::new_v4().to_string())
    }
}

pub struct WidgetStore {
    widgets: Mutex<HashMap<String, Widget>>,
    ids: Box<dyn IdGenerator>,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self::with_id_generator(UuidGenerator)
    }

    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            widgets: Mutex::new(HashMap::new()),
            ids: Box::new(ids),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Widget>>, StoreError> {
        self.widgets.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Snapshot of every widget, in no particular order
    pub fn list(&self) -> Result<Vec<Widget>, StoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    pub fn get(&self, id: &str) -> Result<Widget, StoreError> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.contains_key(id))
    }

    /// Insert a new widget under a freshly generated id.
    ///
    /// Any id carried by `widget` is discarded.
    pub fn create(&self, mut widget: Widget) -> Result<Widget, StoreError> {
        let id = self.ids.generate()?;
        if id.is_empty() {
            return Err(StoreError::IdGeneration("generator returned an empty id".into()));
        }
        widget.id = id;

        let mut widgets = self.lock()?;
        if widgets.contains_key(&widget.id) {
            return Err(StoreError::IdGeneration(format!(
                "generated id {} is already in use",
                widget.id
            )));
        }
        widgets.insert(widget.id.clone(), widget.clone());
        Ok(widget)
    }

    /// Overwrite name and description of an existing widget; the id never changes.
    pub fn update(&self, id: &str, changes: Widget) -> Result<Widget, StoreError> {
        let mut widgets = self.lock()?;
        let widget = widgets
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        widget.name = changes.name;
        widget.description = changes.description;
        Ok(widget.clone())
    }

    /// Remove a widget, returning its last known value
    pub fn delete(&self, id: &str) -> Result<Widget, StoreError> {
        self.lock()?
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new()
    }
}
