#![forbid(unsafe_code)]

//! Durable position persistence.
//!
//! All controllers in a runtime share one namespaced record in a key-value
//! store. The record is a JSON object mapping element id to its last saved
//! `left`/`top` style values:
//!
//! ```json
//! { "toolbar": { "left": "120px", "top": "48px" } }
//! ```
//!
//! Saves are read-modify-write of the whole record with last-writer-wins
//! semantics; only one drag session is ever active, so there is no locking.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::{InitialPosition, ZERO_PX};
use crate::error::StoreError;

/// Namespace key used when the caller does not choose one.
pub const DEFAULT_STORAGE_KEY: &str = "SailingDraggablePositions";

/// Minimal string key-value store, shaped after the browser `Storage` API.
///
/// Methods take `&self`; implementations use interior mutability so one
/// store can be shared between controllers.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }
}

/// In-memory [`KeyValueStore`].
///
/// Share it between controllers with `Rc<MemoryStore>`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One persisted entry; either axis may be missing in hand-edited records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
}

impl StoredPosition {
    #[must_use]
    pub fn new(left: impl Into<String>, top: impl Into<String>) -> Self {
        Self {
            left: Some(left.into()),
            top: Some(top.into()),
        }
    }
}

/// Element id -> last saved position.
pub type PositionMap = BTreeMap<String, StoredPosition>;

/// Typed view over one namespaced record of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct PositionStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> PositionStore<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Namespace key of the shared record.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read the whole record. Missing, unreadable, or corrupt records read
    /// as empty.
    #[must_use]
    pub fn load_all(&self) -> PositionMap {
        let raw = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PositionMap::new(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "position store unreadable");
                return PositionMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "discarding corrupt position record");
                PositionMap::new()
            }
        }
    }

    /// Stored entry for `id`, if any.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<StoredPosition> {
        self.load_all().remove(id)
    }

    /// Upsert `id` and write the whole record back.
    pub fn save(&self, id: &str, position: StoredPosition) -> Result<(), StoreError> {
        let mut map = self.load_all();
        map.insert(id.to_owned(), position);
        let encoded =
            serde_json::to_string(&map).map_err(|err| StoreError::Encode(err.to_string()))?;
        self.backend.set_item(&self.key, &encoded)
    }

    /// Position to apply at initialization.
    ///
    /// With persistence disabled this is always `initial`. Otherwise it is
    /// the stored entry (missing axes become `"0px"`), or `initial` when
    /// nothing was stored for `id`.
    #[must_use]
    pub fn restore(&self, id: &str, should_save: bool, initial: &InitialPosition) -> InitialPosition {
        if !should_save {
            return initial.clone();
        }
        match self.lookup(id) {
            Some(stored) => InitialPosition {
                x: non_empty_or_zero(stored.left),
                y: non_empty_or_zero(stored.top),
            },
            None => initial.clone(),
        }
    }
}

fn non_empty_or_zero(value: Option<String>) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| ZERO_PX.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> PositionStore<Rc<MemoryStore>> {
        PositionStore::new(Rc::new(MemoryStore::new()), DEFAULT_STORAGE_KEY)
    }

    fn initial() -> InitialPosition {
        InitialPosition {
            x: "10px".to_owned(),
            y: "20px".to_owned(),
        }
    }

    #[test]
    fn save_then_restore_round_trips() {
        let store = store();
        store
            .save("panel", StoredPosition::new("300px", "140px"))
            .unwrap();
        let restored = store.restore("panel", true, &initial());
        assert_eq!(
            restored,
            InitialPosition {
                x: "300px".to_owned(),
                y: "140px".to_owned(),
            }
        );
    }

    #[test]
    fn restore_ignores_saved_value_when_disabled() {
        let store = store();
        store
            .save("panel", StoredPosition::new("300px", "140px"))
            .unwrap();
        assert_eq!(store.restore("panel", false, &initial()), initial());
    }

    #[test]
    fn restore_without_entry_uses_initial() {
        assert_eq!(store().restore("missing", true, &initial()), initial());
    }

    #[test]
    fn restore_fills_missing_axes_with_zero() {
        let backend = Rc::new(MemoryStore::new());
        backend
            .set_item(DEFAULT_STORAGE_KEY, r#"{"panel":{"left":"55px","top":""}}"#)
            .unwrap();
        let store = PositionStore::new(backend, DEFAULT_STORAGE_KEY);
        let restored = store.restore("panel", true, &initial());
        assert_eq!(restored.x, "55px");
        assert_eq!(restored.y, ZERO_PX);
    }

    #[test]
    fn save_keeps_other_entries() {
        let store = store();
        store.save("a", StoredPosition::new("1px", "2px")).unwrap();
        store.save("b", StoredPosition::new("3px", "4px")).unwrap();
        store.save("a", StoredPosition::new("5px", "6px")).unwrap();
        let map = store.load_all();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], StoredPosition::new("5px", "6px"));
        assert_eq!(map["b"], StoredPosition::new("3px", "4px"));
        assert_eq!(
            store.backend().get_item(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"a":{"left":"5px","top":"6px"},"b":{"left":"3px","top":"4px"}}"#)
        );
    }

    #[test]
    fn corrupt_record_reads_empty_and_is_overwritten() {
        let backend = Rc::new(MemoryStore::new());
        backend.set_item(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let store = PositionStore::new(Rc::clone(&backend), DEFAULT_STORAGE_KEY);
        assert!(store.load_all().is_empty());
        store.save("a", StoredPosition::new("1px", "2px")).unwrap();
        assert_eq!(store.lookup("a"), Some(StoredPosition::new("1px", "2px")));
    }

    #[test]
    fn stores_sharing_a_backend_see_each_other() {
        let backend = Rc::new(MemoryStore::new());
        let first = PositionStore::new(Rc::clone(&backend), DEFAULT_STORAGE_KEY);
        let second = PositionStore::new(Rc::clone(&backend), DEFAULT_STORAGE_KEY);
        first.save("a", StoredPosition::new("1px", "2px")).unwrap();
        second.save("b", StoredPosition::new("3px", "4px")).unwrap();
        assert_eq!(first.load_all().len(), 2);
        assert_eq!(backend.len(), 1);
    }
}
