#![forbid(unsafe_code)]

//! `window.localStorage` as a [`KeyValueStore`].

use dragkit_core::{KeyValueStore, StoreError};
use web_sys::Storage;

/// Browser `localStorage`, looked up on every access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<Storage, StoreError> {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or_else(|| StoreError::Unavailable("localStorage is not available".to_owned()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|err| StoreError::Unavailable(format!("{err:?}")))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Quota errors surface here.
        Self::storage()?
            .set_item(key, value)
            .map_err(|err| StoreError::Unavailable(format!("{err:?}")))
    }
}
