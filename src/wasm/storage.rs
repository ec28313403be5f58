//! Browser `localStorage` as a session storage backend

use crate::error::StoreError;
use crate::session::StorageBackend;
use wasm_bindgen::JsValue;

/// Write-through wrapper over `window.localStorage`
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Acquire the window's local storage
    pub fn open() -> Result<Self, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Storage("no window".to_string()))?;
        let inner = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StoreError::Storage("localStorage is disabled".to_string()))?;
        Ok(Self { inner })
    }
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove_item(key).map_err(js_error)
    }
}

fn js_error(value: JsValue) -> StoreError {
    StoreError::Storage(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}
