//! Pluggable key-value storage and clock used by the session store

use crate::error::StoreError;
use rustc_hash::FxHashMap;
use std::cell::Cell;
use time::{Duration, OffsetDateTime};

/// String key-value storage, e.g. browser `localStorage`
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: FxHashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Source of timestamps
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that advances by a fixed step on every read
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: Cell<OffsetDateTime>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: OffsetDateTime, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> OffsetDateTime {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("a").unwrap(), None);
        storage.set("a", "1").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
        storage.remove("a").unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
        storage.remove("a").unwrap();
    }

    #[test]
    fn test_stepping_clock() {
        let clock = SteppingClock::new(datetime!(2024-01-01 0:00 UTC), Duration::seconds(5));
        let a = clock.now();
        let b = clock.now();
        assert_eq!(b - a, Duration::seconds(5));
    }
}
