//! Key-value storage for persisted configuration
//!
//! Keys are path-like strings (`/ledEffects/effect0.json`). Values are whole
//! byte blobs; there is no partial read or append.

use alloc::{collections::BTreeMap, string::String, vec, vec::Vec};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("key not found")]
    NotFound,
    #[error("value of {len} bytes exceeds {max} bytes")]
    Oversized { len: usize, max: usize },
    #[error("storage medium unavailable")]
    Unavailable,
}

/// Persistent configuration medium (flash filesystem, NVS, host map...)
pub trait ConfigStore {
    /// Read the whole value of `key` into `buf`, returning its length
    ///
    /// Fails with [`StoreError::Oversized`] when the value does not fit.
    fn read(&self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError>;

    /// Replace the value of `key`
    fn write(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete `key`
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`
    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Read the whole value of `key`, refusing values above `max_len` bytes
    fn read_value(&self, key: &str, max_len: usize) -> Result<Vec<u8>, StoreError> {
        let mut buf = vec![0; max_len];
        let len = self.read(key, &mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }
}

/// Heap-backed store for hosts and tests
///
/// Can be switched unavailable to simulate a missing medium.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
    available: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            available: true,
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Raw value of `key`, bypassing availability
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Insert a raw value, bypassing availability
    pub fn insert(&mut self, key: &str, value: impl Into<Vec<u8>>) {
        self.entries.insert(String::from(key), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

impl ConfigStore for MemoryStore {
    fn read(&self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.check_available()?;
        let value = self.entries.get(key).ok_or(StoreError::NotFound)?;
        let max = buf.len();
        let target = buf.get_mut(..value.len()).ok_or(StoreError::Oversized {
            len: value.len(),
            max,
        })?;
        target.copy_from_slice(value);
        Ok(value.len())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.insert(String::from(key), Vec::from(value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries
            .remove(key)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        Ok(self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
