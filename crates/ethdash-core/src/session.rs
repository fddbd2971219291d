//! Persistence of the last connected address.
//!
//! The address lives in browser localStorage under
//! [`CACHED_ADDRESS_KEY`](crate::config::CACHED_ADDRESS_KEY) so a reload can
//! restore the connection without a wallet prompt.

use alloy_primitives::Address;

use crate::account::{checksummed, parse_address};
use crate::config::CACHED_ADDRESS_KEY;
use crate::error::StorageError;

/// String key/value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Browser localStorage.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()
            .ok_or(StorageError::Unavailable)?
            .set_item(key, value)
            .map_err(|_| StorageError::WriteFailed)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()
            .ok_or(StorageError::Unavailable)?
            .remove_item(key)
            .map_err(|_| StorageError::RemoveFailed)
    }
}

/// The cached-address entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddressCache<S> {
    store: S,
}

impl<S: KeyValueStore> AddressCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The cached address, if one is stored and still parses.
    pub fn load(&self) -> Option<Address> {
        let raw = self.store.get(CACHED_ADDRESS_KEY)?;
        parse_address(&raw).ok()
    }

    pub fn save(&self, address: &Address) -> Result<(), StorageError> {
        self.store.set(CACHED_ADDRESS_KEY, &checksummed(address))
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(CACHED_ADDRESS_KEY)
    }
}
