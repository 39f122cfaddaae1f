use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::constants::PLAYED_FLAG_KEY;
use crate::error::FlagStoreError;

/// Persisted boolean flags, e.g. whether a player has already spun.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<bool>, FlagStoreError>;
    fn set(&self, key: &str, value: bool) -> Result<(), FlagStoreError>;
    fn remove(&self, key: &str) -> Result<(), FlagStoreError>;
}

impl<T: FlagStore + ?Sized> FlagStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<bool>, FlagStoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: bool) -> Result<(), FlagStoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), FlagStoreError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: Mutex<HashMap<String, bool>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<bool>, FlagStoreError> {
        let flags = self.flags.lock().map_err(|_| FlagStoreError("memory store poisoned".to_string()))?;
        Ok(flags.get(key).copied())
    }

    fn set(&self, key: &str, value: bool) -> Result<(), FlagStoreError> {
        let mut flags = self.flags.lock().map_err(|_| FlagStoreError("memory store poisoned".to_string()))?;
        flags.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), FlagStoreError> {
        let mut flags = self.flags.lock().map_err(|_| FlagStoreError("memory store poisoned".to_string()))?;
        flags.remove(key);
        Ok(())
    }
}

/// Key of one player's played flag when many players share a backing store.
pub fn player_flag_key(player_id: &str) -> String {
    format!("{}:{}", PLAYED_FLAG_KEY, player_id)
}
