//! Key/value document storage.
//!
//! Each document is a whole JSON snapshot; writers replace it entirely.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::Result;

/// Document key of the history log.
pub const HISTORY_KEY: &str = "history";
/// Document key of the owner-entered inputs.
pub const USER_INPUTS_KEY: &str = "user_inputs";

/// Best-effort document store.
pub trait PersistenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: &Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store for tests and for sessions without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        match self.documents.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.documents().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.documents().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.documents().remove(key);
        Ok(())
    }
}

impl<S: PersistenceStore + ?Sized> PersistenceStore for &S {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: PersistenceStore + ?Sized> PersistenceStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
