//! In-memory history and inputs, written behind to a [`PersistenceStore`].
//!
//! Memory is authoritative for the session. Storage failures are logged and
//! never reach the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::history::{export_json, HistoryLog, UpsertOutcome};
use crate::store::{PersistenceStore, HISTORY_KEY, USER_INPUTS_KEY};
use crate::types::{HistoryPatch, UserInputs};

pub struct Repository<S> {
    store: S,
    history: HistoryLog,
    user_inputs: UserInputs,
}

impl<S: PersistenceStore> Repository<S> {
    /// Read both documents. Missing or unreadable documents start empty.
    pub fn load(store: S) -> Self {
        let history = load_document::<HistoryLog>(&store, HISTORY_KEY).unwrap_or_default();
        let user_inputs = load_document::<UserInputs>(&store, USER_INPUTS_KEY).unwrap_or_default();

        tracing::debug!(entries = history.len(), "Repository loaded");

        Self {
            store,
            history,
            user_inputs,
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Merge a patch into the log, then persist the whole log.
    pub fn upsert(&mut self, patch: HistoryPatch) -> UpsertOutcome {
        let date = patch.date;
        let outcome = self.history.upsert(patch);
        tracing::info!(%date, ?outcome, "History updated");
        self.persist_history();
        outcome
    }

    /// Drop every record and the stored document. Callers confirm with the
    /// owner first.
    pub fn clear_history(&mut self) {
        let removed = self.history.len();
        self.history.clear();
        tracing::info!(removed, "History cleared");
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            tracing::warn!(key = HISTORY_KEY, error = %e, "Failed to remove document");
        }
    }

    pub fn user_inputs(&self) -> &UserInputs {
        &self.user_inputs
    }

    pub fn set_user_inputs(&mut self, inputs: UserInputs) {
        self.user_inputs = inputs;
        write_document(&self.store, USER_INPUTS_KEY, &self.user_inputs);
    }

    /// Pretty-printed JSON array of the log.
    pub fn export_json(&self) -> crate::error::Result<String> {
        export_json(&self.history)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist_history(&self) {
        write_document(&self.store, HISTORY_KEY, &self.history);
    }
}

fn load_document<T: DeserializeOwned>(store: &impl PersistenceStore, key: &str) -> Option<T> {
    let value = match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read document, starting empty");
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(key, error = %e, "Malformed document, starting empty");
            None
        }
    }
}

fn write_document<T: Serialize>(store: &impl PersistenceStore, key: &str, doc: &T) {
    let result = serde_json::to_value(doc)
        .map_err(crate::error::Error::from)
        .and_then(|value| store.set(key, &value));

    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Failed to persist document");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::store::MemoryStore;
    use crate::types::GlucoseLevel;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::{json, Value};

    /// Store whose every operation fails.
    struct BrokenStore;

    impl PersistenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(Error::Config("store offline".to_string()))
        }

        fn set(&self, _key: &str, _value: &Value) -> Result<()> {
            Err(Error::Config("store offline".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Config("store offline".to_string()))
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_cold_start_is_empty() {
        let repo = Repository::load(MemoryStore::new());
        assert!(repo.history().is_empty());
        assert_eq!(repo.user_inputs(), &UserInputs::default());
    }

    #[test]
    fn test_upsert_writes_behind() {
        let mut repo = Repository::load(MemoryStore::new());
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        repo.upsert(HistoryPatch::ph(day("2025-01-01"), ts, Some(7)));

        let stored = repo.store().get(HISTORY_KEY).unwrap().unwrap();
        assert_eq!(stored[0]["ph"], 7);
        assert_eq!(stored[0]["date"], "2025-01-01");
    }

    #[test]
    fn test_reload_restores_state() {
        let store = MemoryStore::new();
        {
            let mut repo = Repository::load(&store);
            let ts = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
            repo.upsert(HistoryPatch::ph(day("2025-01-01"), ts, None));
            repo.set_user_inputs(UserInputs {
                water_intake_ml: 250,
                ..Default::default()
            });
        }

        let repo = Repository::load(&store);
        assert_eq!(repo.history().len(), 1);
        assert_eq!(repo.history().entries()[0].ph, Some(None));
        assert_eq!(repo.user_inputs().water_intake_ml, 250);
    }

    #[test]
    fn test_persistence_failures_are_swallowed() {
        let mut repo = Repository::load(BrokenStore);
        let ts = Utc::now();
        repo.upsert(HistoryPatch::ph(day("2025-01-01"), ts, Some(6)));
        repo.set_user_inputs(UserInputs::default());
        repo.clear_history();
        assert!(repo.history().is_empty());
    }

    #[test]
    fn test_memory_stays_authoritative_when_writes_fail() {
        let mut repo = Repository::load(BrokenStore);
        let ts = Utc::now();
        repo.upsert(HistoryPatch::ph(day("2025-01-01"), ts, Some(6)));
        assert_eq!(repo.history().len(), 1);
        assert_eq!(repo.history().entries()[0].ph_value(), Some(6));
    }

    #[test]
    fn test_malformed_document_starts_empty() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, &json!({"not": "an array"})).unwrap();
        store
            .set(USER_INPUTS_KEY, &json!({"waterIntakeMl": "lots"}))
            .unwrap();

        let repo = Repository::load(&store);
        assert!(repo.history().is_empty());
        assert_eq!(repo.user_inputs(), &UserInputs::default());
    }

    #[test]
    fn test_out_of_range_ph_document_starts_empty() {
        let store = MemoryStore::new();
        store
            .set(
                HISTORY_KEY,
                &json!([{"date": "2025-01-01", "timestamp": "2025-01-01T08:00:00Z", "ph": 42}]),
            )
            .unwrap();

        let repo = Repository::load(&store);
        assert!(repo.history().is_empty());
    }

    #[test]
    fn test_loaded_document_is_normalized() {
        let store = MemoryStore::new();
        store
            .set(
                HISTORY_KEY,
                &json!([
                    {"date": "2025-01-02", "timestamp": "2025-01-02T08:00:00Z", "level": 0},
                    {"date": "2025-01-01", "timestamp": "2025-01-01T08:00:00Z", "ph": 7},
                    {"date": "2025-01-01", "timestamp": "2025-01-01T09:00:00Z", "level": 2}
                ]),
            )
            .unwrap();

        let repo = Repository::load(&store);
        let entries = repo.history().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, day("2025-01-01"));
        assert_eq!(entries[0].ph_value(), Some(7));
        assert_eq!(entries[0].level, Some(GlucoseLevel::Suspect));
    }

    #[test]
    fn test_clear_history_removes_document() {
        let store = MemoryStore::new();
        let mut repo = Repository::load(&store);
        repo.upsert(HistoryPatch::ph(day("2025-01-01"), Utc::now(), Some(7)));
        repo.set_user_inputs(UserInputs {
            water_intake_ml: 100,
            ..Default::default()
        });
        repo.clear_history();

        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
        assert!(store.get(USER_INPUTS_KEY).unwrap().is_some());
        assert_eq!(repo.export_json().unwrap(), "[]");

        // Cold start after a clear
        assert!(Repository::load(&store).history().is_empty());
    }
}
