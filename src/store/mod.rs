//! Document store over RocksDB
//!
//! JSON documents keyed by `{collection}/{id}`. Writes come in two shapes:
//! whole-document `put` and `merge`, which overlays the given fields and
//! preserves everything unspecified, recursing into nested objects.

use rocksdb::{Options, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::errors::StoreError;

pub fn user_key(user_id: &str) -> String {
    format!("users/{}", user_id)
}

pub fn game_key(game_id: &str) -> String {
    format!("games/{}", game_id)
}

pub fn payout_key(payout_id: &str) -> String {
    format!("payouts/{}", payout_id)
}

#[derive(Clone)]
pub struct DocumentStore {
    db: Arc<DB>,
}

impl DocumentStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(bytes) = self
            .db
            .get(key.as_bytes())
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?
        else {
            return Ok(None);
        };

        let doc = serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptedData {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(doc))
    }

    pub fn put<T: Serialize>(&self, key: &str, doc: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(doc).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        self.db
            .put(key.as_bytes(), bytes)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    /// Overlay `patch` onto the stored document, creating it if absent
    pub fn merge(&self, key: &str, patch: Value) -> Result<(), StoreError> {
        let mut doc = self
            .get::<Value>(key)?
            .unwrap_or_else(|| Value::Object(Default::default()));
        merge_value(&mut doc, patch);
        self.put(key, &doc)
    }
}

/// Recursive overlay: objects merge key-by-key, everything else is replaced
fn merge_value(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (k, v) in patch_map {
                match base_map.get_mut(&k) {
                    Some(existing) => merge_value(existing, v),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}
