use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::blob::BlobStore;
use crate::error::{StoreError, StoreResult};

/// Where a loaded document came from.
/// 已載入文件的來源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The stored blob, merged over defaults.
    Stored,
    /// Nothing stored yet; built-in default.
    Missing,
    /// The stored blob was unreadable; built-in default substituted.
    Recovered,
}

/// A document plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub source: LoadSource,
}

impl<T> Loaded<T> {
    fn new(value: T, source: LoadSource) -> Self {
        Self { value, source }
    }
}

/// Persists a whole document as one JSON blob under a fixed key.
/// 將整份文件以單一 JSON 資料存放於固定鍵下。
#[derive(Debug)]
pub struct DocumentStore<S> {
    blobs: S,
    key: String,
}

impl<S: BlobStore> DocumentStore<S> {
    /// Binds a store to the blob medium and the document key.
    /// 建立綁定儲存媒介與文件鍵的文件儲存器。
    pub fn new(blobs: S, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
        }
    }

    /// Key the document is stored under.
    /// 文件存放的鍵。
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrows the underlying medium.
    /// 取得底層儲存媒介。
    pub fn blobs(&self) -> &S {
        &self.blobs
    }

    /// Gives the underlying medium back.
    /// 交還底層儲存媒介。
    pub fn into_blobs(self) -> S {
        self.blobs
    }

    /// Loads the document, merging stored top-level keys over `T::default()`.
    ///
    /// Absent, malformed, non-object or ill-shaped payloads yield the default
    /// document; only a failing medium surfaces as an error.
    /// 載入文件；內容缺漏或損毀時改用預設文件。
    pub fn load<T>(&self) -> StoreResult<Loaded<T>>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        self.load_with(|_| {})
    }

    /// Like [`DocumentStore::load`], but lets `upgrade` rewrite the stored
    /// top-level object (e.g. rename legacy keys) before it is merged.
    pub fn load_with<T, F>(&self, upgrade: F) -> StoreResult<Loaded<T>>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut Map<String, Value>),
    {
        let Some(raw) = self.blobs.get(&self.key)? else {
            debug!(key = %self.key, "no stored document, using defaults");
            return Ok(Loaded::new(T::default(), LoadSource::Missing));
        };

        let mut stored: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored document is not valid JSON");
                return Ok(Loaded::new(T::default(), LoadSource::Recovered));
            }
        };

        if let Value::Object(object) = &mut stored {
            upgrade(object);
        }

        let defaults = serde_json::to_value(T::default()).map_err(|source| {
            StoreError::Serialize {
                key: self.key.clone(),
                source,
            }
        })?;
        let Some(merged) = merge_over_defaults(defaults, stored) else {
            warn!(key = %self.key, "stored document is not a JSON object");
            return Ok(Loaded::new(T::default(), LoadSource::Recovered));
        };

        match serde_json::from_value(merged) {
            Ok(value) => Ok(Loaded::new(value, LoadSource::Stored)),
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored document has an unexpected shape");
                Ok(Loaded::new(T::default(), LoadSource::Recovered))
            }
        }
    }

    /// Serializes `document` and replaces the stored blob.
    pub fn save<T: Serialize>(&mut self, document: &T) -> StoreResult<()> {
        let payload = serde_json::to_string(document).map_err(|source| StoreError::Serialize {
            key: self.key.clone(),
            source,
        })?;
        self.blobs.set(&self.key, &payload)?;
        debug!(key = %self.key, bytes = payload.len(), "document saved");
        Ok(())
    }
}

/// Shallow merge: every top-level key of `stored` replaces the one in
/// `defaults`; keys only present in `defaults` survive. Returns `None` when
/// either side is not a JSON object.
/// 淺層合併：儲存值覆蓋預設值中的同名頂層鍵。
pub fn merge_over_defaults(defaults: Value, stored: Value) -> Option<Value> {
    match (defaults, stored) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            base.extend(overlay);
            Some(Value::Object(base))
        }
        _ => None,
    }
}
