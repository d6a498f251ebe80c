use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use base64::Engine;

use crate::error::{StoreError, StoreResult};

/// Opaque get/set-by-key blob medium.
/// 以鍵存取字串資料的不透明儲存媒介。
pub trait BlobStore {
    /// Returns the blob stored under `key`, or `Ok(None)` when absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replaces the blob stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-process store, used for embedding and tests.
/// 記憶體內的儲存實作。
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    entries: HashMap<String, String>,
}

impl MemoryBlobStore {
    /// Creates an empty in-memory store.
    /// 建立空白的記憶體儲存區。
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one blob.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    /// Number of stored blobs.
    /// 已儲存的資料筆數。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been stored yet.
    /// 尚未儲存任何資料時回傳 `true`。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a root directory, written atomically.
/// 每個鍵對應根目錄下的一個檔案，並以原子方式寫入。
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Constructs a store rooted at `root`; the directory is created on first write.
    /// 建立以 `root` 為根目錄的儲存區；目錄於首次寫入時建立。
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the directory holding the blobs.
    /// 取得存放資料的目錄。
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`. Keys are base64url-encoded so any string is a
    /// valid, collision-free file name.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.json", BASE64.encode(key.as_bytes())))
    }
}

impl BlobStore for FileBlobStore {
    /// Reads the blob for `key`. Bytes that are not UTF-8 are decoded lossily
    /// so the document layer sees them as malformed JSON, not as a failing medium.
    /// 讀取鍵對應的資料；非 UTF-8 內容以替代字元解碼，交由文件層視為損毀資料。
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::CreateDir {
            path: self.root.clone(),
            source,
        })?;
        write_atomic(&self.path_for(key), value.as_bytes())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> StoreResult<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).map_err(|source| StoreError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trips_and_reports_missing() {
        let dir = tempdir().unwrap();
        let mut store = FileBlobStore::new(dir.path().join("store"));
        assert!(store.get("pdt.v1").unwrap().is_none());

        store.set("pdt.v1", "{\"products\":[]}").unwrap();
        assert_eq!(
            store.get("pdt.v1").unwrap().as_deref(),
            Some("{\"products\":[]}")
        );
        assert!(!store.path_for("pdt.v1").with_extension("tmp").exists());
    }

    #[test]
    fn keys_with_separators_stay_inside_root() {
        let dir = tempdir().unwrap();
        let store = FileBlobStore::new(dir.path());
        let path = store.path_for("../escape/key");
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryBlobStore::with_entry("k", "one");
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
    }
}
