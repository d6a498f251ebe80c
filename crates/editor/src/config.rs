use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pdt_schema::FieldType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "pdt.v1";

const DEFAULT_PALETTE: [&str; 8] = [
    "Text", "Number", "Date", "Email", "Phone", "Dropdown", "Checkbox", "TextArea",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read editor config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse editor config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize editor config {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write editor config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Editor settings injected into a session at construction.
/// 建立編輯工作階段時注入的設定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Key the whole document is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Field kinds offered by the toolbox, in display order.
    #[serde(default = "default_palette")]
    pub palette: Vec<FieldType>,
    /// Kind used by "Add Field" when none is picked.
    #[serde(default = "default_field_type")]
    pub default_field_type: FieldType,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_palette() -> Vec<FieldType> {
    DEFAULT_PALETTE.iter().copied().map(FieldType::new).collect()
}

fn default_field_type() -> FieldType {
    FieldType::text()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            palette: default_palette(),
            default_field_type: default_field_type(),
        }
    }
}

impl EditorConfig {
    /// Replaces the storage key; a blank key keeps the default.
    /// 替換儲存鍵；空白鍵沿用預設值。
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self.sanitize();
        self
    }

    /// Restores defaults for blank values and drops empty or duplicate palette entries.
    /// 空白值還原為預設，並移除工具箱中空白或重複的類型。
    pub fn sanitize(&mut self) {
        if self.storage_key.trim().is_empty() {
            self.storage_key = default_storage_key();
        }
        self.palette.retain(|kind| !kind.as_str().trim().is_empty());
        let mut seen = Vec::with_capacity(self.palette.len());
        self.palette.retain(|kind| {
            if seen.contains(kind) {
                false
            } else {
                seen.push(kind.clone());
                true
            }
        });
        if self.palette.is_empty() {
            self.palette = default_palette();
        }
        if self.default_field_type.as_str().trim().is_empty() {
            self.default_field_type = default_field_type();
        }
    }

    /// Reads the config at `path`; a missing file yields the defaults.
    /// 讀取設定檔；檔案不存在時使用預設值。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: EditorConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.sanitize();
        Ok(config)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    /// 以格式化 JSON 寫入設定檔並建立上層目錄。
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload =
            serde_json::to_string_pretty(self).map_err(|source| ConfigError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, payload).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = EditorConfig::load(dir.path().join("config.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.storage_key, "pdt.v1");
        assert_eq!(config.palette.len(), 8);
    }

    #[test]
    fn partial_file_is_sanitized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "storage_key": " ", "palette": ["Text", "", "Text", "Currency"] }"#,
        )
        .unwrap();
        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(
            config.palette,
            vec![FieldType::text(), FieldType::new("Currency")]
        );
        assert_eq!(config.default_field_type, FieldType::text());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = EditorConfig::default().with_storage_key("pdt.test");
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(
            EditorConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
