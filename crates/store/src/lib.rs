//! Key-value persistence for the Product Definition Tool.
//! 產品定義工具的鍵值持久化層。
//!
//! The medium is abstracted as a [`BlobStore`]: a string blob per key.
//! [`DocumentStore`] serializes a whole document into one blob and reads it
//! back by merging the stored top-level keys over the document's defaults.

mod blob;
mod document;
mod error;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use document::{merge_over_defaults, DocumentStore, LoadSource, Loaded};
pub use error::{StoreError, StoreResult};
