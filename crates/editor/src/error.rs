use pdt_store::StoreError;
use thiserror::Error;

/// Errors surfaced by an [`EditorSession`](crate::EditorSession). Only the
/// persistence medium can fail; every editing path degrades to a no-op.
/// 編輯工作階段的錯誤；僅持久化媒介可能失敗。
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("document store failure: {0}")]
    Store(#[from] StoreError),
}
