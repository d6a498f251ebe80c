//! Editor core for the Product Definition Tool.
//! 產品定義工具的編輯器核心：選取狀態、拖放引擎與指令處理。
//!
//! An [`EditorSession`] owns the [`EditorDocument`] and applies [`Command`]s
//! to it, writing each change through to the backing store. Renderers read a
//! [`ViewModel`] derived from the session and never mutate state directly.

mod command;
mod config;
mod document;
mod drag;
mod error;
mod selection;
mod session;
mod view;

pub use command::{Command, Confirmation, Created, Outcome, SAVE_VERSION_NOTICE};
pub use config::{ConfigError, EditorConfig, DEFAULT_STORAGE_KEY};
pub use document::{EditorDocument, LEGACY_EDITING_KEY};
pub use drag::{plan_drop, DragPayload, DragState, DropAction, DropTarget};
pub use error::SessionError;
pub use selection::{Resolved, Selection, SelectionPatch, ViewMode};
pub use session::EditorSession;
pub use view::{ProductSummary, ViewModel};
