use pdt_schema::{
    FieldEdit, FieldId, FieldMove, FieldType, ProductDraft, ProductEdit, ProductId, SectionEdit,
    SectionId,
};

use crate::drag::{DragPayload, DropTarget};
use crate::selection::SelectionPatch;

/// Shown when a version snapshot is requested.
pub const SAVE_VERSION_NOTICE: &str = "Version snapshots will be available in a future release.";

/// User answer to a destructive prompt.
/// 使用者對破壞性操作確認提示的回覆。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Affirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(affirmed: bool) -> Self {
        if affirmed {
            Confirmation::Affirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// An intent produced by the view layer.
/// 由介面層產生、交由編輯器核心處理的指令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit of the "new product" form.
    CreateProduct(ProductDraft),
    /// Title-bar rename; blank names become `Untitled Product`.
    RenameProduct { product_id: ProductId, name: String },
    EditProduct {
        product_id: ProductId,
        edit: ProductEdit,
    },
    EditSection {
        section_id: SectionId,
        edit: SectionEdit,
    },
    EditField { field_id: FieldId, edit: FieldEdit },
    AddSection { product_id: ProductId },
    /// "Add Field" on a section card.
    AddField {
        section_id: SectionId,
        field_type: FieldType,
    },
    /// Palette click: add to the selected section, else the first one.
    AddFieldToSelection { field_type: FieldType },
    DeleteSection { section_id: SectionId },
    DeleteField { field_id: FieldId },
    DeleteProduct {
        product_id: ProductId,
        confirmation: Confirmation,
    },
    MoveField {
        field_id: FieldId,
        to_section: SectionId,
        before: Option<FieldId>,
    },
    Select(SelectionPatch),
    /// Highlight a product in the list without leaving the overview.
    SelectProduct { product_id: ProductId },
    /// Highlight a product and switch to the editor.
    OpenProduct { product_id: ProductId },
    BackToList,
    StartDrag(DragPayload),
    /// Release over `target`. `data` is the raw text slot of the drag event;
    /// when absent the payload from [`Command::StartDrag`] is used.
    Drop {
        target: DropTarget,
        data: Option<String>,
    },
    /// Drag ended without a drop.
    EndDrag,
    Save,
    SaveVersion,
}

/// Entity created by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    Product(ProductId),
    Section(SectionId),
    Field(FieldId),
}

/// Result of applying a command.
/// 套用指令後的結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to do: unknown ids, foreign drag payloads, no-op selections.
    Unchanged,
    /// State changed and was persisted.
    Updated,
    Created(Created),
    Moved(FieldMove),
    Deleted,
    /// A destructive command was not confirmed.
    Declined,
    Saved,
    /// Informational message for the user.
    Notice(String),
}

impl Outcome {
    /// Whether the document changed and must be written through.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Outcome::Updated | Outcome::Created(_) | Outcome::Moved(_) | Outcome::Deleted
        )
    }
}
