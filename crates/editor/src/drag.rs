use pdt_schema::{FieldId, FieldType, SectionId};
use serde::Deserialize;
use serde_json::json;

/// What is being dragged.
/// 拖曳中的內容：工具箱的新欄位或既有欄位。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// A palette entry; dropping creates a new field of this type.
    Insert { field_type: FieldType },
    /// An existing field row picked up from `section_id`.
    Move {
        field_id: FieldId,
        section_id: SectionId,
    },
}

// Exactly one of the two shapes is accepted; anything else is foreign.
#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct WirePayload {
    #[serde(rename = "type")]
    field_type: Option<String>,
    field_id: Option<String>,
    section_id: Option<String>,
}

impl DragPayload {
    /// Payload of a palette entry.
    /// 工具箱項目的拖曳內容。
    pub fn insert(field_type: FieldType) -> Self {
        Self::Insert { field_type }
    }

    /// Payload of an existing field row.
    /// 既有欄位列的拖曳內容。
    pub fn move_field(field_id: FieldId, section_id: SectionId) -> Self {
        Self::Move {
            field_id,
            section_id,
        }
    }

    /// Parses the text carried by a drag event: `{"type": ..}` or
    /// `{"fieldId": .., "sectionId": ..}`. Returns `None` for anything else.
    /// 解析拖曳事件攜帶的文字；格式不符時回傳 `None`。
    pub fn parse(data: &str) -> Option<Self> {
        let wire: WirePayload = serde_json::from_str(data).ok()?;
        match (wire.field_type, wire.field_id, wire.section_id) {
            (Some(field_type), None, None) if !field_type.is_empty() => Some(Self::Insert {
                field_type: FieldType::new(field_type),
            }),
            (None, Some(field_id), Some(section_id)) => Some(Self::Move {
                field_id: FieldId::new(field_id),
                section_id: SectionId::new(section_id),
            }),
            _ => None,
        }
    }

    /// Encodes the payload in the same two-shape wire format.
    pub fn encode(&self) -> String {
        let value = match self {
            Self::Insert { field_type } => json!({ "type": field_type }),
            Self::Move {
                field_id,
                section_id,
            } => json!({ "fieldId": field_id, "sectionId": section_id }),
        };
        value.to_string()
    }
}

/// Where a payload is released.
/// 放置目標：整個區段容器或某一欄位列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The section container itself (not a specific row).
    Section(SectionId),
    /// A field row; drops land immediately before it.
    Row {
        section_id: SectionId,
        field_id: FieldId,
    },
}

impl DropTarget {
    /// Section receiving the drop.
    /// 接收放置的區段。
    pub fn section_id(&self) -> &SectionId {
        match self {
            DropTarget::Section(section_id) => section_id,
            DropTarget::Row { section_id, .. } => section_id,
        }
    }

    fn anchor(&self) -> Option<&FieldId> {
        match self {
            DropTarget::Section(_) => None,
            DropTarget::Row { field_id, .. } => Some(field_id),
        }
    }
}

/// Drag gesture state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragPayload),
}

impl DragState {
    /// Returns `true` while a payload is held.
    /// 拖曳進行中時回傳 `true`。
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }
}

/// Tree operation a drop resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    Insert {
        section_id: SectionId,
        before: Option<FieldId>,
        field_type: FieldType,
    },
    Move {
        field_id: FieldId,
        from_section: SectionId,
        to_section: SectionId,
        before: Option<FieldId>,
    },
}

/// Maps a payload and a target onto the tree operation to run.
/// 將拖曳內容與放置目標對應為樹狀操作。
pub fn plan_drop(payload: DragPayload, target: &DropTarget) -> DropAction {
    let before = target.anchor().cloned();
    let section_id = target.section_id().clone();
    match payload {
        DragPayload::Insert { field_type } => DropAction::Insert {
            section_id,
            before,
            field_type,
        },
        DragPayload::Move {
            field_id,
            section_id: from_section,
        } => DropAction::Move {
            field_id,
            from_section,
            to_section: section_id,
            before,
        },
    }
}
