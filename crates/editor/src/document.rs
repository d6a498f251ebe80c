use pdt_schema::{
    starter_catalog, Catalog, FieldId, ProductId, SectionId, STARTER_FIELD_ID,
    STARTER_PRODUCT_ID, STARTER_SECTION_ID,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::selection::{Selection, ViewMode};

/// Top-level key written by older builds for the editing product.
pub const LEGACY_EDITING_KEY: &str = "editingProductId";

/// Everything the editor persists: the catalog, the selection and the view.
/// 編輯器需要持久化的完整狀態。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersistedDocument", into = "PersistedDocument")]
pub struct EditorDocument {
    pub catalog: Catalog,
    pub selection: Selection,
    pub view: ViewMode,
    /// Top-level keys this build does not know about, written back untouched.
    pub extra: Map<String, Value>,
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self {
            catalog: starter_catalog(),
            selection: Selection {
                product: Some(ProductId::new(STARTER_PRODUCT_ID)),
                section: Some(SectionId::new(STARTER_SECTION_ID)),
                field: Some(FieldId::new(STARTER_FIELD_ID)),
            },
            view: ViewMode::Overview,
            extra: Map::new(),
        }
    }
}

impl EditorDocument {
    /// Rewrites legacy top-level keys in a stored object before it is merged
    /// over the defaults.
    pub fn upgrade_stored(object: &mut Map<String, Value>) {
        if let Some(editing) = object.remove(LEGACY_EDITING_KEY) {
            object
                .entry("selectedProductId")
                .or_insert(editing);
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedDocument {
    #[serde(default)]
    products: Catalog,
    #[serde(default)]
    selected_product_id: Option<ProductId>,
    #[serde(default)]
    selected_section_id: Option<SectionId>,
    #[serde(default)]
    selected_field_id: Option<FieldId>,
    #[serde(default)]
    view: ViewMode,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<PersistedDocument> for EditorDocument {
    fn from(stored: PersistedDocument) -> Self {
        Self {
            catalog: stored.products,
            selection: Selection {
                product: stored.selected_product_id,
                section: stored.selected_section_id,
                field: stored.selected_field_id,
            },
            view: stored.view,
            extra: stored.extra,
        }
    }
}

impl From<EditorDocument> for PersistedDocument {
    fn from(document: EditorDocument) -> Self {
        Self {
            products: document.catalog,
            selected_product_id: document.selection.product,
            selected_section_id: document.selection.section,
            selected_field_id: document.selection.field,
            view: document.view,
            extra: document.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_document_serializes_to_flat_shape() {
        let value = serde_json::to_value(EditorDocument::default()).unwrap();
        assert_eq!(value["selectedProductId"], "prod-1");
        assert_eq!(value["selectedSectionId"], "section-1");
        assert_eq!(value["selectedFieldId"], "field-1");
        assert_eq!(value["view"], "overview");
        assert_eq!(value["products"][0]["sections"][0]["fields"][1]["type"], "Date");
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let mut value = serde_json::to_value(EditorDocument::default()).unwrap();
        value["theme"] = json!("dark");
        let document: EditorDocument = serde_json::from_value(value).unwrap();
        assert_eq!(document.extra.get("theme"), Some(&json!("dark")));
        let back = serde_json::to_value(&document).unwrap();
        assert_eq!(back["theme"], "dark");
    }

    #[test]
    fn legacy_editing_key_is_renamed() {
        let mut object = Map::new();
        object.insert(LEGACY_EDITING_KEY.into(), json!("prod-7"));
        EditorDocument::upgrade_stored(&mut object);
        assert_eq!(object.get("selectedProductId"), Some(&json!("prod-7")));
        assert!(!object.contains_key(LEGACY_EDITING_KEY));
    }
}
