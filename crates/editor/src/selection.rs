use pdt_schema::{Catalog, Field, FieldId, Product, ProductId, Section, SectionId};
use serde::{Deserialize, Deserializer, Serialize};

/// Which top-level screen is shown.
/// 目前顯示的畫面：產品清單或編輯工作區。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Overview,
    Editor,
}

impl ViewMode {
    /// Persisted name of the mode.
    /// 畫面模式的儲存名稱。
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Overview => "overview",
            ViewMode::Editor => "editor",
        }
    }
}

// `null` and unknown names read as the default so older documents stay loadable.
impl<'de> Deserialize<'de> for ViewMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("editor") => ViewMode::Editor,
            _ => ViewMode::Overview,
        })
    }
}

/// The editing product plus the focused section and field.
/// 目前編輯中的產品與選取的區段、欄位。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub product: Option<ProductId>,
    pub section: Option<SectionId>,
    pub field: Option<FieldId>,
}

/// Partial update of a [`Selection`].
///
/// Each key is tri-state: `None` leaves the current value alone,
/// `Some(None)` clears it and `Some(Some(id))` replaces it.
/// 選取狀態的部分更新；未指定的鍵保持不變，明確的 `None` 會清除。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPatch {
    pub product: Option<Option<ProductId>>,
    pub section: Option<Option<SectionId>>,
    pub field: Option<Option<FieldId>>,
}

impl SelectionPatch {
    /// Empty patch; leaves every key alone.
    /// 空白的更新，不變更任何鍵。
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears the product key.
    /// 設定或清除產品鍵。
    pub fn product(mut self, id: Option<ProductId>) -> Self {
        self.product = Some(id);
        self
    }

    /// Sets or clears the section key.
    /// 設定或清除區段鍵。
    pub fn section(mut self, id: Option<SectionId>) -> Self {
        self.section = Some(id);
        self
    }

    /// Sets or clears the field key.
    /// 設定或清除欄位鍵。
    pub fn field(mut self, id: Option<FieldId>) -> Self {
        self.field = Some(id);
        self
    }

    /// Returns `true` when no key is specified.
    /// 未指定任何鍵時回傳 `true`。
    pub fn is_empty(&self) -> bool {
        self.product.is_none() && self.section.is_none() && self.field.is_none()
    }
}

/// Objects the selection currently points at, looked up by id.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolved<'a> {
    pub product: Option<&'a Product>,
    pub section: Option<&'a Section>,
    pub field: Option<&'a Field>,
}

impl Selection {
    /// Selection after switching to `product`: its first section and that
    /// section's first field, or nothing when the product is empty.
    pub fn focus(product: &Product) -> Self {
        let section = product.first_section();
        Self {
            product: Some(product.id.clone()),
            section: section.map(|section| section.id.clone()),
            field: section.and_then(|section| section.first_field_id().cloned()),
        }
    }

    /// Applies only the keys present in `patch`.
    pub fn merge(&mut self, patch: SelectionPatch) {
        if let Some(product) = patch.product {
            self.product = product;
        }
        if let Some(section) = patch.section {
            self.section = section;
        }
        if let Some(field) = patch.field {
            self.field = field;
        }
    }

    /// Walks the ids top-down through `catalog`. A level that does not resolve
    /// leaves every level below it empty.
    /// 由上而下依識別碼解析出實際物件。
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Resolved<'a> {
        let product = self.product.as_ref().and_then(|id| catalog.product(id));
        let section = product.and_then(|product| {
            self.section
                .as_ref()
                .and_then(|id| product.section(id))
        });
        let field = section.and_then(|section| self.field.as_ref().and_then(|id| section.field(id)));
        Resolved {
            product,
            section,
            field,
        }
    }

    /// Drops every key that no longer resolves under its parent. Returns
    /// `true` when something was cleared.
    pub fn repair(&mut self, catalog: &Catalog) -> bool {
        let resolved = self.resolve(catalog);
        let repaired = Selection {
            product: resolved.product.map(|product| product.id.clone()),
            section: resolved.section.map(|section| section.id.clone()),
            field: resolved.field.map(|field| field.id.clone()),
        };
        if repaired == *self {
            return false;
        }
        *self = repaired;
        true
    }
}
