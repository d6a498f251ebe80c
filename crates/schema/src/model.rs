use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_CATEGORY, DEFAULT_SECTION_TITLE, DEFAULT_STATUS, NEW_SECTION_DESCRIPTION,
    UNTITLED_PRODUCT,
};
use crate::ids::{FieldId, ProductId, SectionId};

/// Kind of data a field collects. The set is open: the palette decides which
/// kinds are offered, the model only stores the name.
/// 欄位類型；實際可用的種類由工具箱決定。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldType(String);

impl FieldType {
    /// Wraps a kind name as shown in the palette.
    /// 以工具箱顯示的名稱建立欄位類型。
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The `Text` kind.
    /// `Text` 類型。
    pub fn text() -> Self {
        Self::new("Text")
    }

    /// The `Date` kind.
    /// `Date` 類型。
    pub fn date() -> Self {
        Self::new("Date")
    }

    /// Borrows the kind name.
    /// 取得類型名稱。
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default machine key for the field at 1-based `position` (`text3`).
    pub fn default_key(&self, position: usize) -> String {
        format!("{}{}", self.0.to_lowercase(), position)
    }

    /// Default display label (`Text Field`).
    pub fn default_label(&self) -> String {
        format!("{} Field", self.0)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A single typed data-entry definition.
/// 單一資料輸入欄位定義。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl Field {
    /// Builds a fresh field of `field_type` that will sit at 1-based `position`.
    pub fn fresh(field_type: FieldType, position: usize) -> Self {
        Self {
            id: FieldId::generate(),
            label: field_type.default_label(),
            key: field_type.default_key(position),
            field_type,
            description: String::new(),
            required: false,
        }
    }
}

/// Named, ordered grouping of fields.
/// 具名且有序的欄位群組。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Section {
    /// Creates an empty section with a fresh id.
    /// 以新的識別碼建立空白區段。
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: SectionId::generate(),
            title: title.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    /// Looks up a field of this section.
    /// 查找此區段內的欄位。
    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| &field.id == id)
    }

    /// Position of a field in this section.
    /// 欄位在此區段中的位置。
    pub fn field_index(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|field| &field.id == id)
    }

    /// Id of the topmost field, if any.
    /// 最上方欄位的識別碼（若有）。
    pub fn first_field_id(&self) -> Option<&FieldId> {
        self.fields.first().map(|field| &field.id)
    }
}

/// Top-level schema definition.
/// 最上層的產品結構定義。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Product {
    /// Looks up a section of this product.
    /// 查找此產品內的區段。
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|section| &section.id == id)
    }

    /// Mutable lookup of a section of this product.
    /// 以可變參考查找此產品內的區段。
    pub fn section_mut(&mut self, id: &SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| &section.id == id)
    }

    /// Topmost section, if any.
    /// 最上方的區段（若有）。
    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    /// Section that currently owns `field_id`.
    pub fn section_of_field(&self, field_id: &FieldId) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.field(field_id).is_some())
    }

    /// Total number of fields across all sections.
    /// 所有區段的欄位總數。
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|section| section.fields.len()).sum()
    }
}

/// Values typed into the "new product" form before the product exists.
/// 建立新產品前在表單中輸入的草稿資料。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category: String,
}

impl ProductDraft {
    /// Collects the form values; trimming and fallbacks happen on creation.
    /// 收集表單輸入；修剪與預設值於建立時處理。
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
        }
    }

    pub(crate) fn build(self) -> Product {
        Product {
            id: ProductId::generate(),
            name: or_fallback(&self.name, UNTITLED_PRODUCT),
            description: self.description.trim().to_string(),
            category: or_fallback(&self.category, DEFAULT_CATEGORY),
            status: DEFAULT_STATUS.to_string(),
            sections: vec![Section::new(DEFAULT_SECTION_TITLE, NEW_SECTION_DESCRIPTION)],
        }
    }
}

/// Trims `value`, substituting `fallback` when nothing is left.
pub(crate) fn or_fallback(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
