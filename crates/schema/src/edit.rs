use thiserror::Error;

use crate::model::{Field, Product, Section};

/// Property edits accepted on a product.
/// 產品可編輯的屬性。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductEdit {
    Name(String),
    Description(String),
    Category(String),
}

impl ProductEdit {
    /// Maps an allow-listed property name (`name`, `description`, `category`) onto an edit.
    /// 將允許的屬性名稱對應為產品編輯指令。
    pub fn from_property(property: &str, value: impl Into<String>) -> Result<Self, EditError> {
        let value = value.into();
        match property {
            "name" => Ok(Self::Name(value)),
            "description" => Ok(Self::Description(value)),
            "category" => Ok(Self::Category(value)),
            other => Err(EditError::UnknownProperty {
                target: "product",
                property: other.to_string(),
            }),
        }
    }

    /// Assigns the new value to `product`.
    /// 將新值寫入產品。
    pub fn apply(self, product: &mut Product) {
        match self {
            Self::Name(value) => product.name = value,
            Self::Description(value) => product.description = value,
            Self::Category(value) => product.category = value,
        }
    }
}

/// Property edits accepted on a section.
/// 區段可編輯的屬性。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEdit {
    Title(String),
    Description(String),
}

impl SectionEdit {
    /// Maps a property name (`title`, `description`) to an edit.
    /// 將屬性名稱對應為編輯指令。
    pub fn from_property(property: &str, value: impl Into<String>) -> Result<Self, EditError> {
        let value = value.into();
        match property {
            "title" => Ok(Self::Title(value)),
            "description" => Ok(Self::Description(value)),
            other => Err(EditError::UnknownProperty {
                target: "section",
                property: other.to_string(),
            }),
        }
    }

    /// Assigns the new value to `section`.
    /// 將新值寫入區段。
    pub fn apply(self, section: &mut Section) {
        match self {
            Self::Title(value) => section.title = value,
            Self::Description(value) => section.description = value,
        }
    }
}

/// Property edits accepted on a field. `type` is fixed at creation.
/// 欄位可編輯的屬性；類型於建立後不可變更。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Label(String),
    Key(String),
    Description(String),
    Required(bool),
}

impl FieldEdit {
    /// `required` takes `true`/`false` (also `yes`/`no`, `on`/`off`, `1`/`0`).
    pub fn from_property(property: &str, value: impl Into<String>) -> Result<Self, EditError> {
        let value = value.into();
        match property {
            "label" => Ok(Self::Label(value)),
            "key" => Ok(Self::Key(value)),
            "description" => Ok(Self::Description(value)),
            "required" => parse_flag(&value).map(Self::Required),
            other => Err(EditError::UnknownProperty {
                target: "field",
                property: other.to_string(),
            }),
        }
    }

    /// Assigns the new value to `field`.
    /// 將新值寫入欄位。
    pub fn apply(self, field: &mut Field) {
        match self {
            Self::Label(value) => field.label = value,
            Self::Key(value) => field.key = value,
            Self::Description(value) => field.description = value,
            Self::Required(value) => field.required = value,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool, EditError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(EditError::InvalidFlag(value.to_string())),
    }
}

/// Errors raised while turning a property name/value pair into an edit.
/// 將屬性名稱與值轉換為編輯指令時的錯誤。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{target} has no editable property `{property}`")]
    UnknownProperty {
        target: &'static str,
        property: String,
    },
    #[error("`{0}` is not a boolean value")]
    InvalidFlag(String),
}
