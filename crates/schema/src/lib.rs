//! Product schema tree for the Product Definition Tool.
//! 產品定義工具的結構樹模型：產品、區段與欄位。
//!
//! A [`Catalog`] owns an ordered list of [`Product`]s, each product owns an
//! ordered list of [`Section`]s and each section owns an ordered list of
//! [`Field`]s. Every mutation is total: an id that no longer resolves turns
//! the call into a no-op instead of an error.

mod catalog;
mod defaults;
mod edit;
mod ids;
mod model;

pub use catalog::{Catalog, FieldLocation, FieldMove, RemovedSection};
pub use defaults::{
    starter_catalog, DEFAULT_CATEGORY, DEFAULT_SECTION_TITLE, DEFAULT_STATUS, STARTER_FIELD_ID,
    STARTER_PRODUCT_ID, STARTER_SECTION_ID, UNTITLED_PRODUCT,
};
pub use edit::{EditError, FieldEdit, ProductEdit, SectionEdit};
pub use ids::{FieldId, ProductId, SectionId};
pub use model::{Field, FieldType, Product, ProductDraft, Section};
