use pdt_schema::{FieldType, Product, UNTITLED_PRODUCT};

use crate::drag::DragState;
use crate::selection::{Resolved, ViewMode};

/// One entry of the product list.
#[derive(Debug, Clone, Copy)]
pub struct ProductSummary<'a> {
    pub product: &'a Product,
    /// The entry is the editing product.
    pub is_active: bool,
}

/// Everything a renderer needs, derived fresh from the session.
/// 由工作階段即時推導、提供給畫面渲染的資料。
#[derive(Debug, Clone)]
pub struct ViewModel<'a> {
    pub mode: ViewMode,
    /// Products matching the list filter, in catalog order.
    pub products: Vec<ProductSummary<'a>>,
    pub editing: Resolved<'a>,
    pub drag: &'a DragState,
    /// Field kinds offered by the toolbox.
    pub palette: &'a [FieldType],
}

impl<'a> ViewModel<'a> {
    /// Text for the title bar.
    pub fn title(&self) -> &'a str {
        self.editing
            .product
            .map(|product| product.name.as_str())
            .unwrap_or(UNTITLED_PRODUCT)
    }

    /// The filter matched nothing.
    pub fn list_is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
