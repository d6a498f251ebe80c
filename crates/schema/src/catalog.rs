use serde::{Deserialize, Serialize};

use crate::defaults::UNTITLED_PRODUCT;
use crate::edit::{FieldEdit, ProductEdit, SectionEdit};
use crate::ids::{FieldId, ProductId, SectionId};
use crate::model::{or_fallback, Field, FieldType, Product, ProductDraft, Section};

/// Ordered collection of products; the root of the schema tree.
/// 產品目錄，即結構樹的根。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

/// Position of a field inside the tree.
/// 欄位在樹中的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLocation {
    pub product_id: ProductId,
    pub section_id: SectionId,
    pub index: usize,
}

/// A section taken out of its product, with the slot it used to occupy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSection {
    pub product_id: ProductId,
    pub index: usize,
    pub section: Section,
}

/// Describes a completed field move.
/// 記錄一次完成的欄位移動。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMove {
    pub field_id: FieldId,
    pub from_section: SectionId,
    pub from_index: usize,
    pub to_section: SectionId,
    pub to_index: usize,
}

impl Catalog {
    /// Creates an empty catalog.
    /// 建立空白的產品目錄。
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing, ordered product list.
    /// 以既有且有序的產品清單建立目錄。
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Products in display order.
    /// 依顯示順序排列的產品。
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    /// 產品數量。
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns `true` when the catalog holds no product.
    /// 目錄中沒有任何產品時回傳 `true`。
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a product by id.
    /// 依識別碼查找產品。
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    fn product_mut(&mut self, id: &ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|product| &product.id == id)
    }

    /// Position of a product in the catalog.
    /// 產品在目錄中的位置。
    pub fn product_index(&self, id: &ProductId) -> Option<usize> {
        self.products.iter().position(|product| &product.id == id)
    }

    /// Product owning the section `id`.
    pub fn product_of_section(&self, id: &SectionId) -> Option<&Product> {
        self.products
            .iter()
            .find(|product| product.section(id).is_some())
    }

    /// Looks up a section in any product.
    /// 在所有產品中查找區段。
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.products.iter().find_map(|product| product.section(id))
    }

    fn section_mut(&mut self, id: &SectionId) -> Option<&mut Section> {
        self.products
            .iter_mut()
            .find_map(|product| product.section_mut(id))
    }

    /// Looks up a field in any section.
    /// 在所有區段中查找欄位。
    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.products
            .iter()
            .flat_map(|product| product.sections.iter())
            .find_map(|section| section.field(id))
    }

    /// Finds where `id` currently lives.
    /// 找出欄位目前所在的產品、區段與索引。
    pub fn locate_field(&self, id: &FieldId) -> Option<FieldLocation> {
        self.products.iter().find_map(|product| {
            product.sections.iter().find_map(|section| {
                section.field_index(id).map(|index| FieldLocation {
                    product_id: product.id.clone(),
                    section_id: section.id.clone(),
                    index,
                })
            })
        })
    }

    /// Products whose name contains `query`, ignoring case. An empty query
    /// matches everything.
    /// 依名稱（不分大小寫）篩選產品。
    pub fn filter_by_name<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Product> + 'a {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(move |product| product.name.to_lowercase().contains(&needle))
    }

    /// Builds a product from `draft` and places it first in the catalog.
    /// 依草稿建立產品並插入目錄最前方。
    pub fn create_product(&mut self, draft: ProductDraft) -> ProductId {
        let product = draft.build();
        let id = product.id.clone();
        self.products.insert(0, product);
        id
    }

    /// Appends `New Section <n>` to the product. Unknown products are ignored.
    pub fn add_section(&mut self, product_id: &ProductId) -> Option<SectionId> {
        let product = self.product_mut(product_id)?;
        let section = Section::new(
            format!("New Section {}", product.sections.len() + 1),
            String::new(),
        );
        let id = section.id.clone();
        product.sections.push(section);
        Some(id)
    }

    /// Appends a fresh field of `field_type` to a section of `product_id`.
    /// 在指定產品的區段末端新增欄位。
    pub fn add_field(
        &mut self,
        product_id: &ProductId,
        section_id: &SectionId,
        field_type: FieldType,
    ) -> Option<FieldId> {
        self.insert_new_field(product_id, section_id, None, field_type)
    }

    /// Creates a fresh field and inserts it before `before`, or at the end when
    /// the anchor is absent. The default key uses the pre-insert field count.
    pub fn insert_new_field(
        &mut self,
        product_id: &ProductId,
        section_id: &SectionId,
        before: Option<&FieldId>,
        field_type: FieldType,
    ) -> Option<FieldId> {
        let section = self.product_mut(product_id)?.section_mut(section_id)?;
        let field = Field::fresh(field_type, section.fields.len() + 1);
        let id = field.id.clone();
        insert_before(section, before, field);
        Some(id)
    }

    /// Applies `edit` to a product; `false` when the id is unknown.
    /// 套用產品屬性編輯；識別碼不存在時回傳 `false`。
    pub fn edit_product(&mut self, id: &ProductId, edit: ProductEdit) -> bool {
        match self.product_mut(id) {
            Some(product) => {
                edit.apply(product);
                true
            }
            None => false,
        }
    }

    /// Title-bar rename: trims and falls back to `Untitled Product`.
    pub fn rename_product(&mut self, id: &ProductId, name: &str) -> bool {
        self.edit_product(id, ProductEdit::Name(or_fallback(name, UNTITLED_PRODUCT)))
    }

    /// Applies `edit` to a section; `false` when the id is unknown.
    /// 套用區段屬性編輯；識別碼不存在時回傳 `false`。
    pub fn edit_section(&mut self, id: &SectionId, edit: SectionEdit) -> bool {
        match self.section_mut(id) {
            Some(section) => {
                edit.apply(section);
                true
            }
            None => false,
        }
    }

    /// Applies `edit` to a field; `false` when the id is unknown.
    /// 套用欄位屬性編輯；識別碼不存在時回傳 `false`。
    pub fn edit_field(&mut self, id: &FieldId, edit: FieldEdit) -> bool {
        let field = self
            .products
            .iter_mut()
            .flat_map(|product| product.sections.iter_mut())
            .find_map(|section| section.fields.iter_mut().find(|field| &field.id == id));
        match field {
            Some(field) => {
                edit.apply(field);
                true
            }
            None => false,
        }
    }

    /// Removes a product and returns it.
    /// 移除產品並回傳被移除的內容。
    pub fn delete_product(&mut self, id: &ProductId) -> Option<Product> {
        let index = self.product_index(id)?;
        Some(self.products.remove(index))
    }

    /// Removes a section, keeping the order of its siblings.
    /// 移除區段並保留其餘區段的順序。
    pub fn delete_section(&mut self, id: &SectionId) -> Option<RemovedSection> {
        self.products.iter_mut().find_map(|product| {
            let index = product.sections.iter().position(|section| &section.id == id)?;
            let section = product.sections.remove(index);
            Some(RemovedSection {
                product_id: product.id.clone(),
                index,
                section,
            })
        })
    }

    /// Removes a field and reports where it used to be.
    pub fn delete_field(&mut self, id: &FieldId) -> Option<FieldLocation> {
        let location = self.locate_field(id)?;
        let section = self.section_mut(&location.section_id)?;
        section.fields.remove(location.index);
        Some(location)
    }

    /// Moves `field_id` into `target` before the `before` anchor, both inside
    /// `product_id`.
    ///
    /// The field is removed from its source first; the anchor is then looked
    /// up in the target's remaining fields, and the field is appended when the
    /// anchor cannot be found. Nothing changes when the field or target
    /// section is not part of the product, or when the field is its own anchor.
    pub fn move_field(
        &mut self,
        product_id: &ProductId,
        field_id: &FieldId,
        target: &SectionId,
        before: Option<&FieldId>,
    ) -> Option<FieldMove> {
        if before == Some(field_id) {
            return None;
        }
        let product = self.product_mut(product_id)?;
        let target_index = product
            .sections
            .iter()
            .position(|section| &section.id == target)?;
        let (source_index, from_index) =
            product
                .sections
                .iter()
                .enumerate()
                .find_map(|(section_index, section)| {
                    section
                        .field_index(field_id)
                        .map(|field_index| (section_index, field_index))
                })?;

        let field = product.sections[source_index].fields.remove(from_index);
        let from_section = product.sections[source_index].id.clone();
        let to_index = insert_before(&mut product.sections[target_index], before, field);
        Some(FieldMove {
            field_id: field_id.clone(),
            from_section,
            from_index,
            to_section: target.clone(),
            to_index,
        })
    }
}

fn insert_before(section: &mut Section, before: Option<&FieldId>, field: Field) -> usize {
    match before.and_then(|anchor| section.field_index(anchor)) {
        Some(index) => {
            section.fields.insert(index, field);
            index
        }
        None => {
            section.fields.push(field);
            section.fields.len() - 1
        }
    }
}
