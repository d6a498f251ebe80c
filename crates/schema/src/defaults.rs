use crate::catalog::Catalog;
use crate::ids::{FieldId, ProductId, SectionId};
use crate::model::{Field, FieldType, Product, Section};

pub const UNTITLED_PRODUCT: &str = "Untitled Product";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_STATUS: &str = "Draft";
pub const DEFAULT_SECTION_TITLE: &str = "Basic Details";
pub(crate) const NEW_SECTION_DESCRIPTION: &str = "Drag a field from the toolbox to begin.";

pub const STARTER_PRODUCT_ID: &str = "prod-1";
pub const STARTER_SECTION_ID: &str = "section-1";
pub const STARTER_FIELD_ID: &str = "field-1";

/// Catalog shipped with a fresh install: one checking product with two fields.
/// 首次啟動時的預設目錄。
pub fn starter_catalog() -> Catalog {
    let fields = vec![
        Field {
            id: FieldId::new(STARTER_FIELD_ID),
            label: "Applicant Name".into(),
            key: "applicantName".into(),
            field_type: FieldType::text(),
            description: "Collect the full legal name of the applicant.".into(),
            required: true,
        },
        Field {
            id: FieldId::new("field-2"),
            label: "Date of Birth".into(),
            key: "dateOfBirth".into(),
            field_type: FieldType::date(),
            description: "Used to verify age and eligibility.".into(),
            required: true,
        },
    ];
    let section = Section {
        id: SectionId::new(STARTER_SECTION_ID),
        title: DEFAULT_SECTION_TITLE.into(),
        description: "Foundational customer details.".into(),
        fields,
    };
    Catalog::from_products(vec![Product {
        id: ProductId::new(STARTER_PRODUCT_ID),
        name: "Starter Checking".into(),
        description: "Core checking account product definition.".into(),
        category: "Retail Banking".into(),
        status: DEFAULT_STATUS.into(),
        sections: vec![section],
    }])
}
