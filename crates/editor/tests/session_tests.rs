use pdt_editor::{
    Command, Confirmation, Created, DragPayload, DropTarget, EditorConfig, EditorDocument,
    EditorSession, Outcome, SelectionPatch, ViewMode, DEFAULT_STORAGE_KEY, SAVE_VERSION_NOTICE,
};
use pdt_schema::{
    FieldId, FieldMove, FieldType, ProductDraft, ProductEdit, ProductId, SectionId,
    STARTER_FIELD_ID, STARTER_PRODUCT_ID, STARTER_SECTION_ID,
};
use pdt_store::{BlobStore, FileBlobStore, LoadSource, MemoryBlobStore};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;

fn open(blobs: MemoryBlobStore) -> EditorSession<MemoryBlobStore> {
    EditorSession::open(blobs, EditorConfig::default()).expect("open session")
}

fn starter_section() -> SectionId {
    SectionId::new(STARTER_SECTION_ID)
}

fn stored(session: &EditorSession<MemoryBlobStore>) -> Value {
    let raw = session
        .store()
        .blobs()
        .get(DEFAULT_STORAGE_KEY)
        .unwrap()
        .expect("document written");
    serde_json::from_str(&raw).unwrap()
}

fn field_ids(session: &EditorSession<MemoryBlobStore>, section_id: &SectionId) -> Vec<String> {
    session
        .catalog()
        .section(section_id)
        .unwrap()
        .fields
        .iter()
        .map(|field| field.id.to_string())
        .collect()
}

#[test]
fn empty_store_opens_starter_document() {
    let session = open(MemoryBlobStore::new());
    assert_eq!(session.load_source(), LoadSource::Missing);
    assert_eq!(session.document(), &EditorDocument::default());
    assert_eq!(session.view_mode(), ViewMode::Overview);
    assert!(session.store().blobs().is_empty());
}

#[test]
fn adding_text_field_numbers_key_and_selects_it() {
    let mut session = open(MemoryBlobStore::new());
    let outcome = session
        .apply(Command::AddField {
            section_id: starter_section(),
            field_type: FieldType::text(),
        })
        .unwrap();

    let Outcome::Created(Created::Field(field_id)) = outcome else {
        panic!("expected a created field, got {outcome:?}");
    };
    let field = session.catalog().field(&field_id).unwrap();
    assert_eq!(field.key, "text3");
    assert_eq!(field.label, "Text Field");
    assert!(!field.required);
    assert_eq!(session.selection().field.as_ref(), Some(&field_id));
    assert_eq!(session.selection().section, Some(starter_section()));

    let saved = stored(&session);
    assert_eq!(saved["selectedFieldId"], json!(field_id.as_str()));
    assert_eq!(saved["products"][0]["sections"][0]["fields"][2]["key"], "text3");
}

#[test]
fn palette_click_falls_back_to_first_section() {
    let mut session = open(MemoryBlobStore::new());
    session
        .apply(Command::Select(SelectionPatch::new().section(None)))
        .unwrap();
    let outcome = session
        .apply(Command::AddFieldToSelection {
            field_type: FieldType::new("Email"),
        })
        .unwrap();
    assert!(matches!(outcome, Outcome::Created(Created::Field(_))));
    assert_eq!(field_ids(&session, &starter_section()).len(), 3);
    assert_eq!(session.selection().section, Some(starter_section()));
}

#[test]
fn blank_product_draft_gets_defaults_and_opens_editor() {
    let mut session = open(MemoryBlobStore::new());
    let outcome = session
        .apply(Command::CreateProduct(ProductDraft::new("  ", "", "")))
        .unwrap();
    let Outcome::Created(Created::Product(product_id)) = outcome else {
        panic!("expected a created product, got {outcome:?}");
    };

    let product = &session.catalog().products()[0];
    assert_eq!(product.id, product_id);
    assert_eq!(product.name, "Untitled Product");
    assert_eq!(product.category, "Uncategorized");
    assert_eq!(product.status, "Draft");
    assert_eq!(product.sections.len(), 1);
    assert_eq!(product.sections[0].title, "Basic Details");
    assert!(product.sections[0].fields.is_empty());

    assert_eq!(session.selection().product, Some(product_id));
    assert_eq!(
        session.selection().section,
        Some(product.sections[0].id.clone())
    );
    assert_eq!(session.selection().field, None);
    assert_eq!(session.view_mode(), ViewMode::Editor);
    assert_eq!(session.catalog().len(), 2);
}

#[test]
fn deleting_selected_section_falls_back_to_first() {
    let mut session = open(MemoryBlobStore::new());
    let product_id = ProductId::new(STARTER_PRODUCT_ID);
    let outcome = session
        .apply(Command::AddSection {
            product_id: product_id.clone(),
        })
        .unwrap();
    let Outcome::Created(Created::Section(section_id)) = outcome else {
        panic!("expected a created section, got {outcome:?}");
    };
    assert_eq!(
        session.catalog().section(&section_id).unwrap().title,
        "New Section 2"
    );
    assert_eq!(session.selection().section.as_ref(), Some(&section_id));
    assert_eq!(session.selection().field, None);

    let outcome = session
        .apply(Command::DeleteSection { section_id })
        .unwrap();
    assert_eq!(outcome, Outcome::Deleted);
    assert_eq!(session.selection().section, Some(starter_section()));
    assert_eq!(
        session.selection().field,
        Some(FieldId::new(STARTER_FIELD_ID))
    );
}

#[test]
fn deleting_selected_field_selects_first_remaining() {
    let mut session = open(MemoryBlobStore::new());
    session
        .apply(Command::Select(
            SelectionPatch::new().field(Some(FieldId::new("field-2"))),
        ))
        .unwrap();
    let outcome = session
        .apply(Command::DeleteField {
            field_id: FieldId::new("field-2"),
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Deleted);
    assert_eq!(
        session.selection().field,
        Some(FieldId::new(STARTER_FIELD_ID))
    );
    assert_eq!(field_ids(&session, &starter_section()), vec!["field-1"]);
}

#[test]
fn stored_keys_win_and_missing_keys_use_defaults() {
    let stored = json!({
        "products": [{
            "id": "prod-9",
            "name": "Savings",
            "description": "",
            "category": "Deposits",
            "status": "Live",
            "sections": []
        }],
        "selectedProductId": "prod-9",
        "selectedSectionId": null,
        "theme": "dark"
    });
    let session = open(MemoryBlobStore::with_entry(
        DEFAULT_STORAGE_KEY,
        stored.to_string(),
    ));

    assert_eq!(session.load_source(), LoadSource::Stored);
    assert_eq!(session.catalog().len(), 1);
    assert_eq!(session.catalog().products()[0].name, "Savings");
    assert_eq!(session.selection().product, Some(ProductId::new("prod-9")));
    assert_eq!(session.selection().section, None);
    // The default field id no longer resolves and is dropped on open.
    assert_eq!(session.selection().field, None);
    assert_eq!(session.view_mode(), ViewMode::Overview);
    assert_eq!(session.document().extra.get("theme"), Some(&json!("dark")));
}

#[test]
fn malformed_blob_recovers_to_default_document() {
    let session = open(MemoryBlobStore::with_entry(
        DEFAULT_STORAGE_KEY,
        "{\"products\": [",
    ));
    assert_eq!(session.load_source(), LoadSource::Recovered);
    assert_eq!(session.document(), &EditorDocument::default());
}

#[test]
fn legacy_editing_key_becomes_selected_product() {
    let mut value = serde_json::to_value(EditorDocument::default()).unwrap();
    let object = value.as_object_mut().unwrap();
    object.remove("selectedProductId");
    object.insert("editingProductId".into(), json!(STARTER_PRODUCT_ID));
    object.insert("view".into(), json!("editor"));

    let session = open(MemoryBlobStore::with_entry(
        DEFAULT_STORAGE_KEY,
        value.to_string(),
    ));
    assert_eq!(
        session.selection().product,
        Some(ProductId::new(STARTER_PRODUCT_ID))
    );
    assert_eq!(session.view_mode(), ViewMode::Editor);
    assert!(!session.document().extra.contains_key("editingProductId"));
}

#[test]
fn dropping_row_on_other_section_moves_before_anchor() {
    let mut session = open(MemoryBlobStore::new());
    let Outcome::Created(Created::Section(other)) = session
        .apply(Command::AddSection {
            product_id: ProductId::new(STARTER_PRODUCT_ID),
        })
        .unwrap()
    else {
        panic!("section not created");
    };
    let Outcome::Created(Created::Field(moving)) = session
        .apply(Command::AddField {
            section_id: other.clone(),
            field_type: FieldType::text(),
        })
        .unwrap()
    else {
        panic!("field not created");
    };

    let payload = DragPayload::move_field(moving.clone(), other.clone());
    let outcome = session
        .apply(Command::Drop {
            target: DropTarget::Row {
                section_id: starter_section(),
                field_id: FieldId::new(STARTER_FIELD_ID),
            },
            data: Some(payload.encode()),
        })
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Moved(FieldMove {
            field_id: moving.clone(),
            from_section: other.clone(),
            from_index: 0,
            to_section: starter_section(),
            to_index: 0,
        })
    );
    assert_eq!(
        field_ids(&session, &starter_section()),
        vec![moving.to_string(), "field-1".into(), "field-2".into()]
    );
    assert!(field_ids(&session, &other).is_empty());
    assert_eq!(session.selection().field, Some(moving));
    assert_eq!(session.selection().section, Some(starter_section()));
}

#[test]
fn palette_drag_inserts_into_section_on_drop() {
    let mut session = open(MemoryBlobStore::new());
    session
        .apply(Command::StartDrag(DragPayload::insert(FieldType::date())))
        .unwrap();
    assert!(session.drag_state().is_dragging());

    let outcome = session
        .apply(Command::Drop {
            target: DropTarget::Section(starter_section()),
            data: None,
        })
        .unwrap();
    let Outcome::Created(Created::Field(field_id)) = outcome else {
        panic!("expected a created field, got {outcome:?}");
    };
    assert!(!session.drag_state().is_dragging());
    let ids = field_ids(&session, &starter_section());
    assert_eq!(ids.last(), Some(&field_id.to_string()));
    assert_eq!(session.catalog().field(&field_id).unwrap().key, "date3");
}

#[test]
fn palette_drop_on_row_inserts_before_it() {
    let mut session = open(MemoryBlobStore::new());
    let outcome = session
        .apply(Command::Drop {
            target: DropTarget::Row {
                section_id: starter_section(),
                field_id: FieldId::new("field-2"),
            },
            data: Some(r#"{"type":"Number"}"#.into()),
        })
        .unwrap();
    let Outcome::Created(Created::Field(field_id)) = outcome else {
        panic!("expected a created field, got {outcome:?}");
    };
    assert_eq!(
        field_ids(&session, &starter_section()),
        vec!["field-1".into(), field_id.to_string(), "field-2".into()]
    );
}

#[test]
fn foreign_drop_payloads_are_ignored() {
    let mut session = open(MemoryBlobStore::new());
    let before = session.document().clone();
    for data in [
        "plain text",
        "{}",
        r#"{"type":""}"#,
        r#"{"type":"Text","fieldId":"field-1"}"#,
        r#"{"fieldId":"field-1"}"#,
        r#"{"url":"https://example.com"}"#,
    ] {
        session
            .apply(Command::StartDrag(DragPayload::insert(FieldType::text())))
            .unwrap();
        let outcome = session
            .apply(Command::Drop {
                target: DropTarget::Section(starter_section()),
                data: Some(data.into()),
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Unchanged, "payload {data}");
        assert!(!session.drag_state().is_dragging());
    }
    assert_eq!(session.document(), &before);
    assert!(session.store().blobs().is_empty());
}

#[test]
fn move_from_wrong_source_section_is_ignored() {
    let mut session = open(MemoryBlobStore::new());
    let payload = DragPayload::move_field(
        FieldId::new(STARTER_FIELD_ID),
        SectionId::new("section-elsewhere"),
    );
    let outcome = session
        .apply(Command::Drop {
            target: DropTarget::Section(starter_section()),
            data: Some(payload.encode()),
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(
        field_ids(&session, &starter_section()),
        vec!["field-1", "field-2"]
    );
}

#[test]
fn dropping_row_on_itself_changes_nothing() {
    let mut session = open(MemoryBlobStore::new());
    let payload = DragPayload::move_field(FieldId::new("field-2"), starter_section());
    let outcome = session
        .apply(Command::Drop {
            target: DropTarget::Row {
                section_id: starter_section(),
                field_id: FieldId::new("field-2"),
            },
            data: Some(payload.encode()),
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(
        field_ids(&session, &starter_section()),
        vec!["field-1", "field-2"]
    );
}

#[test]
fn declined_product_delete_keeps_everything() {
    let mut session = open(MemoryBlobStore::new());
    let product_id = ProductId::new(STARTER_PRODUCT_ID);
    let outcome = session
        .apply(Command::DeleteProduct {
            product_id: product_id.clone(),
            confirmation: Confirmation::from(false),
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Declined);
    assert_eq!(session.document(), &EditorDocument::default());

    session
        .apply(Command::OpenProduct {
            product_id: product_id.clone(),
        })
        .unwrap();
    let outcome = session
        .apply(Command::DeleteProduct {
            product_id,
            confirmation: Confirmation::Affirmed,
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Deleted);
    assert!(session.catalog().is_empty());
    assert_eq!(session.selection().product, None);
    assert_eq!(session.view_mode(), ViewMode::Overview);
    assert!(session.view("").list_is_empty());
}

#[test]
fn save_version_only_reports_notice() {
    let mut session = open(MemoryBlobStore::new());
    let outcome = session.apply(Command::SaveVersion).unwrap();
    assert_eq!(outcome, Outcome::Notice(SAVE_VERSION_NOTICE.to_string()));
    assert!(session.store().blobs().is_empty());

    assert_eq!(session.apply(Command::Save).unwrap(), Outcome::Saved);
    assert_eq!(session.store().blobs().len(), 1);
}

#[test]
fn selecting_unknown_section_clears_below_product() {
    let mut session = open(MemoryBlobStore::new());
    let outcome = session
        .apply(Command::Select(
            SelectionPatch::new().section(Some(SectionId::new("section-404"))),
        ))
        .unwrap();
    assert_eq!(outcome, Outcome::Updated);
    assert_eq!(
        session.selection().product,
        Some(ProductId::new(STARTER_PRODUCT_ID))
    );
    assert_eq!(session.selection().section, None);
    assert_eq!(session.selection().field, None);
}

#[test]
fn selecting_another_product_focuses_its_first_field() {
    let mut session = open(MemoryBlobStore::new());
    session
        .apply(Command::CreateProduct(ProductDraft::default()))
        .unwrap();

    let outcome = session
        .apply(Command::Select(
            SelectionPatch::new().product(Some(ProductId::new(STARTER_PRODUCT_ID))),
        ))
        .unwrap();
    assert_eq!(outcome, Outcome::Updated);
    assert_eq!(
        session.selection().product,
        Some(ProductId::new(STARTER_PRODUCT_ID))
    );
    assert_eq!(session.selection().section, Some(starter_section()));
    assert_eq!(
        session.selection().field,
        Some(FieldId::new(STARTER_FIELD_ID))
    );

    session
        .apply(Command::Select(
            SelectionPatch::new()
                .product(Some(ProductId::new(STARTER_PRODUCT_ID)))
                .field(Some(FieldId::new("field-2"))),
        ))
        .unwrap();
    assert_eq!(session.selection().field, Some(FieldId::new("field-2")));
}

#[test]
fn switching_product_keeps_explicit_keys() {
    let mut session = open(MemoryBlobStore::new());
    let Outcome::Created(Created::Product(created)) = session
        .apply(Command::CreateProduct(ProductDraft::default()))
        .unwrap()
    else {
        panic!("product not created");
    };
    session
        .apply(Command::Select(SelectionPatch::new().product(Some(
            ProductId::new(STARTER_PRODUCT_ID),
        ))))
        .unwrap();

    session
        .apply(Command::Select(
            SelectionPatch::new().product(Some(created.clone())).section(None),
        ))
        .unwrap();
    assert_eq!(session.selection().product, Some(created));
    assert_eq!(session.selection().section, None);
    assert_eq!(session.selection().field, None);
}

#[test]
fn open_and_back_switch_views() {
    let mut session = open(MemoryBlobStore::new());
    let Outcome::Created(Created::Product(created)) = session
        .apply(Command::CreateProduct(ProductDraft::new(
            "Savings Plus",
            "",
            "Deposits",
        )))
        .unwrap()
    else {
        panic!("product not created");
    };
    assert_eq!(session.apply(Command::BackToList).unwrap(), Outcome::Updated);
    assert_eq!(session.apply(Command::BackToList).unwrap(), Outcome::Unchanged);

    session
        .apply(Command::SelectProduct {
            product_id: ProductId::new(STARTER_PRODUCT_ID),
        })
        .unwrap();
    assert_eq!(session.view_mode(), ViewMode::Overview);
    assert_eq!(
        session.selection().field,
        Some(FieldId::new(STARTER_FIELD_ID))
    );

    session
        .apply(Command::OpenProduct {
            product_id: created.clone(),
        })
        .unwrap();
    let view = session.view("sav");
    assert_eq!(view.mode, ViewMode::Editor);
    assert_eq!(view.title(), "Savings Plus");
    assert_eq!(view.products.len(), 1);
    assert!(view.products[0].is_active);
    assert!(session.view("zzz").list_is_empty());
    assert_eq!(session.view("").products.len(), 2);
}

#[test]
fn unknown_ids_are_no_ops() {
    let mut session = open(MemoryBlobStore::new());
    let missing = ProductId::new("prod-missing");
    for command in [
        Command::AddSection {
            product_id: missing.clone(),
        },
        Command::AddField {
            section_id: SectionId::new("section-missing"),
            field_type: FieldType::text(),
        },
        Command::DeleteField {
            field_id: FieldId::new("field-missing"),
        },
        Command::OpenProduct {
            product_id: missing.clone(),
        },
        Command::EditProduct {
            product_id: missing,
            edit: ProductEdit::Name("Ghost".into()),
        },
    ] {
        assert_eq!(session.apply(command).unwrap(), Outcome::Unchanged);
    }
    assert!(session.store().blobs().is_empty());
}

#[test]
fn changes_are_written_through_to_disk() {
    let dir = tempdir().unwrap();
    let config = EditorConfig::default().with_storage_key("pdt.disk");
    let mut session =
        EditorSession::open(FileBlobStore::new(dir.path()), config.clone()).unwrap();
    session
        .apply(Command::RenameProduct {
            product_id: ProductId::new(STARTER_PRODUCT_ID),
            name: "  Everyday Checking ".into(),
        })
        .unwrap();

    let reopened = EditorSession::open(FileBlobStore::new(dir.path()), config).unwrap();
    assert_eq!(reopened.load_source(), LoadSource::Stored);
    assert_eq!(reopened.catalog().products()[0].name, "Everyday Checking");
    assert_eq!(reopened.document(), session.document());
}

#[test]
fn non_utf8_store_file_opens_default_document() {
    let dir = tempdir().unwrap();
    let blobs = FileBlobStore::new(dir.path());
    std::fs::write(blobs.path_for(DEFAULT_STORAGE_KEY), [0xff, 0xfe, b'{']).unwrap();

    let session = EditorSession::open(blobs, EditorConfig::default()).unwrap();
    assert_eq!(session.load_source(), LoadSource::Recovered);
    assert_eq!(session.document(), &EditorDocument::default());
}
