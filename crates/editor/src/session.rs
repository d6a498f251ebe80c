use std::mem;

use pdt_schema::{Catalog, FieldId, FieldType, ProductDraft, ProductId, SectionId};
use pdt_store::{BlobStore, DocumentStore, LoadSource, Loaded};
use tracing::{debug, info, warn};

use crate::command::{Command, Confirmation, Created, Outcome, SAVE_VERSION_NOTICE};
use crate::config::EditorConfig;
use crate::document::EditorDocument;
use crate::drag::{plan_drop, DragPayload, DragState, DropAction, DropTarget};
use crate::error::SessionError;
use crate::selection::{Resolved, Selection, SelectionPatch, ViewMode};
use crate::view::{ProductSummary, ViewModel};

/// Owns the editor document and writes every change through to the store.
/// 持有編輯文件並在每次變更後立即寫入儲存區的工作階段。
#[derive(Debug)]
pub struct EditorSession<S> {
    config: EditorConfig,
    store: DocumentStore<S>,
    document: EditorDocument,
    drag: DragState,
    load_source: LoadSource,
}

impl<S: BlobStore> EditorSession<S> {
    /// Loads the document stored under `config.storage_key`, falling back to
    /// the built-in default, and repairs any dangling selection.
    /// 載入文件（必要時改用預設文件）並修正失效的選取狀態。
    pub fn open(blobs: S, config: EditorConfig) -> Result<Self, SessionError> {
        let store = DocumentStore::new(blobs, config.storage_key.clone());
        let loaded: Loaded<EditorDocument> = store.load_with(EditorDocument::upgrade_stored)?;
        let mut document = loaded.value;
        if document.selection.repair(&document.catalog) {
            warn!("stored selection pointed at missing entities and was cleared");
        }
        info!(
            key = store.key(),
            products = document.catalog.len(),
            source = ?loaded.source,
            "editor session opened"
        );
        Ok(Self {
            config,
            store,
            document,
            drag: DragState::Idle,
            load_source: loaded.source,
        })
    }

    /// Configuration the session was opened with.
    /// 開啟工作階段時使用的設定。
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current document.
    /// 目前的文件。
    pub fn document(&self) -> &EditorDocument {
        &self.document
    }

    /// Current product catalog.
    /// 目前的產品目錄。
    pub fn catalog(&self) -> &Catalog {
        &self.document.catalog
    }

    /// Current selection.
    /// 目前的選取狀態。
    pub fn selection(&self) -> &Selection {
        &self.document.selection
    }

    /// Screen currently shown.
    /// 目前顯示的畫面。
    pub fn view_mode(&self) -> ViewMode {
        self.document.view
    }

    /// Drag gesture in progress, if any.
    /// 進行中的拖曳狀態。
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Where the document came from when the session opened.
    /// 工作階段開啟時文件的來源。
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Backing document store.
    /// 底層的文件儲存器。
    pub fn store(&self) -> &DocumentStore<S> {
        &self.store
    }

    /// Closes the session and returns the blob medium.
    /// 結束工作階段並交還儲存媒介。
    pub fn into_blobs(self) -> S {
        self.store.into_blobs()
    }

    /// Editing product, section and field, resolved against the current tree.
    pub fn resolve(&self) -> Resolved<'_> {
        self.document.selection.resolve(&self.document.catalog)
    }

    /// Derives the view for a product-list `filter` (case-insensitive
    /// substring of the name; empty shows everything).
    pub fn view(&self, filter: &str) -> ViewModel<'_> {
        let active = self.document.selection.product.as_ref();
        let products = self
            .document
            .catalog
            .filter_by_name(filter)
            .map(|product| ProductSummary {
                product,
                is_active: Some(&product.id) == active,
            })
            .collect();
        ViewModel {
            mode: self.document.view,
            products,
            editing: self.resolve(),
            drag: &self.drag,
            palette: &self.config.palette,
        }
    }

    /// Applies one user intent. Changes are persisted before returning; only
    /// a failing store produces an error.
    /// 套用一個使用者指令；變更會在回傳前寫入儲存區。
    pub fn apply(&mut self, command: Command) -> Result<Outcome, SessionError> {
        debug!(?command, "applying command");
        let outcome = self.dispatch(command);
        if outcome.is_change() {
            self.document.selection.repair(&self.document.catalog);
            self.persist()?;
        } else if outcome == Outcome::Saved {
            self.persist()?;
        }
        Ok(outcome)
    }

    fn persist(&mut self) -> Result<(), SessionError> {
        self.store.save(&self.document)?;
        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> Outcome {
        match command {
            Command::CreateProduct(draft) => self.create_product(draft),
            Command::RenameProduct { product_id, name } => {
                changed(self.document.catalog.rename_product(&product_id, &name))
            }
            Command::EditProduct { product_id, edit } => {
                changed(self.document.catalog.edit_product(&product_id, edit))
            }
            Command::EditSection { section_id, edit } => {
                changed(self.document.catalog.edit_section(&section_id, edit))
            }
            Command::EditField { field_id, edit } => {
                changed(self.document.catalog.edit_field(&field_id, edit))
            }
            Command::AddSection { product_id } => self.add_section(&product_id),
            Command::AddField {
                section_id,
                field_type,
            } => self.add_field(&section_id, None, field_type),
            Command::AddFieldToSelection { field_type } => self.add_field_to_selection(field_type),
            Command::DeleteSection { section_id } => self.delete_section(&section_id),
            Command::DeleteField { field_id } => self.delete_field(&field_id),
            Command::DeleteProduct {
                product_id,
                confirmation,
            } => self.delete_product(&product_id, confirmation),
            Command::MoveField {
                field_id,
                to_section,
                before,
            } => self.move_field(&field_id, None, &to_section, before.as_ref()),
            Command::Select(patch) => self.select(patch),
            Command::SelectProduct { product_id } => self.focus_product(&product_id, None),
            Command::OpenProduct { product_id } => {
                self.focus_product(&product_id, Some(ViewMode::Editor))
            }
            Command::BackToList => self.set_view(ViewMode::Overview),
            Command::StartDrag(payload) => {
                self.drag = DragState::Dragging(payload);
                Outcome::Unchanged
            }
            Command::Drop { target, data } => self.finish_drop(target, data),
            Command::EndDrag => {
                self.drag = DragState::Idle;
                Outcome::Unchanged
            }
            Command::Save => Outcome::Saved,
            Command::SaveVersion => Outcome::Notice(SAVE_VERSION_NOTICE.to_string()),
        }
    }

    fn create_product(&mut self, draft: ProductDraft) -> Outcome {
        let id = self.document.catalog.create_product(draft);
        let first_section = self
            .document
            .catalog
            .product(&id)
            .and_then(|product| product.first_section())
            .map(|section| section.id.clone());
        self.document.selection = Selection {
            product: Some(id.clone()),
            section: first_section,
            field: None,
        };
        self.document.view = ViewMode::Editor;
        info!(product = %id, "product created");
        Outcome::Created(Created::Product(id))
    }

    fn add_section(&mut self, product_id: &ProductId) -> Outcome {
        let Some(section_id) = self.document.catalog.add_section(product_id) else {
            return Outcome::Unchanged;
        };
        self.document.selection = Selection {
            product: Some(product_id.clone()),
            section: Some(section_id.clone()),
            field: None,
        };
        Outcome::Created(Created::Section(section_id))
    }

    /// Adds a field to `section_id` of the editing product, before `before`
    /// when given.
    fn add_field(
        &mut self,
        section_id: &SectionId,
        before: Option<&FieldId>,
        field_type: FieldType,
    ) -> Outcome {
        let Some(product_id) = self.document.selection.product.clone() else {
            return Outcome::Unchanged;
        };
        let Some(field_id) =
            self.document
                .catalog
                .insert_new_field(&product_id, section_id, before, field_type)
        else {
            return Outcome::Unchanged;
        };
        self.document.selection.section = Some(section_id.clone());
        self.document.selection.field = Some(field_id.clone());
        Outcome::Created(Created::Field(field_id))
    }

    fn add_field_to_selection(&mut self, field_type: FieldType) -> Outcome {
        let resolved = self.resolve();
        let target = resolved
            .section
            .or_else(|| resolved.product.and_then(|product| product.first_section()))
            .map(|section| section.id.clone());
        match target {
            Some(section_id) => self.add_field(&section_id, None, field_type),
            None => Outcome::Unchanged,
        }
    }

    fn delete_section(&mut self, section_id: &SectionId) -> Outcome {
        let Some(removed) = self.document.catalog.delete_section(section_id) else {
            return Outcome::Unchanged;
        };
        if self.document.selection.section.as_ref() == Some(section_id) {
            let first = self
                .document
                .catalog
                .product(&removed.product_id)
                .and_then(|product| product.first_section());
            self.document.selection.section = first.map(|section| section.id.clone());
            self.document.selection.field =
                first.and_then(|section| section.first_field_id().cloned());
        }
        Outcome::Deleted
    }

    fn delete_field(&mut self, field_id: &FieldId) -> Outcome {
        let Some(location) = self.document.catalog.delete_field(field_id) else {
            return Outcome::Unchanged;
        };
        if self.document.selection.field.as_ref() == Some(field_id) {
            self.document.selection.field = self
                .document
                .catalog
                .section(&location.section_id)
                .and_then(|section| section.first_field_id().cloned());
        }
        Outcome::Deleted
    }

    fn delete_product(&mut self, product_id: &ProductId, confirmation: Confirmation) -> Outcome {
        if self.document.catalog.product(product_id).is_none() {
            return Outcome::Unchanged;
        }
        if confirmation == Confirmation::Declined {
            debug!(product = %product_id, "product deletion declined");
            return Outcome::Declined;
        }
        self.document.catalog.delete_product(product_id);
        if self.document.selection.product.as_ref() == Some(product_id) {
            self.document.selection = Selection::default();
            self.document.view = ViewMode::Overview;
        }
        info!(product = %product_id, "product deleted");
        Outcome::Deleted
    }

    /// Moves a field inside the editing product. When `from_section` is given
    /// the field must currently live there.
    fn move_field(
        &mut self,
        field_id: &FieldId,
        from_section: Option<&SectionId>,
        to_section: &SectionId,
        before: Option<&FieldId>,
    ) -> Outcome {
        let Some(product_id) = self.document.selection.product.clone() else {
            return Outcome::Unchanged;
        };
        if let Some(from_section) = from_section {
            let in_source = self
                .document
                .catalog
                .product(&product_id)
                .and_then(|product| product.section(from_section))
                .and_then(|section| section.field(field_id))
                .is_some();
            if !in_source {
                return Outcome::Unchanged;
            }
        }
        let Some(moved) =
            self.document
                .catalog
                .move_field(&product_id, field_id, to_section, before)
        else {
            return Outcome::Unchanged;
        };
        self.document.selection.section = Some(to_section.clone());
        self.document.selection.field = Some(field_id.clone());
        Outcome::Moved(moved)
    }

    /// Merges `patch`. Switching to another product first focuses its first
    /// section and field; explicit section/field keys in the patch still win.
    fn select(&mut self, patch: SelectionPatch) -> Outcome {
        let before = self.document.selection.clone();
        let SelectionPatch {
            product,
            section,
            field,
        } = patch;
        if let Some(product_id) = product.filter(|id| *id != before.product) {
            let focused = product_id
                .as_ref()
                .and_then(|id| self.document.catalog.product(id))
                .map(Selection::focus);
            self.document.selection = focused.unwrap_or(Selection {
                product: product_id,
                section: None,
                field: None,
            });
        }
        self.document.selection.merge(SelectionPatch {
            product: None,
            section,
            field,
        });
        self.document.selection.repair(&self.document.catalog);
        changed(self.document.selection != before)
    }

    fn focus_product(&mut self, product_id: &ProductId, view: Option<ViewMode>) -> Outcome {
        let Some(product) = self.document.catalog.product(product_id) else {
            return Outcome::Unchanged;
        };
        let next = Selection::focus(product);
        let view = view.unwrap_or(self.document.view);
        let is_change = next != self.document.selection || view != self.document.view;
        self.document.selection = next;
        self.document.view = view;
        changed(is_change)
    }

    fn set_view(&mut self, view: ViewMode) -> Outcome {
        if self.document.view == view {
            return Outcome::Unchanged;
        }
        self.document.view = view;
        Outcome::Updated
    }

    /// Ends the drag gesture and runs the drop, if the payload is recognised.
    fn finish_drop(&mut self, target: DropTarget, data: Option<String>) -> Outcome {
        let dragging = mem::take(&mut self.drag);
        let payload = match data {
            Some(raw) => DragPayload::parse(&raw),
            None => match dragging {
                DragState::Dragging(payload) => Some(payload),
                DragState::Idle => None,
            },
        };
        let Some(payload) = payload else {
            debug!("drop ignored: no recognised payload");
            return Outcome::Unchanged;
        };
        match plan_drop(payload, &target) {
            DropAction::Insert {
                section_id,
                before,
                field_type,
            } => self.add_field(&section_id, before.as_ref(), field_type),
            DropAction::Move {
                field_id,
                from_section,
                to_section,
                before,
            } => self.move_field(&field_id, Some(&from_section), &to_section, before.as_ref()),
        }
    }
}

fn changed(is_change: bool) -> Outcome {
    if is_change {
        Outcome::Updated
    } else {
        Outcome::Unchanged
    }
}
