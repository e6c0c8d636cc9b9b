//! In-memory stores and a router harness for handler tests

use crate::{create_router, AppState};
use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, TimeZone, Utc};
use folio_common::{
    db::{
        DbPool, DocumentField, DocumentRepository, FieldSelection, MetaRepository, Pagination,
        SelectionRepository,
    },
    domain::{Document, Meta, MetaFields, NewDocument, Selection, SelectionKind},
    errors::{AppError, Result},
    metagen::MetaGenerator,
};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Content given to documents created with [`MemoryDocuments::seed`]
pub const SEED_CONTENT: &str = "QUJD";

struct StoredDocument {
    document: NewDocument,
    time_created: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryDocuments {
    rows: Mutex<Vec<StoredDocument>>,
}

impl MemoryDocuments {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn exists(&self, document_uuid: Uuid) -> bool {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .any(|row| row.document.uuid == document_uuid)
    }

    /// Owner columns of a stored document
    pub fn owner_of(&self, document_uuid: Uuid) -> Option<(Option<Uuid>, Option<i32>)> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.document.uuid == document_uuid)
            .map(|row| (row.document.owner_uuid, row.document.owner_type))
    }

    /// Insert a document directly and return its id
    pub fn seed(&self, owner_uuid: Option<Uuid>) -> Uuid {
        let document = NewDocument::new(SEED_CONTENT.to_string()).with_owner(owner_uuid, Some(1));
        let id = document.uuid;
        self.insert(document);
        id
    }

    fn insert(&self, document: NewDocument) {
        let mut rows = self.rows.lock().unwrap();
        // strictly increasing so listings have a stable newest-first order
        let time_created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::seconds(rows.len() as i64);
        rows.push(StoredDocument {
            document,
            time_created,
        });
    }

    fn project(row: &StoredDocument, fields: FieldSelection) -> Document {
        fn pick<T>(
            fields: FieldSelection,
            field: DocumentField,
            value: Option<T>,
        ) -> Option<Option<T>> {
            fields.includes(field).then_some(value)
        }

        let doc = &row.document;
        Document {
            uuid: doc.uuid,
            title: pick(fields, DocumentField::Title, doc.title.clone()),
            time_created: pick(fields, DocumentField::TimeCreated, Some(row.time_created)),
            owner_uuid: pick(fields, DocumentField::OwnerUuid, doc.owner_uuid),
            owner_type: pick(fields, DocumentField::OwnerType, doc.owner_type),
            content: pick(fields, DocumentField::Content, Some(doc.content.clone())),
        }
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocuments {
    async fn upload(&self, document: NewDocument) -> Result<()> {
        self.insert(document);
        Ok(())
    }

    async fn get_by_document_uuid(
        &self,
        document_uuid: Uuid,
        owner_uuid: Option<Uuid>,
        fields: FieldSelection,
    ) -> Result<Document> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| {
                row.document.uuid == document_uuid
                    && owner_uuid.map_or(true, |owner| row.document.owner_uuid == Some(owner))
            })
            .map(|row| Self::project(row, fields))
            .ok_or_else(|| AppError::DocumentNotFound {
                id: document_uuid.to_string(),
            })
    }

    async fn get_by_owner_uuid(
        &self,
        owner_uuid: Uuid,
        page: Pagination,
        fields: FieldSelection,
    ) -> Result<Vec<Document>> {
        let rows = self.rows.lock().unwrap();
        let mut owned: Vec<&StoredDocument> = rows
            .iter()
            .filter(|row| row.document.owner_uuid == Some(owner_uuid))
            .collect();
        owned.sort_by(|a, b| b.time_created.cmp(&a.time_created));

        Ok(owned
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .map(|row| Self::project(row, fields))
            .collect())
    }

    async fn delete_by_document_uuid(
        &self,
        document_uuid: Uuid,
        owner_uuid: Option<Uuid>,
    ) -> Result<()> {
        self.rows.lock().unwrap().retain(|row| {
            row.document.uuid != document_uuid
                || owner_uuid.map_or(false, |owner| row.document.owner_uuid != Some(owner))
        });
        Ok(())
    }
}

/// Selections that reference [`MemoryDocuments`] the way the foreign key does
pub struct MemorySelections {
    documents: Arc<MemoryDocuments>,
    rows: Mutex<Vec<Selection>>,
}

impl MemorySelections {
    pub fn new(documents: Arc<MemoryDocuments>) -> Self {
        Self {
            documents,
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Selections of a document that carry coordinates
    pub fn count_with_coordinates(&self, document_uuid: Uuid) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.document_uuid == document_uuid)
            .filter(|s| matches!(s.kind, Some(SelectionKind::Coordinate(_))))
            .count()
    }

    fn check(&self, selection: &Selection) -> Result<()> {
        if selection.uuid.is_nil() || selection.document_uuid.is_nil() {
            return Err(AppError::InvalidSelection {
                message: "selectionUUID and documentUUID must not be nil".to_string(),
            });
        }
        Ok(())
    }

    /// Stored form of a selection: legacy shapes without settings get `{}`
    fn stored(mut selection: Selection) -> Selection {
        if let Some(SelectionKind::Bounds(bounds)) = &mut selection.kind {
            if bounds.settings.as_deref().map_or(true, str::is_empty) {
                bounds.settings = Some("{}".to_string());
            }
        }
        selection
    }

    fn check_reference(&self, selection: &Selection) -> Result<()> {
        if !self.documents.exists(selection.document_uuid) {
            return Err(AppError::Database(DbErr::Custom(format!(
                "insert or update on table \"selections\" violates foreign key constraint \
                 (documentUUID {})",
                selection.document_uuid
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl SelectionRepository for MemorySelections {
    async fn add(&self, selection: Selection) -> Result<()> {
        self.check(&selection)?;
        self.check_reference(&selection)?;
        self.rows.lock().unwrap().push(Self::stored(selection));
        Ok(())
    }

    async fn add_bulk(&self, selections: Vec<Selection>) -> Result<()> {
        for selection in &selections {
            self.check(selection)?;
        }
        for selection in &selections {
            self.check_reference(selection)?;
        }
        self.rows
            .lock()
            .unwrap()
            .extend(selections.into_iter().map(Self::stored));
        Ok(())
    }

    async fn get_by_document_uuid(&self, document_uuid: Uuid) -> Result<Vec<Selection>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.document_uuid == document_uuid)
            .cloned()
            .collect())
    }

    async fn get_by_selection_uuid(&self, selection_uuid: Uuid) -> Result<Vec<Selection>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.uuid == selection_uuid)
            .cloned()
            .collect())
    }

    async fn delete_by_selection_uuid(&self, selection_uuid: Uuid) -> Result<()> {
        self.rows.lock().unwrap().retain(|s| s.uuid != selection_uuid);
        Ok(())
    }

    async fn delete_by_document_uuid(&self, document_uuid: Uuid) -> Result<()> {
        self.rows.lock().unwrap().retain(|s| s.document_uuid != document_uuid);
        Ok(())
    }
}

/// Metadata rows joined against [`MemoryDocuments`] for the owner columns
pub struct MemoryMeta {
    documents: Arc<MemoryDocuments>,
    rows: Mutex<BTreeMap<Uuid, MetaFields>>,
}

impl MemoryMeta {
    pub fn new(documents: Arc<MemoryDocuments>) -> Self {
        Self {
            documents,
            rows: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl MetaRepository for MemoryMeta {
    async fn add(&self, meta: Meta) -> Result<()> {
        if !self.documents.exists(meta.document_uuid) {
            return Err(AppError::Database(DbErr::Custom(format!(
                "insert on table \"document_meta\" violates foreign key constraint \
                 (documentUUID {})",
                meta.document_uuid
            ))));
        }

        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&meta.document_uuid) {
            return Err(AppError::Database(DbErr::Custom(format!(
                "duplicate key value violates unique constraint (documentUUID {})",
                meta.document_uuid
            ))));
        }
        rows.insert(
            meta.document_uuid,
            MetaFields {
                number_of_pages: meta.number_of_pages,
                height: meta.height,
                width: meta.width,
                images: meta.images,
            },
        );
        Ok(())
    }

    async fn delete(&self, document_uuid: Uuid) -> Result<()> {
        self.rows.lock().unwrap().remove(&document_uuid);
        Ok(())
    }

    async fn update(&self, document_uuid: Uuid, fields: MetaFields) -> Result<()> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&document_uuid) {
            row.number_of_pages = fields.number_of_pages.or(row.number_of_pages);
            row.height = fields.height.or(row.height);
            row.width = fields.width.or(row.width);
            row.images = fields.images.or(row.images.take());
        }
        Ok(())
    }

    async fn get(&self, document_uuid: Uuid, owner_uuid: Uuid) -> Result<Meta> {
        let not_found = || AppError::MetaNotFound {
            id: document_uuid.to_string(),
        };

        let (owner, owner_type) = self.documents.owner_of(document_uuid).ok_or_else(not_found)?;
        if owner != Some(owner_uuid) {
            return Err(not_found());
        }

        let fields = self
            .rows
            .lock()
            .unwrap()
            .get(&document_uuid)
            .cloned()
            .ok_or_else(not_found)?;
        Ok(fields.into_meta(document_uuid, owner, owner_type))
    }

    async fn get_page_range(
        &self,
        document_uuid: Uuid,
        owner_uuid: Uuid,
        start: u32,
        end: u32,
    ) -> Result<Meta> {
        let mut meta = self.get(document_uuid, owner_uuid).await?;
        let images = meta
            .images
            .take()
            .unwrap_or_default()
            .into_iter()
            .filter(|(page, _)| (start..=end).contains(page))
            .collect();
        meta.images = Some(images);
        Ok(meta)
    }
}

/// Metadata generator returning fixed fields, or always failing
pub struct StubMetaGenerator {
    fail: bool,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl StubMetaGenerator {
    pub const PAGES: i32 = 3;

    pub fn succeeding() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::succeeding()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetaGenerator for StubMetaGenerator {
    async fn generate(&self, base64: &str) -> Result<MetaFields> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(base64.to_string());

        if self.fail {
            return Err(AppError::MetaGeneration {
                message: "metadata service returned 502 Bad Gateway".to_string(),
            });
        }

        let images = (0..Self::PAGES as u32)
            .map(|page| (page, format!("image-{}", page)))
            .collect();
        Ok(MetaFields {
            number_of_pages: Some(Self::PAGES),
            height: Some(842.0),
            width: Some(595.0),
            images: Some(images),
        })
    }
}

/// Router wired to in-memory stores
pub struct TestApp {
    pub server: TestServer,
    pub documents: Arc<MemoryDocuments>,
    pub selections: Arc<MemorySelections>,
    pub meta: Arc<MemoryMeta>,
    pub metagen: Arc<StubMetaGenerator>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(0, Some(StubMetaGenerator::succeeding()))
    }

    /// The database answers `pings` pings, then reports errors
    pub fn with_db_pings(pings: usize) -> Self {
        Self::build(pings, Some(StubMetaGenerator::succeeding()))
    }

    pub fn with_metagen(metagen: StubMetaGenerator) -> Self {
        Self::build(0, Some(metagen))
    }

    /// No metadata service configured
    pub fn without_metagen() -> Self {
        Self::build(0, None)
    }

    fn build(pings: usize, metagen: Option<StubMetaGenerator>) -> Self {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(
                (0..pings)
                    .map(|_| MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    })
                    .collect::<Vec<_>>(),
            )
            .into_connection();

        let documents = Arc::new(MemoryDocuments::default());
        let selections = Arc::new(MemorySelections::new(documents.clone()));
        let meta = Arc::new(MemoryMeta::new(documents.clone()));
        let configured = metagen.is_some();
        let metagen = Arc::new(metagen.unwrap_or_else(StubMetaGenerator::failing));

        let state = AppState {
            db: DbPool::from_connection(conn),
            documents: documents.clone(),
            selections: selections.clone(),
            meta: meta.clone(),
            metagen: configured.then(|| metagen.clone() as Arc<dyn MetaGenerator>),
        };

        Self {
            server: TestServer::new(create_router(state)).unwrap(),
            documents,
            selections,
            meta,
            metagen,
        }
    }
}
