//! Repository traits
//!
//! Handlers only see these traits. The Postgres implementations live next
//! to this file; the gateway tests swap in in-memory ones.

use crate::db::FieldSelection;
use crate::domain::{Document, Meta, MetaFields, NewDocument, Selection};
use crate::errors::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Default page size for owner listings
pub const DEFAULT_LIMIT: u64 = 100;

/// Limit and offset of an owner listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

/// Largest limit or offset the database can bind (`int8`)
pub const MAX_BOUND: u64 = i64::MAX as u64;

impl Pagination {
    /// Both values are clamped to [`MAX_BOUND`]; an offset past the last row
    /// still yields an empty page.
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: limit.min(MAX_BOUND),
            offset: offset.min(MAX_BOUND),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new document. The creation time is set by the store.
    async fn upload(&self, document: NewDocument) -> Result<()>;

    /// Fetch one document. With an owner, a document owned by anyone else
    /// is reported as not found.
    async fn get_by_document_uuid(
        &self,
        document_uuid: Uuid,
        owner_uuid: Option<Uuid>,
        fields: FieldSelection,
    ) -> Result<Document>;

    /// Documents of an owner, newest first
    async fn get_by_owner_uuid(
        &self,
        owner_uuid: Uuid,
        page: Pagination,
        fields: FieldSelection,
    ) -> Result<Vec<Document>>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete_by_document_uuid(
        &self,
        document_uuid: Uuid,
        owner_uuid: Option<Uuid>,
    ) -> Result<()>;
}

#[async_trait]
pub trait SelectionRepository: Send + Sync {
    /// Insert one selection; nil ids are rejected before touching the store
    async fn add(&self, selection: Selection) -> Result<()>;

    /// Insert a batch in one transaction: either every row lands or none
    async fn add_bulk(&self, selections: Vec<Selection>) -> Result<()>;

    async fn get_by_document_uuid(&self, document_uuid: Uuid) -> Result<Vec<Selection>>;

    /// Zero or one selection, as a list
    async fn get_by_selection_uuid(&self, selection_uuid: Uuid) -> Result<Vec<Selection>>;

    async fn delete_by_selection_uuid(&self, selection_uuid: Uuid) -> Result<()>;

    async fn delete_by_document_uuid(&self, document_uuid: Uuid) -> Result<()>;
}

#[async_trait]
pub trait MetaRepository: Send + Sync {
    async fn add(&self, meta: Meta) -> Result<()>;

    async fn delete(&self, document_uuid: Uuid) -> Result<()>;

    /// Overwrite only the fields that are set, in a single statement
    async fn update(&self, document_uuid: Uuid, fields: MetaFields) -> Result<()>;

    /// Metadata of a document owned by `owner_uuid`. A missing row and an
    /// owner mismatch are the same not found error.
    async fn get(&self, document_uuid: Uuid, owner_uuid: Uuid) -> Result<Meta>;

    /// Like [`MetaRepository::get`] with `images` cut down to pages
    /// `start..=end`
    async fn get_page_range(
        &self,
        document_uuid: Uuid,
        owner_uuid: Uuid,
        start: u32,
        end: u32,
    ) -> Result<Meta>;
}
