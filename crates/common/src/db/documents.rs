//! Postgres document store

use crate::db::models::{DocumentActiveModel, DocumentColumn, DocumentEntity};
use crate::db::{DbPool, DocumentRepository, FieldSelection, Pagination};
use crate::domain::{Document, NewDocument};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    Set,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: DbPool,
}

impl PgDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn upload(&self, document: NewDocument) -> Result<()> {
        let row = DocumentActiveModel {
            document_uuid: Set(document.uuid),
            document_title: Set(document.title),
            document_base64: Set(Some(document.content)),
            owner_uuid: Set(document.owner_uuid),
            owner_type: Set(document.owner_type),
            ..Default::default()
        };

        DocumentEntity::insert(row)
            .exec_without_returning(self.pool.conn())
            .await?;

        Ok(())
    }

    async fn get_by_document_uuid(
        &self,
        document_uuid: Uuid,
        owner_uuid: Option<Uuid>,
        fields: FieldSelection,
    ) -> Result<Document> {
        let conn = self.pool.conn();

        let stmt = fields
            .select()
            .filter(DocumentColumn::DocumentUuid.eq(document_uuid))
            .apply_if(owner_uuid, |query, owner| {
                query.filter(DocumentColumn::OwnerUuid.eq(owner))
            })
            .build(conn.get_database_backend());

        debug!(
            document_uuid = %document_uuid,
            columns = ?fields.column_names(),
            "Reading document"
        );

        let row = conn
            .query_one(stmt)
            .await?
            .ok_or_else(|| AppError::DocumentNotFound {
                id: document_uuid.to_string(),
            })?;

        fields.scan(&row)
    }

    async fn get_by_owner_uuid(
        &self,
        owner_uuid: Uuid,
        page: Pagination,
        fields: FieldSelection,
    ) -> Result<Vec<Document>> {
        let conn = self.pool.conn();

        let stmt = fields
            .select()
            .filter(DocumentColumn::OwnerUuid.eq(owner_uuid))
            .order_by_desc(DocumentColumn::TimeCreated)
            .limit(page.limit)
            .offset(page.offset)
            .build(conn.get_database_backend());

        debug!(
            owner_uuid = %owner_uuid,
            limit = page.limit,
            offset = page.offset,
            columns = ?fields.column_names(),
            "Listing documents"
        );

        conn.query_all(stmt)
            .await?
            .iter()
            .map(|row| fields.scan(row))
            .collect()
    }

    async fn delete_by_document_uuid(
        &self,
        document_uuid: Uuid,
        owner_uuid: Option<Uuid>,
    ) -> Result<()> {
        let result = DocumentEntity::delete_many()
            .filter(DocumentColumn::DocumentUuid.eq(document_uuid))
            .apply_if(owner_uuid, |query, owner| {
                query.filter(DocumentColumn::OwnerUuid.eq(owner))
            })
            .exec(self.pool.conn())
            .await?;

        debug!(document_uuid = %document_uuid, rows = result.rows_affected, "Deleted document");
        Ok(())
    }
}
