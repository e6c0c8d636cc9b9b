//! Postgres document metadata store

use crate::db::models::{MetaActiveModel, MetaEntity};
use crate::db::{DbPool, MetaRepository};
use crate::domain::{Meta, MetaFields};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, EntityTrait, QueryResult, Set, Statement};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

const UPDATE_META: &str = r#"
UPDATE document_meta SET
    number_of_pages = COALESCE($2, number_of_pages),
    height = COALESCE($3, height),
    width = COALESCE($4, width),
    images = COALESCE($5, images)
WHERE document_uuid = $1
"#;

const SELECT_META: &str = r#"
SELECT m.document_uuid, m.number_of_pages, m.height, m.width, m.images,
       d.owner_uuid, d.owner_type
FROM document_meta m
JOIN documents d ON d.document_uuid = m.document_uuid
WHERE m.document_uuid = $1 AND d.owner_uuid = $2
"#;

const SELECT_META_PAGE_RANGE: &str = r#"
SELECT m.document_uuid, m.number_of_pages, m.height, m.width,
       COALESCE(
           (SELECT jsonb_object_agg(img.key, img.value)
            FROM jsonb_each(m.images) AS img
            WHERE img.key::bigint BETWEEN $3 AND $4),
           '{}'::jsonb
       ) AS images,
       d.owner_uuid, d.owner_type
FROM document_meta m
JOIN documents d ON d.document_uuid = m.document_uuid
WHERE m.document_uuid = $1 AND d.owner_uuid = $2
"#;

#[derive(Clone)]
pub struct PgMetaRepository {
    pool: DbPool,
}

impl PgMetaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, document_uuid: Uuid, stmt: Statement) -> Result<Meta> {
        let row = self
            .pool
            .conn()
            .query_one(stmt)
            .await?
            .ok_or_else(|| AppError::MetaNotFound {
                id: document_uuid.to_string(),
            })?;

        scan_meta(&row)
    }
}

fn images_to_json(images: Option<BTreeMap<u32, String>>) -> Result<Option<serde_json::Value>> {
    Ok(images.map(serde_json::to_value).transpose()?)
}

fn scan_meta(row: &QueryResult) -> Result<Meta> {
    let images = row
        .try_get::<Option<serde_json::Value>>("", "images")?
        .map(serde_json::from_value)
        .transpose()?;

    Ok(Meta {
        document_uuid: row.try_get("", "document_uuid")?,
        number_of_pages: row.try_get("", "number_of_pages")?,
        height: row.try_get("", "height")?,
        width: row.try_get("", "width")?,
        images,
        owner_uuid: row.try_get("", "owner_uuid")?,
        owner_type: row.try_get("", "owner_type")?,
    })
}

#[async_trait]
impl MetaRepository for PgMetaRepository {
    async fn add(&self, meta: Meta) -> Result<()> {
        let row = MetaActiveModel {
            document_uuid: Set(meta.document_uuid),
            number_of_pages: Set(meta.number_of_pages),
            height: Set(meta.height),
            width: Set(meta.width),
            images: Set(images_to_json(meta.images)?),
        };

        MetaEntity::insert(row)
            .exec_without_returning(self.pool.conn())
            .await?;

        Ok(())
    }

    async fn delete(&self, document_uuid: Uuid) -> Result<()> {
        let result = MetaEntity::delete_by_id(document_uuid)
            .exec(self.pool.conn())
            .await?;

        debug!(document_uuid = %document_uuid, rows = result.rows_affected, "Deleted meta");
        Ok(())
    }

    async fn update(&self, document_uuid: Uuid, fields: MetaFields) -> Result<()> {
        let conn = self.pool.conn();
        let stmt = Statement::from_sql_and_values(
            conn.get_database_backend(),
            UPDATE_META,
            vec![
                document_uuid.into(),
                fields.number_of_pages.into(),
                fields.height.into(),
                fields.width.into(),
                images_to_json(fields.images)?.into(),
            ],
        );

        let result = conn.execute(stmt).await?;
        debug!(document_uuid = %document_uuid, rows = result.rows_affected(), "Updated meta");
        Ok(())
    }

    async fn get(&self, document_uuid: Uuid, owner_uuid: Uuid) -> Result<Meta> {
        let stmt = Statement::from_sql_and_values(
            self.pool.conn().get_database_backend(),
            SELECT_META,
            vec![document_uuid.into(), owner_uuid.into()],
        );

        self.fetch_one(document_uuid, stmt).await
    }

    async fn get_page_range(
        &self,
        document_uuid: Uuid,
        owner_uuid: Uuid,
        start: u32,
        end: u32,
    ) -> Result<Meta> {
        let stmt = Statement::from_sql_and_values(
            self.pool.conn().get_database_backend(),
            SELECT_META_PAGE_RANGE,
            vec![
                document_uuid.into(),
                owner_uuid.into(),
                i64::from(start).into(),
                i64::from(end).into(),
            ],
        );

        self.fetch_one(document_uuid, stmt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use tokio_test::assert_ok;

    fn repo(db: MockDatabase) -> PgMetaRepository {
        PgMetaRepository::new(DbPool::from_connection(db.into_connection()))
    }

    fn logged_sql(conn: DatabaseConnection) -> String {
        format!("{:?}", conn.into_transaction_log())
    }

    #[tokio::test]
    async fn test_update_is_a_single_coalescing_statement() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);
        let repo = repo(db);

        let fields = MetaFields {
            height: Some(20.0),
            ..Default::default()
        };
        assert_ok!(repo.update(Uuid::new_v4(), fields).await);

        let log = std::sync::Arc::try_unwrap(repo.pool.conn).expect("sole connection owner").into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{:?}", log);
        assert!(sql.contains("COALESCE($2, number_of_pages)"));
        assert!(sql.contains("Int(None)"));
        assert!(sql.contains("Float(Some(20.0))"));
        assert!(!sql.contains("SELECT"));
    }

    #[tokio::test]
    async fn test_get_joins_owner() {
        let document = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let row: BTreeMap<&str, Value> = BTreeMap::from([
            ("document_uuid", document.into()),
            ("number_of_pages", Some(3).into()),
            ("height", Some(842.0f32).into()),
            ("width", Some(595.0f32).into()),
            ("images", Some(serde_json::json!({"1": "a", "3": "c"})).into()),
            ("owner_uuid", Some(owner).into()),
            ("owner_type", Some(1).into()),
        ]);
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]);
        let repo = repo(db);

        let meta = repo.get(document, owner).await.unwrap();
        assert_eq!(meta.number_of_pages, Some(3));
        assert_eq!(meta.owner_uuid, Some(owner));
        assert_eq!(meta.images.unwrap()[&3], "c");

        let sql = logged_sql(std::sync::Arc::try_unwrap(repo.pool.conn).expect("sole connection owner"));
        assert!(sql.contains("JOIN documents"));
        assert!(sql.contains("d.owner_uuid = $2"));
    }

    #[tokio::test]
    async fn test_page_range_filters_in_sql() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()]);
        let repo = repo(db);

        let err = repo
            .get_page_range(Uuid::new_v4(), Uuid::new_v4(), 2, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MetaNotFound { .. }));

        let sql = logged_sql(std::sync::Arc::try_unwrap(repo.pool.conn).expect("sole connection owner"));
        assert!(sql.contains("jsonb_each"));
        assert!(sql.contains("BETWEEN $3 AND $4"));
        assert!(sql.contains("BigInt(Some(2))"));
    }

    #[tokio::test]
    async fn test_add_serializes_images() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);
        let repo = repo(db);

        let meta = MetaFields {
            number_of_pages: Some(2),
            images: Some(BTreeMap::from([(0, "Image0".to_owned())])),
            ..Default::default()
        }
        .into_meta(Uuid::new_v4(), None, None);
        repo.add(meta).await.unwrap();

        let sql = logged_sql(std::sync::Arc::try_unwrap(repo.pool.conn).expect("sole connection owner"));
        assert!(sql.contains("document_meta"));
        assert!(sql.contains("Image0"));
    }
}
