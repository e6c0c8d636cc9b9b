//! Postgres selection store

use crate::db::models::{SelectionActiveModel, SelectionColumn, SelectionEntity, SelectionRow};
use crate::db::{DbPool, SelectionRepository};
use crate::domain::{BoundsSelection, CoordinateSelection, Selection, SelectionKind};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::debug;
use uuid::Uuid;

/// Settings stored for legacy selections that carry none
const EMPTY_SETTINGS: &str = "{}";

#[derive(Clone)]
pub struct PgSelectionRepository {
    pool: DbPool,
}

impl PgSelectionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn check_ids(selection: &Selection) -> Result<()> {
    if selection.uuid.is_nil() {
        return Err(AppError::InvalidSelection {
            message: "selectionUUID must not be nil".into(),
        });
    }
    if selection.document_uuid.is_nil() {
        return Err(AppError::InvalidSelection {
            message: "documentUUID must not be nil".into(),
        });
    }
    Ok(())
}

fn to_active_model(selection: Selection) -> Result<SelectionActiveModel> {
    let mut row = SelectionActiveModel {
        selection_uuid: Set(selection.uuid),
        document_uuid: Set(selection.document_uuid),
        page_key: Set(None),
        coordinates: Set(None),
        is_complete: Set(None),
        settings: Set(None),
        selection_bounds: Set(None),
    };

    match selection.kind {
        Some(SelectionKind::Coordinate(c)) => {
            row.page_key = Set(c.page_key);
            row.coordinates = Set(Some(serde_json::to_value(c.coordinates)?));
        }
        Some(SelectionKind::Bounds(b)) => {
            let settings = b
                .settings
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| EMPTY_SETTINGS.to_owned());
            row.is_complete = Set(Some(b.is_complete));
            row.settings = Set(Some(settings));
            row.selection_bounds = Set(Some(serde_json::to_value(b.selection_bounds)?));
        }
        None => {}
    }

    Ok(row)
}

fn from_row(row: SelectionRow) -> Result<Selection> {
    let kind = if let Some(coordinates) = row.coordinates {
        Some(SelectionKind::Coordinate(CoordinateSelection {
            page_key: row.page_key,
            coordinates: serde_json::from_value(coordinates)?,
        }))
    } else if let Some(bounds) = row.selection_bounds {
        Some(SelectionKind::Bounds(BoundsSelection {
            is_complete: row.is_complete.unwrap_or(false),
            settings: row.settings,
            selection_bounds: serde_json::from_value(bounds)?,
        }))
    } else {
        None
    };

    Ok(Selection {
        uuid: row.selection_uuid,
        document_uuid: row.document_uuid,
        kind,
    })
}

async fn insert<C: ConnectionTrait>(conn: &C, selection: Selection) -> Result<()> {
    let row = to_active_model(selection)?;
    SelectionEntity::insert(row).exec_without_returning(conn).await?;
    Ok(())
}

#[async_trait]
impl SelectionRepository for PgSelectionRepository {
    async fn add(&self, selection: Selection) -> Result<()> {
        check_ids(&selection)?;
        insert(self.pool.conn(), selection).await
    }

    async fn add_bulk(&self, selections: Vec<Selection>) -> Result<()> {
        for selection in &selections {
            check_ids(selection)?;
        }

        let count = selections.len();
        self.pool
            .transaction(|txn| {
                Box::pin(async move {
                    for selection in selections {
                        insert(txn, selection).await?;
                    }
                    Ok(())
                })
            })
            .await?;

        debug!(count, "Inserted selection batch");
        Ok(())
    }

    async fn get_by_document_uuid(&self, document_uuid: Uuid) -> Result<Vec<Selection>> {
        SelectionEntity::find()
            .filter(SelectionColumn::DocumentUuid.eq(document_uuid))
            .all(self.pool.conn())
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    async fn get_by_selection_uuid(&self, selection_uuid: Uuid) -> Result<Vec<Selection>> {
        SelectionEntity::find_by_id(selection_uuid)
            .one(self.pool.conn())
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    async fn delete_by_selection_uuid(&self, selection_uuid: Uuid) -> Result<()> {
        let result = SelectionEntity::delete_by_id(selection_uuid)
            .exec(self.pool.conn())
            .await?;

        debug!(selection_uuid = %selection_uuid, rows = result.rows_affected, "Deleted selection");
        Ok(())
    }

    async fn delete_by_document_uuid(&self, document_uuid: Uuid) -> Result<()> {
        let result = SelectionEntity::delete_many()
            .filter(SelectionColumn::DocumentUuid.eq(document_uuid))
            .exec(self.pool.conn())
            .await?;

        debug!(
            document_uuid = %document_uuid,
            rows = result.rows_affected,
            "Deleted selections of document"
        );
        Ok(())
    }
}
