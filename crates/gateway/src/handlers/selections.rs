//! Selection handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SuccessResponse;
use crate::extract::{ApiJson, QueryParams};
use crate::AppState;
use folio_common::{
    domain::{Selection, SelectionKind},
    errors::{AppError, Result},
    metrics,
};

/// Body of a new selection: the document plus one of the two shapes
#[derive(Debug, Deserialize)]
pub struct NewSelectionRequest {
    #[serde(rename = "documentUUID")]
    pub document_uuid: Uuid,

    #[serde(flatten, deserialize_with = "SelectionKind::deserialize_optional")]
    pub kind: Option<SelectionKind>,
}

impl NewSelectionRequest {
    fn into_selection(self) -> Selection {
        Selection::new(self.document_uuid, self.kind)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateSelectionResponse {
    #[serde(rename = "selectionUUID")]
    pub selection_uuid: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreateSelectionsResponse {
    #[serde(rename = "selectionUUIDs")]
    pub selection_uuids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SelectionsResponse {
    pub selections: Vec<Selection>,
}

/// `POST /api/v1/selections/`
pub async fn create_selection(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewSelectionRequest>,
) -> Result<Json<CreateSelectionResponse>> {
    let selection = request.into_selection();
    let selection_uuid = selection.uuid;
    let document_uuid = selection.document_uuid;

    state.selections.add(selection).await?;
    metrics::record_selections_created(1);

    tracing::info!(
        selection_uuid = %selection_uuid,
        document_uuid = %document_uuid,
        "Selection created"
    );

    Ok(Json(CreateSelectionResponse { selection_uuid }))
}

/// `POST /api/v1/selections/bulk`
///
/// All selections are stored or none are.
pub async fn create_selections_bulk(
    State(state): State<AppState>,
    ApiJson(requests): ApiJson<Vec<NewSelectionRequest>>,
) -> Result<Json<CreateSelectionsResponse>> {
    if requests.is_empty() {
        return Err(AppError::Validation {
            message: "at least one selection is required".into(),
        });
    }

    let selections: Vec<Selection> = requests
        .into_iter()
        .map(NewSelectionRequest::into_selection)
        .collect();
    let selection_uuids: Vec<Uuid> = selections.iter().map(|s| s.uuid).collect();

    state.selections.add_bulk(selections).await?;
    metrics::record_selections_created(selection_uuids.len());

    tracing::info!(count = selection_uuids.len(), "Selection batch created");
    Ok(Json(CreateSelectionsResponse { selection_uuids }))
}

/// `GET /api/v1/selections/?documentUUID=..` or `?selectionUUID=..`
pub async fn get_selections(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<SelectionsResponse>> {
    let selections = if let Some(document_uuid) = query.uuid("documentUUID")? {
        state.selections.get_by_document_uuid(document_uuid).await?
    } else if let Some(selection_uuid) = query.uuid("selectionUUID")? {
        state.selections.get_by_selection_uuid(selection_uuid).await?
    } else {
        return Err(AppError::missing("documentUUID or selectionUUID"));
    };

    Ok(Json(SelectionsResponse { selections }))
}

/// `DELETE /api/v1/selections/?selectionUUID=..` or `?documentUUID=..`
pub async fn delete_selections(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<SuccessResponse>> {
    if let Some(selection_uuid) = query.uuid("selectionUUID")? {
        state.selections.delete_by_selection_uuid(selection_uuid).await?;
        tracing::info!(selection_uuid = %selection_uuid, "Selection deleted");
    } else if let Some(document_uuid) = query.uuid("documentUUID")? {
        state.selections.delete_by_document_uuid(document_uuid).await?;
        tracing::info!(document_uuid = %document_uuid, "Selections of document deleted");
    } else {
        return Err(AppError::missing("selectionUUID or documentUUID"));
    }

    Ok(Json(SuccessResponse::ok()))
}
