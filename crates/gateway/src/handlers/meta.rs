//! Document metadata handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validate, SuccessResponse};
use crate::extract::{ApiJson, QueryParams};
use crate::AppState;
use folio_common::{
    db::{DocumentField, FieldSelection},
    domain::{Meta, MetaFields},
    errors::{AppError, Result},
};

/// Request to store metadata for a document.
///
/// When any of the metadata fields is present they are stored as given.
/// Otherwise the metadata is generated from `documentBase64String`, or from
/// the stored document content when that is absent too.
#[derive(Debug, Deserialize, Validate)]
pub struct AddMetaRequest {
    #[serde(rename = "documentUUID")]
    pub document_uuid: Uuid,

    #[serde(rename = "ownerUUID", default)]
    pub owner_uuid: Option<Uuid>,

    #[serde(rename = "ownerType", default)]
    pub owner_type: Option<i32>,

    #[serde(rename = "documentBase64String", default)]
    pub base64: Option<String>,

    #[validate(nested)]
    #[serde(flatten)]
    pub fields: MetaFields,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMetaRequest {
    #[serde(rename = "documentUUID", alias = "UUID")]
    pub document_uuid: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AddMetaResponse {
    #[serde(rename = "documentUUID")]
    pub document_uuid: Uuid,
}

/// `GET /api/v1/meta/?documentUUID=..&ownerUUID=..[&startPage=..&endPage=..]`
pub async fn get_meta(State(state): State<AppState>, query: QueryParams) -> Result<Json<Meta>> {
    let document_uuid = query.required_uuid("documentUUID")?;
    let owner_uuid = query.required_uuid("ownerUUID")?;

    let start = query.number::<u32>("startPage")?;
    let end = query.number::<u32>("endPage")?;

    let meta = match (start, end) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(AppError::invalid(
                    "startPage",
                    format!("startPage {} is after endPage {}", start, end),
                ));
            }
            state
                .meta
                .get_page_range(document_uuid, owner_uuid, start, end)
                .await?
        }
        (None, None) => state.meta.get(document_uuid, owner_uuid).await?,
        (None, Some(_)) => return Err(AppError::missing("startPage")),
        (Some(_), None) => return Err(AppError::missing("endPage")),
    };

    Ok(Json(meta))
}

/// `POST /api/v1/meta/`
pub async fn add_meta(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddMetaRequest>,
) -> Result<Json<AddMetaResponse>> {
    validate(&request)?;
    let document_uuid = request.document_uuid;

    let fields = if !request.fields.is_empty() {
        request.fields
    } else {
        let base64 = match request.base64 {
            Some(base64) => base64,
            None => {
                let document = state
                    .documents
                    .get_by_document_uuid(
                        document_uuid,
                        request.owner_uuid,
                        FieldSelection::only([DocumentField::Content]),
                    )
                    .await?;
                document
                    .content()
                    .map(str::to_owned)
                    .ok_or_else(|| AppError::Internal {
                        message: format!("document {} has no content", document_uuid),
                    })?
            }
        };

        let generated = state.metagen()?.generate(&base64).await?;
        validate(&generated)?;
        generated
    };

    let meta = fields.into_meta(document_uuid, request.owner_uuid, request.owner_type);
    state.meta.add(meta).await?;

    tracing::info!(document_uuid = %document_uuid, "Meta stored");
    Ok(Json(AddMetaResponse { document_uuid }))
}

/// `PUT /api/v1/meta/?documentUUID=..`
///
/// Only fields present in the body are changed.
pub async fn update_meta(
    State(state): State<AppState>,
    query: QueryParams,
    ApiJson(fields): ApiJson<MetaFields>,
) -> Result<Json<SuccessResponse>> {
    let document_uuid = query.required_uuid("documentUUID")?;
    validate(&fields)?;

    state.meta.update(document_uuid, fields).await?;

    tracing::info!(document_uuid = %document_uuid, "Meta updated");
    Ok(Json(SuccessResponse::ok()))
}

/// `DELETE /api/v1/meta/` with `{"documentUUID": ..}` as body
pub async fn delete_meta(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeleteMetaRequest>,
) -> Result<Json<SuccessResponse>> {
    state.meta.delete(request.document_uuid).await?;

    tracing::info!(document_uuid = %request.document_uuid, "Meta deleted");
    Ok(Json(SuccessResponse::ok()))
}
