//! Document handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validate, SuccessResponse};
use crate::extract::{ApiJson, QueryParams};
use crate::AppState;
use folio_common::{
    domain::{Document, NewDocument},
    errors::{AppError, Result},
    metrics,
};

/// Request to upload a document
#[derive(Debug, Deserialize, Validate)]
pub struct UploadDocumentRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "documentBase64String")]
    pub base64: String,

    #[serde(rename = "documentTitle", default)]
    pub title: Option<String>,

    #[serde(rename = "ownerUUID", default)]
    pub owner_uuid: Option<Uuid>,

    #[serde(rename = "ownerType", default)]
    pub owner_type: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    #[serde(rename = "documentUUID")]
    pub document_uuid: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub documents: Vec<Document>,
}

/// `POST|PUT /api/v1/documents/`
pub async fn upload_document(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UploadDocumentRequest>,
) -> Result<Json<UploadDocumentResponse>> {
    validate(&request)?;

    let document = NewDocument::new(request.base64)
        .with_title(request.title)
        .with_owner(request.owner_uuid, request.owner_type);
    let document_uuid = document.uuid;

    state.documents.upload(document).await?;
    metrics::record_document_uploaded();

    tracing::info!(
        document_uuid = %document_uuid,
        owner_uuid = ?request.owner_uuid,
        "Document uploaded"
    );

    Ok(Json(UploadDocumentResponse { document_uuid }))
}

/// `GET /api/v1/documents/`
///
/// With `documentUUID` a single document is returned (owner-scoped when
/// `ownerUUID` is given). Otherwise `ownerUUID` is required and the owner's
/// documents are listed newest first.
pub async fn get_documents(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<DocumentsResponse>> {
    let fields = query.field_selection()?;
    let owner_uuid = query.uuid("ownerUUID")?;

    if let Some(document_uuid) = query.uuid("documentUUID")? {
        let document = state
            .documents
            .get_by_document_uuid(document_uuid, owner_uuid, fields)
            .await?;
        return Ok(Json(DocumentsResponse {
            documents: vec![document],
        }));
    }

    let owner_uuid = owner_uuid.ok_or_else(|| AppError::missing("ownerUUID"))?;
    let page = query.pagination()?;
    let documents = state
        .documents
        .get_by_owner_uuid(owner_uuid, page, fields)
        .await?;

    Ok(Json(DocumentsResponse { documents }))
}

/// `DELETE /api/v1/documents/?documentUUID=..[&ownerUUID=..]`
pub async fn delete_document(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<SuccessResponse>> {
    let document_uuid = query.required_uuid("documentUUID")?;
    let owner_uuid = query.uuid("ownerUUID")?;

    state
        .documents
        .delete_by_document_uuid(document_uuid, owner_uuid)
        .await?;

    tracing::info!(document_uuid = %document_uuid, "Document deleted");
    Ok(Json(SuccessResponse::ok()))
}
