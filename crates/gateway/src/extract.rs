//! Request extractors
//!
//! Both extractors reject with [`AppError`] so malformed input gets the
//! same 400 JSON body as every other client error.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use folio_common::{
    db::{FieldSelection, Pagination},
    errors::{AppError, Result},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// JSON body whose rejection is a 400 validation error
#[derive(Debug, Clone, Copy)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation {
                message: format!("Invalid request body: {}", rejection.body_text()),
            })?;
        Ok(ApiJson(inner))
    }
}

/// Raw query pairs in request order. Repeated keys are kept, which
/// `exclude=a&exclude=b` needs.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation {
                message: rejection.body_text(),
            })?;
        Ok(QueryParams(pairs))
    }
}

impl QueryParams {
    /// First value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Optional uuid; present but malformed is an error
    pub fn uuid(&self, key: &str) -> Result<Option<Uuid>> {
        self.get(key)
            .map(|raw| Uuid::parse_str(raw).map_err(|e| AppError::invalid(key, e)))
            .transpose()
    }

    pub fn required_uuid(&self, key: &str) -> Result<Uuid> {
        self.uuid(key)?.ok_or_else(|| AppError::missing(key))
    }

    /// Optional unsigned number; negative or non-numeric is an error
    pub fn number<N>(&self, key: &str) -> Result<Option<N>>
    where
        N: std::str::FromStr,
        N::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| raw.parse::<N>().map_err(|e| AppError::invalid(key, e)))
            .transpose()
    }

    /// `limit` and `offset`, defaulting to 100 and 0
    pub fn pagination(&self) -> Result<Pagination> {
        let defaults = Pagination::default();
        Ok(Pagination::new(
            self.number("limit")?.unwrap_or(defaults.limit),
            self.number("offset")?.unwrap_or(defaults.offset),
        ))
    }

    /// Columns left after every `exclude` / `exclude[]` value is removed
    pub fn field_selection(&self) -> Result<FieldSelection> {
        FieldSelection::from_exclude_names(
            self.0
                .iter()
                .filter(|(k, _)| k == "exclude" || k == "exclude[]")
                .map(|(_, v)| v.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::db::DocumentField;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        QueryParams(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_missing_and_malformed_uuids() {
        let query = params(&[("documentUUID", "not-a-uuid")]);
        assert!(matches!(
            query.required_uuid("ownerUUID"),
            Err(AppError::MissingField { .. })
        ));
        assert!(matches!(
            query.uuid("documentUUID"),
            Err(AppError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_pagination_defaults_and_rejects_negatives() {
        assert_eq!(params(&[]).pagination().unwrap(), Pagination { limit: 100, offset: 0 });
        assert_eq!(
            params(&[("limit", "5"), ("offset", "10")]).pagination().unwrap(),
            Pagination { limit: 5, offset: 10 }
        );
        assert!(params(&[("limit", "-1")]).pagination().is_err());
        assert!(params(&[("offset", "ten")]).pagination().is_err());
    }

    #[test]
    fn test_pagination_clamps_to_bindable_range() {
        let max = u64::MAX.to_string();
        let page = params(&[("limit", &max), ("offset", &max)]).pagination().unwrap();
        assert_eq!(page.limit, i64::MAX as u64);
        assert_eq!(page.offset, i64::MAX as u64);

        let page = params(&[("offset", "9223372036854775808")]).pagination().unwrap();
        assert_eq!(page.offset, i64::MAX as u64);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn test_exclude_collects_both_spellings() {
        let query = params(&[("exclude", "title"), ("exclude[]", "base64")]);
        let fields = query.field_selection().unwrap();
        assert!(!fields.includes(DocumentField::Title));
        assert!(!fields.includes(DocumentField::Content));
        assert!(fields.includes(DocumentField::TimeCreated));
    }
}
