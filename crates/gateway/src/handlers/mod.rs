//! API handlers module

pub mod documents;
pub mod health;
pub mod meta;
pub mod selections;

use folio_common::errors::{AppError, Result};
use serde::Serialize;
use validator::Validate;

/// `{"success": true}` acknowledgement for deletes and updates
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

pub(crate) fn validate<T: Validate>(request: &T) -> Result<()> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
    })
}
