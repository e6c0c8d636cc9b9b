use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

/// Per-document metadata: page count, page size and rendered page images.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "documentUUID")]
    pub document_uuid: Uuid,

    #[serde(rename = "numberOfPages", default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,

    /// Image reference keyed by page number
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::page_map::deserialize_option"
    )]
    pub images: Option<BTreeMap<u32, String>>,

    #[serde(rename = "ownerUUID", default, skip_serializing_if = "Option::is_none")]
    pub owner_uuid: Option<Uuid>,

    #[serde(rename = "ownerType", default, skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<i32>,
}

/// The page and dimension fields of [`Meta`].
///
/// Used both as the metadata service's answer and as a partial update,
/// where `None` means "leave the stored value alone".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetaFields {
    #[validate(range(min = 0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<i32>,

    #[validate(range(min = 0.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,

    #[validate(range(min = 0.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::page_map::deserialize_option"
    )]
    pub images: Option<BTreeMap<u32, String>>,
}

impl MetaFields {
    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.number_of_pages.is_none()
            && self.height.is_none()
            && self.width.is_none()
            && self.images.is_none()
    }

    /// Attach identity fields to produce a full record
    pub fn into_meta(
        self,
        document_uuid: Uuid,
        owner_uuid: Option<Uuid>,
        owner_type: Option<i32>,
    ) -> Meta {
        Meta {
            document_uuid,
            number_of_pages: self.number_of_pages,
            width: self.width,
            height: self.height,
            images: self.images,
            owner_uuid,
            owner_type,
        }
    }
}
