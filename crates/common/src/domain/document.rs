use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A column that may have been left out of the query.
///
/// `None` means the column was not selected and the key is omitted from the
/// response; `Some(None)` means it was selected and is NULL.
pub type Projected<T> = Option<Option<T>>;

/// A stored PDF document as returned by reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "documentUUID")]
    pub uuid: Uuid,

    #[serde(rename = "documentTitle", default, skip_serializing_if = "Option::is_none")]
    pub title: Projected<String>,

    #[serde(rename = "timeCreated", default, skip_serializing_if = "Option::is_none")]
    pub time_created: Projected<DateTime<Utc>>,

    #[serde(rename = "ownerUUID", default, skip_serializing_if = "Option::is_none")]
    pub owner_uuid: Projected<Uuid>,

    #[serde(rename = "ownerType", default, skip_serializing_if = "Option::is_none")]
    pub owner_type: Projected<i32>,

    /// Base64 encoded PDF payload
    #[serde(rename = "base64", default, skip_serializing_if = "Option::is_none")]
    pub content: Projected<String>,
}

impl Document {
    /// The content if it was selected and non-null
    pub fn content(&self) -> Option<&str> {
        self.content.as_ref().and_then(|c| c.as_deref())
    }
}

/// A document about to be written. The creation timestamp is assigned by
/// the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub uuid: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub owner_uuid: Option<Uuid>,
    pub owner_type: Option<i32>,
}

impl NewDocument {
    /// A new document with a freshly generated id
    pub fn new(content: String) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: None,
            content,
            owner_uuid: None,
            owner_type: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_owner(mut self, owner_uuid: Option<Uuid>, owner_type: Option<i32>) -> Self {
        self.owner_uuid = owner_uuid;
        self.owner_type = owner_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unselected_columns_are_omitted() {
        let doc = Document {
            uuid: Uuid::nil(),
            title: Some(Some("Fake Title".into())),
            ..Default::default()
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"documentUUID":"00000000-0000-0000-0000-000000000000","#,
                r#""documentTitle":"Fake Title"}"#
            )
        );
    }

    #[test]
    fn test_selected_null_columns_are_present() {
        let doc = Document {
            uuid: Uuid::nil(),
            title: Some(None),
            owner_uuid: Some(None),
            content: Some(Some("ABC".into())),
            ..Default::default()
        };
        let value = serde_json::to_value(&doc).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj["documentTitle"].is_null());
        assert!(obj["ownerUUID"].is_null());
        assert_eq!(obj["base64"], "ABC");
        assert!(!obj.contains_key("timeCreated"));
        assert_eq!(doc.content(), Some("ABC"));
    }
}
