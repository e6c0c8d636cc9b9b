use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A rectangle on a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// One bound of a legacy multi-bound selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionBound {
    #[serde(rename = "extract_method", default, skip_serializing_if = "Option::is_none")]
    pub extract_method: Option<String>,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Current shape: one rectangle on an optional logical page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_key: Option<String>,
    pub coordinates: Coordinates,
}

/// Legacy shape: bounds grouped by page index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsSelection {
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<String>,
    #[serde(deserialize_with = "super::page_map::deserialize")]
    pub selection_bounds: BTreeMap<i32, Vec<SelectionBound>>,
}

/// The two selection shapes. Which one applies is decided by the keys
/// present: `coordinates` or `pageKey` for the current shape,
/// `selectionBounds`, `isComplete` or `settings` for the legacy one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SelectionKind {
    Coordinate(CoordinateSelection),
    Bounds(BoundsSelection),
}

const COORDINATE_KEYS: [&str; 2] = ["coordinates", "pageKey"];
const BOUNDS_KEYS: [&str; 3] = ["selectionBounds", "isComplete", "settings"];

impl SelectionKind {
    /// Pick the shape from the keys of `fields`. `None` when no shape key is
    /// present; a shape key with a malformed value is an error.
    fn from_fields(fields: Map<String, Value>) -> serde_json::Result<Option<Self>> {
        let has_any = |keys: &[&str]| keys.iter().any(|key| fields.contains_key(*key));

        if has_any(&COORDINATE_KEYS) {
            let shape = CoordinateSelection::deserialize(Value::Object(fields))?;
            Ok(Some(SelectionKind::Coordinate(shape)))
        } else if has_any(&BOUNDS_KEYS) {
            let shape = BoundsSelection::deserialize(Value::Object(fields))?;
            Ok(Some(SelectionKind::Bounds(shape)))
        } else {
            Ok(None)
        }
    }

    /// For `#[serde(flatten, deserialize_with = ..)]` fields. A plain
    /// flattened `Option` turns every inner error into `None`.
    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for SelectionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Self::deserialize_optional(deserializer)?
            .ok_or_else(|| D::Error::custom("expected `coordinates` or `selectionBounds`"))
    }
}

/// A user drawn region within a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(rename = "selectionUUID")]
    pub uuid: Uuid,

    #[serde(rename = "documentUUID")]
    pub document_uuid: Uuid,

    #[serde(flatten, deserialize_with = "SelectionKind::deserialize_optional")]
    pub kind: Option<SelectionKind>,
}

impl Selection {
    pub fn new(document_uuid: Uuid, kind: Option<SelectionKind>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            document_uuid,
            kind,
        }
    }
}
