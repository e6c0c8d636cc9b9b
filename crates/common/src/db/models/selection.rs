//! Selection entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "selections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub selection_uuid: Uuid,

    pub document_uuid: Uuid,

    #[sea_orm(column_type = "Text", nullable)]
    pub page_key: Option<String>,

    /// `{x1, y1, x2, y2}` for coordinate selections
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub coordinates: Option<Json>,

    pub is_complete: Option<bool>,

    #[sea_orm(column_type = "Text", nullable)]
    pub settings: Option<String>,

    /// Page index to list of bounds, for legacy selections
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub selection_bounds: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::document::Entity",
        from = "Column::DocumentUuid",
        to = "super::document::Column::DocumentUuid"
    )]
    Document,
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
