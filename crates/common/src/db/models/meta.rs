//! Document metadata entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_meta")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub document_uuid: Uuid,

    pub number_of_pages: Option<i32>,

    #[sea_orm(column_type = "Float", nullable)]
    pub height: Option<f32>,

    #[sea_orm(column_type = "Float", nullable)]
    pub width: Option<f32>,

    /// Page number (as a string key) to image reference
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub images: Option<Json>,
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
