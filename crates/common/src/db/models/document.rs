//! Document entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub document_uuid: Uuid,

    #[sea_orm(column_type = "Text", nullable)]
    pub document_title: Option<String>,

    /// Base64 encoded PDF
    #[sea_orm(column_type = "Text", nullable)]
    pub document_base64: Option<String>,

    /// Set by the database on insert
    pub time_created: DateTimeUtc,

    pub owner_uuid: Option<Uuid>,

    pub owner_type: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::selection::Entity")]
    Selections,

    #[sea_orm(has_one = "super::meta::Entity")]
    Meta,
}

impl Related<super::selection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selections.def()
    }
}

impl Related<super::meta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
