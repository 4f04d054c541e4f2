use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::Comment;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub memory_id: i64,
    pub text: String,
    pub commenter: String,
    pub created_at: ChronoDateTimeUtc,
    pub parent_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::memories::Entity",
        from = "Column::MemoryId",
        to = "super::memories::Column::Id"
    )]
    Memory,
}

impl Related<super::memories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            memory_id: model.memory_id,
            text: model.text,
            commenter: model.commenter,
            created_at: model.created_at,
            parent_id: model.parent_id,
        }
    }
}
