use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "access_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True when `code` names this entry, ignoring surrounding whitespace and case.
    pub fn matches(&self, code: &str) -> bool {
        self.code.trim().to_lowercase() == code.trim().to_lowercase()
    }
}

/// Finds the stored code equal to `code` ignoring case.
///
/// SQLite's `lower()` only folds ASCII, so the comparison happens here.
pub async fn find_matching<C>(db: &C, code: &str) -> Result<Option<Model>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = Entity::find().all(db).await?;
    Ok(rows.into_iter().find(|row| row.matches(code)))
}
