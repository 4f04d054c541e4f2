use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::WallStore;
use crate::database::entities::{access_codes, comments, memories};
use crate::errors::{WallError, WallResult};
use crate::models::{Comment, Memory, MemoryChanges, NewComment, NewMemory};

/// Wall tables kept in a local SQLite database.
#[derive(Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl WallStore for SqlStore {
    async fn list_memories(&self) -> WallResult<Vec<Memory>> {
        let rows = memories::Entity::find()
            .order_by_desc(memories::Column::CreatedAt)
            .order_by_desc(memories::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Memory::from).collect())
    }

    async fn find_memory(&self, id: i64) -> WallResult<Option<Memory>> {
        let row = memories::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Memory::from))
    }

    async fn insert_memory(&self, memory: NewMemory) -> WallResult<Memory> {
        let row = memories::ActiveModel {
            title: Set(memory.title),
            description: Set(memory.description),
            image_url: Set(memory.image_url),
            uploader: Set(memory.uploader),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn update_memory(&self, id: i64, changes: MemoryChanges) -> WallResult<Memory> {
        let row = memories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| WallError::not_found("memory", id))?;

        let mut row: memories::ActiveModel = row.into();
        row.title = Set(changes.title);
        row.description = Set(changes.description);
        row.uploader = Set(changes.uploader);
        row.image_url = Set(changes.image_url);

        Ok(row.update(&self.db).await?.into())
    }

    async fn delete_memory(&self, id: i64) -> WallResult<()> {
        let result = memories::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(WallError::not_found("memory", id));
        }
        Ok(())
    }

    async fn list_comments(&self, memory_id: i64) -> WallResult<Vec<Comment>> {
        let rows = comments::Entity::find()
            .filter(comments::Column::MemoryId.eq(memory_id))
            .order_by_asc(comments::Column::CreatedAt)
            .order_by_asc(comments::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn find_comment(&self, id: i64) -> WallResult<Option<Comment>> {
        let row = comments::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Comment::from))
    }

    async fn insert_comment(&self, comment: NewComment) -> WallResult<Comment> {
        let row = comments::ActiveModel {
            memory_id: Set(comment.memory_id),
            text: Set(comment.text),
            commenter: Set(comment.commenter),
            parent_id: Set(comment.parent_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn update_comment_text(&self, id: i64, text: &str) -> WallResult<Comment> {
        let row = comments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| WallError::not_found("comment", id))?;

        let mut row: comments::ActiveModel = row.into();
        row.text = Set(text.to_string());

        Ok(row.update(&self.db).await?.into())
    }

    async fn delete_comment(&self, id: i64) -> WallResult<()> {
        let result = comments::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(WallError::not_found("comment", id));
        }
        Ok(())
    }

    async fn delete_replies(&self, parent_id: i64) -> WallResult<u64> {
        let result = comments::Entity::delete_many()
            .filter(comments::Column::ParentId.eq(parent_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_comments_for_memory(&self, memory_id: i64) -> WallResult<u64> {
        let result = comments::Entity::delete_many()
            .filter(comments::Column::MemoryId.eq(memory_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn access_code_exists(&self, code: &str) -> WallResult<bool> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(false);
        }

        let found = access_codes::find_matching(&self.db, code).await?;

        Ok(found.is_some())
    }
}
