use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check, HostedClient};
use crate::backend::WallStore;
use crate::errors::{WallError, WallResult};
use crate::models::{Comment, Memory, MemoryChanges, NewComment, NewMemory};

const RETURN_REPRESENTATION: &str = "return=representation";

/// Wall tables behind the hosted PostgREST API.
#[derive(Clone)]
pub struct HostedStore {
    client: HostedClient,
}

#[derive(Deserialize)]
struct AccessCodeRow {
    code: String,
}

impl HostedStore {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> WallResult<Vec<T>> {
        let response = self
            .client
            .rest(Method::GET, table)
            .query(query)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn first<T: DeserializeOwned>(&self, table: &str, id: i64) -> WallResult<Option<T>> {
        let rows = self
            .fetch(table, &[("select", "*".into()), ("id", format!("eq.{}", id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert<T: DeserializeOwned>(&self, table: &str, body: Value) -> WallResult<T> {
        let response = self
            .client
            .rest(Method::POST, table)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&body)
            .send()
            .await?;
        let rows: Vec<T> = check(response).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| WallError::Backend {
            status: 200,
            message: format!("insert into {} returned no row", table),
        })
    }

    async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        entity: &'static str,
        id: i64,
        body: Value,
    ) -> WallResult<T> {
        let response = self
            .client
            .rest(Method::PATCH, table)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&body)
            .send()
            .await?;
        let rows: Vec<T> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| WallError::not_found(entity, id))
    }

    /// Deletes matching rows and reports how many went away.
    async fn delete_where(&self, table: &str, column: &str, value: i64) -> WallResult<u64> {
        let response = self
            .client
            .rest(Method::DELETE, table)
            .query(&[(column, format!("eq.{}", value))])
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        Ok(rows.len() as u64)
    }
}

#[async_trait]
impl WallStore for HostedStore {
    async fn list_memories(&self) -> WallResult<Vec<Memory>> {
        self.fetch(
            "memories",
            &[("select", "*".into()), ("order", "created_at.desc,id.desc".into())],
        )
        .await
    }

    async fn find_memory(&self, id: i64) -> WallResult<Option<Memory>> {
        self.first("memories", id).await
    }

    async fn insert_memory(&self, memory: NewMemory) -> WallResult<Memory> {
        self.insert("memories", json!(memory)).await
    }

    async fn update_memory(&self, id: i64, changes: MemoryChanges) -> WallResult<Memory> {
        self.update("memories", "memory", id, json!(changes)).await
    }

    async fn delete_memory(&self, id: i64) -> WallResult<()> {
        match self.delete_where("memories", "id", id).await? {
            0 => Err(WallError::not_found("memory", id)),
            _ => Ok(()),
        }
    }

    async fn list_comments(&self, memory_id: i64) -> WallResult<Vec<Comment>> {
        self.fetch(
            "comments",
            &[
                ("select", "*".into()),
                ("memory_id", format!("eq.{}", memory_id)),
                ("order", "created_at.asc,id.asc".into()),
            ],
        )
        .await
    }

    async fn find_comment(&self, id: i64) -> WallResult<Option<Comment>> {
        self.first("comments", id).await
    }

    async fn insert_comment(&self, comment: NewComment) -> WallResult<Comment> {
        self.insert("comments", json!(comment)).await
    }

    async fn update_comment_text(&self, id: i64, text: &str) -> WallResult<Comment> {
        self.update("comments", "comment", id, json!({ "text": text })).await
    }

    async fn delete_comment(&self, id: i64) -> WallResult<()> {
        match self.delete_where("comments", "id", id).await? {
            0 => Err(WallError::not_found("comment", id)),
            _ => Ok(()),
        }
    }

    async fn delete_replies(&self, parent_id: i64) -> WallResult<u64> {
        self.delete_where("comments", "parent_id", parent_id).await
    }

    async fn delete_comments_for_memory(&self, memory_id: i64) -> WallResult<u64> {
        self.delete_where("comments", "memory_id", memory_id).await
    }

    async fn access_code_exists(&self, code: &str) -> WallResult<bool> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(false);
        }

        // ilike treats `%` and `_` as wildcards, so confirm the match here
        let rows: Vec<AccessCodeRow> = self
            .fetch(
                "access_codes",
                &[("select", "code".into()), ("code", format!("ilike.{}", code))],
            )
            .await?;
        let wanted = code.to_lowercase();
        Ok(rows.iter().any(|row| row.code.trim().to_lowercase() == wanted))
    }
}
