//! Storage seams of the wall.
//!
//! The application talks to two collaborators: a table store holding the
//! `memories`, `comments` and `access_codes` rows, and an object bucket holding
//! the uploaded images. Both come in a hosted flavour (REST calls against the
//! backend-as-a-service) and a local flavour (SQLite through sea-orm and a
//! directory on disk).

pub mod bucket;
pub mod hosted;
pub mod local;
pub mod sql;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::{BackendConfig, WallConfig};
use crate::database::{establish_connection, get_database_url, setup_database};
use crate::errors::WallResult;
use crate::models::{Comment, Memory, MemoryChanges, NewComment, NewMemory};

pub use bucket::ObjectStore;

/// Row operations against the wall tables.
#[async_trait]
pub trait WallStore: Send + Sync {
    /// All memories, newest first.
    async fn list_memories(&self) -> WallResult<Vec<Memory>>;
    async fn find_memory(&self, id: i64) -> WallResult<Option<Memory>>;
    async fn insert_memory(&self, memory: NewMemory) -> WallResult<Memory>;
    async fn update_memory(&self, id: i64, changes: MemoryChanges) -> WallResult<Memory>;
    async fn delete_memory(&self, id: i64) -> WallResult<()>;

    /// Comments of one memory, oldest first.
    async fn list_comments(&self, memory_id: i64) -> WallResult<Vec<Comment>>;
    async fn find_comment(&self, id: i64) -> WallResult<Option<Comment>>;
    async fn insert_comment(&self, comment: NewComment) -> WallResult<Comment>;
    async fn update_comment_text(&self, id: i64, text: &str) -> WallResult<Comment>;
    async fn delete_comment(&self, id: i64) -> WallResult<()>;
    async fn delete_replies(&self, parent_id: i64) -> WallResult<u64>;
    async fn delete_comments_for_memory(&self, memory_id: i64) -> WallResult<u64>;

    /// Whether `code` matches a stored access code, ignoring case.
    async fn access_code_exists(&self, code: &str) -> WallResult<bool>;
}

/// The pair of stores a running wall uses.
#[derive(Clone)]
pub struct WallBackend {
    pub store: Arc<dyn WallStore>,
    pub objects: Arc<dyn ObjectStore>,
    /// Set when images live on local disk and must be served by the app.
    pub local_bucket_dir: Option<PathBuf>,
}

impl WallBackend {
    pub fn new(store: Arc<dyn WallStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            objects,
            local_bucket_dir: None,
        }
    }

    pub fn with_local_bucket_dir(mut self, dir: PathBuf) -> Self {
        self.local_bucket_dir = Some(dir);
        self
    }
}

/// Builds the backend described by the configuration.
pub async fn connect(config: &WallConfig) -> Result<WallBackend> {
    match &config.backend {
        BackendConfig::Local {
            database,
            storage_dir,
        } => {
            let db = establish_connection(&get_database_url(Some(database))).await?;
            setup_database(&db).await?;
            info!("Database migrations completed");

            let bucket = local::LocalBucket::create(
                storage_dir.join(&config.bucket),
                &config.bucket,
                &config.public_base_url,
            )
            .await?;
            info!(
                "Using local backend: database {}, bucket {}",
                database,
                bucket.root().display()
            );

            let dir = bucket.root().to_path_buf();
            Ok(
                WallBackend::new(Arc::new(sql::SqlStore::new(db)), Arc::new(bucket))
                    .with_local_bucket_dir(dir),
            )
        }
        BackendConfig::Hosted { url, anon_key } => {
            let client = hosted::HostedClient::new(url, anon_key)?;
            info!("Using hosted backend at {}", client.base_url());

            Ok(WallBackend::new(
                Arc::new(hosted::HostedStore::new(client.clone())),
                Arc::new(hosted::HostedBucket::new(client, &config.bucket)),
            ))
        }
    }
}
