//! Shared fixtures: a wall backed by a temp-file SQLite database and a temp
//! directory bucket, with call recording around both stores.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use axum_test::TestServer;
use memory_wall::backend::local::LocalBucket;
use memory_wall::backend::sql::SqlStore;
use memory_wall::backend::{ObjectStore, WallBackend, WallStore};
use memory_wall::config::WallConfig;
use memory_wall::database::seed_data::add_access_code;
use memory_wall::database::setup_database;
use memory_wall::errors::{WallError, WallResult};
use memory_wall::models::{Comment, Memory, MemoryChanges, NewComment, NewMemory};
use memory_wall::server::app::create_app;
use sea_orm::{Database, DatabaseConnection};
use tempfile::{NamedTempFile, TempDir};

pub const ACCESS_CODE: &str = "Team-Secret";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image data";

/// Table store that records the name of every call before delegating.
pub struct RecordingStore {
    inner: SqlStore,
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingStore {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WallStore for RecordingStore {
    async fn list_memories(&self) -> WallResult<Vec<Memory>> {
        self.record("list_memories");
        self.inner.list_memories().await
    }
    async fn find_memory(&self, id: i64) -> WallResult<Option<Memory>> {
        self.record("find_memory");
        self.inner.find_memory(id).await
    }
    async fn insert_memory(&self, memory: NewMemory) -> WallResult<Memory> {
        self.record("insert_memory");
        self.inner.insert_memory(memory).await
    }
    async fn update_memory(&self, id: i64, changes: MemoryChanges) -> WallResult<Memory> {
        self.record("update_memory");
        self.inner.update_memory(id, changes).await
    }
    async fn delete_memory(&self, id: i64) -> WallResult<()> {
        self.record("delete_memory");
        self.inner.delete_memory(id).await
    }
    async fn list_comments(&self, memory_id: i64) -> WallResult<Vec<Comment>> {
        self.record("list_comments");
        self.inner.list_comments(memory_id).await
    }
    async fn find_comment(&self, id: i64) -> WallResult<Option<Comment>> {
        self.record("find_comment");
        self.inner.find_comment(id).await
    }
    async fn insert_comment(&self, comment: NewComment) -> WallResult<Comment> {
        self.record("insert_comment");
        self.inner.insert_comment(comment).await
    }
    async fn update_comment_text(&self, id: i64, text: &str) -> WallResult<Comment> {
        self.record("update_comment_text");
        self.inner.update_comment_text(id, text).await
    }
    async fn delete_comment(&self, id: i64) -> WallResult<()> {
        self.record("delete_comment");
        self.inner.delete_comment(id).await
    }
    async fn delete_replies(&self, parent_id: i64) -> WallResult<u64> {
        self.record("delete_replies");
        self.inner.delete_replies(parent_id).await
    }
    async fn delete_comments_for_memory(&self, memory_id: i64) -> WallResult<u64> {
        self.record("delete_comments_for_memory");
        self.inner.delete_comments_for_memory(memory_id).await
    }
    async fn access_code_exists(&self, code: &str) -> WallResult<bool> {
        self.record("access_code_exists");
        self.inner.access_code_exists(code).await
    }
}

/// Bucket that records uploads and removals, optionally failing removals.
pub struct RecordingBucket {
    inner: LocalBucket,
    uploads: Mutex<Vec<String>>,
    removals: Mutex<Vec<String>>,
    fail_removals: AtomicBool,
}

impl RecordingBucket {
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn removals(&self) -> Vec<String> {
        self.removals.lock().unwrap().clone()
    }

    pub fn fail_removals(&self) {
        self.fail_removals.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for RecordingBucket {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> WallResult<()> {
        self.uploads.lock().unwrap().push(path.to_string());
        self.inner.upload(path, bytes, content_type, upsert).await
    }

    async fn remove(&self, paths: &[String]) -> WallResult<()> {
        self.removals.lock().unwrap().extend(paths.iter().cloned());
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(WallError::Storage("bucket offline".to_string()));
        }
        self.inner.remove(paths).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }
}

pub struct TestWall {
    pub backend: WallBackend,
    pub store: Arc<RecordingStore>,
    pub bucket: Arc<RecordingBucket>,
    pub db: DatabaseConnection,
    pub bucket_dir: PathBuf,
    _db_file: NamedTempFile,
    _storage: TempDir,
}

impl TestWall {
    pub fn object_exists(&self, path: &str) -> bool {
        self.bucket_dir.join(path).exists()
    }
}

pub async fn setup_wall() -> Result<TestWall> {
    let db_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", db_file.path().display());
    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;
    add_access_code(&db, ACCESS_CODE).await?;

    let storage = TempDir::new()?;
    let bucket_dir = storage.path().join("images");
    let local = LocalBucket::create(bucket_dir.clone(), "images", "").await?;

    let store = Arc::new(RecordingStore {
        inner: SqlStore::new(db.clone()),
        calls: Mutex::new(Vec::new()),
    });
    let bucket = Arc::new(RecordingBucket {
        inner: local,
        uploads: Mutex::new(Vec::new()),
        removals: Mutex::new(Vec::new()),
        fail_removals: AtomicBool::new(false),
    });

    let backend = WallBackend::new(store.clone(), bucket.clone())
        .with_local_bucket_dir(bucket_dir.clone());

    Ok(TestWall {
        backend,
        store,
        bucket,
        db,
        bucket_dir,
        _db_file: db_file,
        _storage: storage,
    })
}

pub async fn setup_server() -> Result<(TestServer, TestWall)> {
    let wall = setup_wall().await?;
    let app = create_app(wall.backend.clone(), &WallConfig::default()).await?;
    let server = TestServer::new(app)?;
    Ok((server, wall))
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    const BOUNDARY: &'static str = "memory-wall-test-boundary";

    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", Self::BOUNDARY)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                Self::BOUNDARY,
                name,
                value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                Self::BOUNDARY,
                name,
                file_name,
                content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Bytes {
        self.body
            .extend_from_slice(format!("--{}--\r\n", Self::BOUNDARY).as_bytes());
        Bytes::from(self.body)
    }
}

/// A complete upload form with the given title.
pub fn upload_body(title: &str, code: &str) -> Bytes {
    MultipartBody::new()
        .file("image", "site visit.png", "image/png", PNG_BYTES)
        .text("title", title)
        .text("description", "Pouring the foundation")
        .text("uploader", "Rina")
        .text("secret_code", code)
        .finish()
}
