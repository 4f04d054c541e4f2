use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::errors::WallResult;

/// Path segment between the backend base URL and `{bucket}/{path}` in public URLs.
pub const PUBLIC_OBJECT_PREFIX: &str = "/storage/v1/object/public";

/// Object operations against the image bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Stores `bytes` at `path`. Without `upsert` an existing object is an error.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> WallResult<()>;

    /// Removes objects; paths that do not exist are skipped.
    async fn remove(&self, paths: &[String]) -> WallResult<()>;

    fn public_url(&self, path: &str) -> String;

    /// Recovers the object path from one of this bucket's public URLs.
    fn path_from_url(&self, url: &str) -> Option<String> {
        path_from_public_url(url, self.bucket())
    }
}

pub fn public_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}{}/{}/{}",
        base_url.trim_end_matches('/'),
        PUBLIC_OBJECT_PREFIX,
        bucket,
        path
    )
}

pub fn path_from_public_url(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("{}/{}/", PUBLIC_OBJECT_PREFIX, bucket);
    let (_, rest) = url.split_once(&marker)?;
    let path = rest.split(['?', '#']).next().unwrap_or_default();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

fn unsafe_chars() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static regex"))
}

pub fn sanitize_file_name(file_name: &str) -> String {
    let trimmed = file_name.trim();
    let sanitized = unsafe_chars().replace_all(trimmed, "_");
    if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized.into_owned()
    }
}

/// Object name for a fresh upload: `{millis}-{file name}`.
pub fn upload_name(unix_millis: i64, file_name: &str) -> String {
    format!("{}-{}", unix_millis, sanitize_file_name(file_name))
}

/// Object name for an image replacing the one of memory `memory_id`.
pub fn replacement_name(memory_id: i64, unix_millis: i64, extension: Option<&str>) -> String {
    match extension.map(sanitize_file_name) {
        Some(ext) => format!("{}-{}.{}", memory_id, unix_millis, ext),
        None => format!("{}-{}", memory_id, unix_millis),
    }
}
