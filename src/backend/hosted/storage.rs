use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use super::{check, HostedClient};
use crate::backend::bucket::{public_url, ObjectStore};
use crate::errors::WallResult;

/// Image bucket behind the hosted storage API.
#[derive(Clone)]
pub struct HostedBucket {
    client: HostedClient,
    bucket: String,
}

impl HostedBucket {
    pub fn new(client: HostedClient, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for HostedBucket {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> WallResult<()> {
        let size = bytes.len();
        let response = self
            .client
            .storage(Method::POST, &format!("object/{}/{}", self.bucket, path))
            .header("x-upsert", if upsert { "true" } else { "false" })
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;
        check(response).await?;

        debug!("Uploaded {} bytes to {}/{}", size, self.bucket, path);
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> WallResult<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .storage(Method::DELETE, &format!("object/{}", self.bucket))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;
        check(response).await?;

        debug!("Removed {:?} from {}", paths, self.bucket);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        public_url(self.client.base_url(), &self.bucket, path)
    }
}
