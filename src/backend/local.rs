use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::bucket::{public_url, ObjectStore};
use crate::errors::{WallError, WallResult};

/// Image bucket kept in a directory on local disk.
///
/// Public URLs follow the hosted layout so that the same path recovery works for
/// both backends; the server mounts the directory under that prefix.
pub struct LocalBucket {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalBucket {
    pub async fn create(
        root: impl Into<PathBuf>,
        bucket: &str,
        public_base_url: &str,
    ) -> WallResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            bucket: bucket.to_string(),
            public_base_url: public_base_url.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, path: &str) -> WallResult<PathBuf> {
        let relative = Path::new(path);
        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(relative)),
            _ => Err(WallError::Storage(format!("invalid object path '{}'", path))),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalBucket {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        upsert: bool,
    ) -> WallResult<()> {
        let target = self.object_path(path)?;
        let mut options = fs::OpenOptions::new();
        options.write(true);
        if upsert {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(&target).await.map_err(|err| {
            if err.kind() == IoErrorKind::AlreadyExists {
                WallError::Storage(format!("object '{}' already exists", path))
            } else {
                WallError::Io(err)
            }
        })?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        debug!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> WallResult<()> {
        for path in paths {
            let target = self.object_path(path)?;
            match fs::remove_file(&target).await {
                Ok(()) => debug!("Removed {}", target.display()),
                Err(err) if err.kind() == IoErrorKind::NotFound => {
                    debug!("Object {} already gone", target.display())
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        public_url(&self.public_base_url, &self.bucket, path)
    }
}
