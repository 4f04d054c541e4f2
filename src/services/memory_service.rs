use chrono::Utc;
use tracing::{info, warn};

use crate::backend::bucket::{replacement_name, upload_name};
use crate::backend::WallBackend;
use crate::errors::{WallError, WallResult};
use crate::models::{ImageUpload, Memory, MemoryChanges, NewMemory};
use crate::services::access_service::AccessService;
use crate::services::validation::{optional_image, require, require_image};

/// Fields of the upload form, as submitted.
#[derive(Clone, Debug, Default)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub uploader: String,
    pub secret_code: String,
    pub image: Option<ImageUpload>,
}

/// Fields of the edit dialog. A missing image keeps the current one.
#[derive(Clone, Debug, Default)]
pub struct EditForm {
    pub title: String,
    pub description: String,
    pub uploader: String,
    pub image: Option<ImageUpload>,
}

#[derive(Clone)]
pub struct MemoryService {
    backend: WallBackend,
    access: AccessService,
}

impl MemoryService {
    pub fn new(backend: WallBackend) -> Self {
        let access = AccessService::new(backend.store.clone());
        Self { backend, access }
    }

    pub async fn list(&self) -> WallResult<Vec<Memory>> {
        self.backend.store.list_memories().await
    }

    pub async fn get(&self, id: i64) -> WallResult<Memory> {
        self.backend
            .store
            .find_memory(id)
            .await?
            .ok_or_else(|| WallError::not_found("memory", id))
    }

    /// Validates the form, checks the secret code, stores the image and
    /// records the memory. Nothing reaches the backend if a field is blank.
    pub async fn create(&self, form: UploadForm) -> WallResult<Memory> {
        let image = require_image(form.image)?;
        let title = require(&form.title, "title")?;
        let description = require(&form.description, "description")?;
        let uploader = require(&form.uploader, "uploader name")?;
        require(&form.secret_code, "secret code")?;

        self.access.verify(&form.secret_code).await?;

        let objects = &self.backend.objects;
        let path = upload_name(Utc::now().timestamp_millis(), &image.file_name);
        objects
            .upload(&path, image.bytes, &image.content_type, false)
            .await?;
        let image_url = objects.public_url(&path);

        let memory = self
            .backend
            .store
            .insert_memory(NewMemory {
                title,
                description,
                image_url,
                uploader,
            })
            .await?;

        info!("Created memory {} with image {}", memory.id, path);
        Ok(memory)
    }

    /// Saves an edit. A new image is uploaded first and the previous object is
    /// removed only after the record points at the new one.
    pub async fn update(&self, id: i64, form: EditForm) -> WallResult<Memory> {
        let title = require(&form.title, "title")?;
        let uploader = require(&form.uploader, "uploader name")?;
        let description = form.description.trim().to_string();

        let current = self.get(id).await?;
        let objects = &self.backend.objects;

        let (image_url, replaced) = match optional_image(form.image) {
            Some(image) => {
                let ext = image.extension();
                let path = replacement_name(id, Utc::now().timestamp_millis(), ext.as_deref());
                objects
                    .upload(&path, image.bytes, &image.content_type, true)
                    .await?;
                (objects.public_url(&path), objects.path_from_url(&current.image_url))
            }
            None => (current.image_url.clone(), None),
        };

        let memory = self
            .backend
            .store
            .update_memory(
                id,
                MemoryChanges {
                    title,
                    description,
                    uploader,
                    image_url,
                },
            )
            .await?;

        if let Some(old_path) = replaced {
            if let Err(e) = objects.remove(&[old_path.clone()]).await {
                warn!("Failed to remove replaced image {}: {}", old_path, e);
            }
        }

        info!("Updated memory {}", id);
        Ok(memory)
    }

    /// Deletes a memory after checking the secret code: comments first, then
    /// the stored image, then the record. A wrong code changes nothing.
    pub async fn delete(&self, id: i64, secret_code: &str) -> WallResult<Memory> {
        let memory = self.get(id).await?;
        self.access.verify(secret_code).await?;

        let comments = self.backend.store.delete_comments_for_memory(id).await?;

        if let Some(path) = self.backend.objects.path_from_url(&memory.image_url) {
            if let Err(e) = self.backend.objects.remove(&[path.clone()]).await {
                warn!("Failed to remove image {} of memory {}: {}", path, id, e);
            }
        }

        self.backend.store.delete_memory(id).await?;
        info!("Deleted memory {} and {} comments", id, comments);
        Ok(memory)
    }
}
