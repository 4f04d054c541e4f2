use std::collections::HashMap;

use axum::extract::Multipart;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{WallError, WallResult};
use crate::models::ImageUpload;
use crate::services::{CommentForm, EditForm, UploadForm};

/// Name of the file input on the upload and edit forms.
pub const IMAGE_FIELD: &str = "image";

/// Text fields and the image file of a multipart submission.
#[derive(Debug, Default)]
pub struct Submission {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl Submission {
    pub async fn read(mut multipart: Multipart) -> WallResult<Self> {
        let mut submission = Submission::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Unreadable multipart body: {}", e);
            WallError::Invalid("The form could not be read. Please try again.")
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    debug!("Failed to read uploaded file: {}", e);
                    WallError::Invalid("The image could not be read. Please try again.")
                })?;
                submission.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field.text().await.map_err(|e| {
                    debug!("Failed to read form field {}: {}", name, e);
                    WallError::Invalid("The form could not be read. Please try again.")
                })?;
                submission.fields.insert(name, value);
            }
        }

        Ok(submission)
    }

    fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }

    pub fn into_upload(mut self) -> UploadForm {
        UploadForm {
            title: self.take("title"),
            description: self.take("description"),
            uploader: self.take("uploader"),
            secret_code: self.take("secret_code"),
            image: self.image,
        }
    }

    pub fn into_edit(mut self) -> EditForm {
        EditForm {
            title: self.take("title"),
            description: self.take("description"),
            uploader: self.take("uploader"),
            image: self.image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteMemoryForm {
    #[serde(default)]
    pub secret_code: String,
}

/// Comment form as posted by the detail page. Empty `parent_id` means a
/// top-level comment.
#[derive(Debug, Deserialize)]
pub struct CommentFormInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub commenter: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl CommentFormInput {
    pub fn into_form(self) -> WallResult<CommentForm> {
        let parent_id = match self.parent_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| WallError::Invalid("That comment can't be replied to."))?,
            ),
        };
        Ok(CommentForm {
            text: self.text,
            commenter: self.commenter,
            parent_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentTextForm {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(parent_id: Option<&str>) -> CommentFormInput {
        CommentFormInput {
            text: "Nice".to_string(),
            commenter: None,
            parent_id: parent_id.map(str::to_string),
        }
    }

    #[test]
    fn blank_parent_is_top_level() {
        assert_eq!(input(None).into_form().unwrap().parent_id, None);
        assert_eq!(input(Some(" ")).into_form().unwrap().parent_id, None);
        assert_eq!(input(Some("12")).into_form().unwrap().parent_id, Some(12));
        assert!(input(Some("abc")).into_form().is_err());
    }

    #[test]
    fn submission_maps_fields_to_forms() {
        let mut submission = Submission::default();
        for (name, value) in [
            ("title", "Roof garden"),
            ("description", "Week 3"),
            ("uploader", "Rina"),
            ("secret_code", "team"),
        ] {
            submission.fields.insert(name.to_string(), value.to_string());
        }

        let form = submission.into_upload();
        assert_eq!(form.title, "Roof garden");
        assert_eq!(form.secret_code, "team");
        assert!(form.image.is_none());
    }
}
