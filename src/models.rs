//! Records exchanged with the wall backends.
//!
//! These mirror the hosted `memories` and `comments` tables column for column so
//! the same types deserialize from the REST API and convert from the local
//! sea-orm entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Display name used for comments posted without a name.
pub const ANONYMOUS_COMMENTER: &str = "Anonim";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub uploader: String,
    pub created_at: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Memory {
    /// Uploader shown on cards, falling back to the anonymous name.
    pub fn display_uploader(&self) -> &str {
        if self.uploader.trim().is_empty() {
            ANONYMOUS_COMMENTER
        } else {
            &self.uploader
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewMemory {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub uploader: String,
}

/// Columns an edit is allowed to touch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryChanges {
    pub title: String,
    pub description: String,
    pub uploader: String,
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub memory_id: i64,
    pub text: String,
    pub commenter: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub memory_id: i64,
    pub text: String,
    pub commenter: String,
    pub parent_id: Option<i64>,
}

/// A top-level comment together with its replies, oldest first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// An image file received from a form, not yet stored.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn is_empty(&self) -> bool {
        self.file_name.trim().is_empty() || self.bytes.is_empty()
    }

    /// Lowercased extension of the original file name, if it has one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
