use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::WallStore;
use crate::errors::{WallError, WallResult};
use crate::models::{Comment, CommentThread, NewComment};
use crate::services::validation::{require, resolve_commenter};

#[derive(Clone, Debug, Default)]
pub struct CommentForm {
    pub text: String,
    pub commenter: Option<String>,
    /// Set when replying to a top-level comment.
    pub parent_id: Option<i64>,
}

/// Comments of a memory, grouped into one level of threads.
///
/// Editing and deleting are limited to the comment's "owner": the device whose
/// remembered display name equals the stored commenter. There is no account
/// behind this, so it only keeps people from changing each other's comments by
/// accident.
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn WallStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn WallStore>) -> Self {
        Self { store }
    }

    pub async fn list_threads(&self, memory_id: i64) -> WallResult<Vec<CommentThread>> {
        let comments = self.store.list_comments(memory_id).await?;
        Ok(build_threads(comments))
    }

    pub async fn get(&self, id: i64) -> WallResult<Comment> {
        self.store
            .find_comment(id)
            .await?
            .ok_or_else(|| WallError::not_found("comment", id))
    }

    /// Posts a top-level comment or, with `parent_id`, a reply.
    pub async fn post(&self, memory_id: i64, form: CommentForm) -> WallResult<Comment> {
        let text = require(&form.text, "comment")?;
        let commenter = resolve_commenter(form.commenter.as_deref());

        if self.store.find_memory(memory_id).await?.is_none() {
            return Err(WallError::not_found("memory", memory_id));
        }

        if let Some(parent_id) = form.parent_id {
            let parent = self.get(parent_id).await?;
            if parent.memory_id != memory_id {
                return Err(WallError::Invalid("That comment belongs to another memory."));
            }
            if parent.is_reply() {
                return Err(WallError::Invalid("Replies can't be replied to."));
            }
        }

        let comment = self
            .store
            .insert_comment(NewComment {
                memory_id,
                text,
                commenter,
                parent_id: form.parent_id,
            })
            .await?;

        debug!(
            "Comment {} posted on memory {} by {}",
            comment.id, memory_id, comment.commenter
        );
        Ok(comment)
    }

    /// Replaces the text of a comment owned by `device`.
    pub async fn edit(&self, id: i64, text: &str, device: Option<&str>) -> WallResult<Comment> {
        let text = require(text, "comment")?;
        let comment = self.get(id).await?;
        ensure_owner(&comment, device)?;

        self.store.update_comment_text(id, &text).await
    }

    /// Deletes a comment owned by `device`, together with its replies.
    pub async fn delete(&self, id: i64, device: Option<&str>) -> WallResult<Comment> {
        let comment = self.get(id).await?;
        ensure_owner(&comment, device)?;

        if !comment.is_reply() {
            let replies = self.store.delete_replies(id).await?;
            if replies > 0 {
                info!("Deleted {} replies of comment {}", replies, id);
            }
        }
        self.store.delete_comment(id).await?;
        Ok(comment)
    }
}

/// Whether a device with display name `device` may change `comment`.
pub fn is_owner(comment: &Comment, device: Option<&str>) -> bool {
    device.is_some_and(|name| name == comment.commenter)
}

fn ensure_owner(comment: &Comment, device: Option<&str>) -> WallResult<()> {
    if is_owner(comment, device) {
        Ok(())
    } else {
        Err(WallError::NotOwner(comment.id))
    }
}

/// Groups comments (already in display order) into threads. Replies keep their
/// relative order; replies whose parent is not a top-level comment in the list
/// are dropped.
pub fn build_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
    let mut threads: Vec<CommentThread> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut replies: Vec<Comment> = Vec::new();

    for comment in comments {
        if comment.is_reply() {
            replies.push(comment);
        } else {
            index.insert(comment.id, threads.len());
            threads.push(CommentThread {
                comment,
                replies: Vec::new(),
            });
        }
    }

    for reply in replies {
        let slot = reply.parent_id.and_then(|parent| index.get(&parent).copied());
        if let Some(slot) = slot {
            threads[slot].replies.push(reply);
        }
    }

    threads
}
