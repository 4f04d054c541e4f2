use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Form,
};

use crate::errors::{WallError, WallResult};
use crate::models::Comment;
use crate::server::app::AppState;
use crate::server::forms::{CommentFormInput, CommentTextForm};
use crate::server::identity::{device_name, remember_cookie};

fn comment_anchor(memory_id: i64, comment_id: i64) -> String {
    format!("/memory/{}#comment-{}", memory_id, comment_id)
}

/// Loads a comment addressed through a memory URL, refusing comments of other memories.
async fn scoped_comment(state: &AppState, memory_id: i64, comment_id: i64) -> WallResult<Comment> {
    let comment = state.comments.get(comment_id).await?;
    if comment.memory_id != memory_id {
        return Err(WallError::not_found("comment", comment_id));
    }
    Ok(comment)
}

/// Posts a comment or reply and remembers the commenter name on this device.
pub async fn post_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(input): Form<CommentFormInput>,
) -> Response {
    let result: WallResult<Response> = async {
        let comment = state.comments.post(id, input.into_form()?).await?;
        Ok((
            [(header::SET_COOKIE, remember_cookie(&comment.commenter))],
            Redirect::to(&comment_anchor(id, comment.id)),
        )
            .into_response())
    }
    .await;

    state.page_or_alert(result, &format!("/memory/{}#comments", id))
}

pub async fn edit_comment(
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(i64, i64)>,
    headers: HeaderMap,
    Form(form): Form<CommentTextForm>,
) -> Response {
    let result: WallResult<Response> = async {
        scoped_comment(&state, id, comment_id).await?;
        let device = device_name(&headers);
        state
            .comments
            .edit(comment_id, &form.text, device.as_deref())
            .await?;
        Ok(Redirect::to(&comment_anchor(id, comment_id)).into_response())
    }
    .await;

    state.page_or_alert(result, &format!("/memory/{}#comments", id))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Response {
    let result: WallResult<Response> = async {
        scoped_comment(&state, id, comment_id).await?;
        let device = device_name(&headers);
        state.comments.delete(comment_id, device.as_deref()).await?;
        Ok(Redirect::to(&format!("/memory/{}#comments", id)).into_response())
    }
    .await;

    state.page_or_alert(result, &format!("/memory/{}#comments", id))
}
