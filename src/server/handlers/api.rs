//! JSON API mirroring the page actions.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::errors::WallResult;
use crate::models::{Comment, CommentThread, Memory};
use crate::server::app::AppState;
use crate::server::forms::Submission;
use crate::server::identity::{device_name, remember_cookie};
use crate::services::CommentForm;

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMemoryRequest {
    #[serde(default)]
    pub secret_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
    pub commenter: Option<String>,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub text: String,
}

pub async fn list_memories(State(state): State<AppState>) -> WallResult<Json<Vec<Memory>>> {
    Ok(Json(state.memories.list().await?))
}

pub async fn create_memory(
    State(state): State<AppState>,
    multipart: Multipart,
) -> WallResult<(StatusCode, Json<Memory>)> {
    let form = Submission::read(multipart).await?.into_upload();
    let memory = state.memories.create(form).await?;
    Ok((StatusCode::CREATED, Json(memory)))
}

pub async fn get_memory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WallResult<Json<Memory>> {
    Ok(Json(state.memories.get(id).await?))
}

pub async fn update_memory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> WallResult<Json<Memory>> {
    let form = Submission::read(multipart).await?.into_edit();
    Ok(Json(state.memories.update(id, form).await?))
}

pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DeleteMemoryRequest>,
) -> WallResult<StatusCode> {
    state.memories.delete(id, &payload.secret_code).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WallResult<Json<Vec<CommentThread>>> {
    state.memories.get(id).await?;
    Ok(Json(state.comments.list_threads(id).await?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> WallResult<Response> {
    let form = CommentForm {
        text: payload.text,
        commenter: payload.commenter,
        parent_id: payload.parent_id,
    };
    let comment = state.comments.post(id, form).await?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, remember_cookie(&comment.commenter))],
        Json(comment),
    )
        .into_response())
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateCommentRequest>,
) -> WallResult<Json<Comment>> {
    let device = device_name(&headers);
    let comment = state
        .comments
        .edit(id, &payload.text, device.as_deref())
        .await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> WallResult<StatusCode> {
    let device = device_name(&headers);
    state.comments.delete(id, device.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
