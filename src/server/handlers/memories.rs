use axum::{
    extract::{Multipart, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::WallResult;
use crate::models::{Comment, CommentThread};
use crate::server::app::AppState;
use crate::server::forms::{DeleteMemoryForm, Submission};
use crate::server::identity::device_name;
use crate::services::is_owner;

#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub mode: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

/// Which dialog the detail page shows. Only one can be open at a time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Modal {
    None,
    Edit,
    Delete,
}

impl Modal {
    pub fn from_query(mode: Option<&str>) -> Self {
        match mode {
            Some("edit") => Modal::Edit,
            Some("delete") => Modal::Delete,
            _ => Modal::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modal::None => "none",
            Modal::Edit => "edit",
            Modal::Delete => "delete",
        }
    }
}

/// Banner text for the `notice` query parameter set by redirects.
pub fn notice_message(notice: Option<&str>) -> Option<&'static str> {
    match notice? {
        "added" => Some("Your project was added to the wall."),
        "saved" => Some("Changes saved."),
        "deleted" => Some("The project was deleted."),
        _ => None,
    }
}

pub async fn gallery(State(state): State<AppState>, Query(query): Query<NoticeQuery>) -> Response {
    let result: WallResult<Response> = async {
        let memories = state.memories.list().await?;
        let cards: Vec<Value> = memories
            .iter()
            .map(|memory| {
                json!({
                    "id": memory.id,
                    "title": memory.title,
                    "image_url": memory.image_url,
                    "uploader": memory.display_uploader(),
                })
            })
            .collect();

        let page = state.render(
            "gallery",
            &json!({
                "page_title": "Project Wall",
                "memories": cards,
                "notice": notice_message(query.notice.as_deref()),
            }),
        )?;
        Ok(page.into_response())
    }
    .await;

    state.page_or_alert(result, "/")
}

pub async fn new_memory_form(State(state): State<AppState>) -> Response {
    let page = state.render("new", &json!({ "page_title": "Add project" }));
    state.page_or_alert(page.map(IntoResponse::into_response), "/memory")
}

pub async fn create_memory(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result: WallResult<Response> = async {
        let form = Submission::read(multipart).await?.into_upload();
        state.memories.create(form).await?;
        Ok(Redirect::to("/memory?notice=added").into_response())
    }
    .await;

    state.page_or_alert(result, "/memory/new")
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DetailQuery>,
    headers: HeaderMap,
) -> Response {
    let result: WallResult<Response> = async {
        let memory = state.memories.get(id).await?;
        let threads = state.comments.list_threads(id).await?;
        let device = device_name(&headers);
        let comment_count: usize = threads.iter().map(|t| 1 + t.replies.len()).sum();

        let page = state.render(
            "detail",
            &json!({
                "page_title": memory.title,
                "memory": memory,
                "uploader": memory.display_uploader(),
                "mode": Modal::from_query(query.mode.as_deref()).as_str(),
                "notice": notice_message(query.notice.as_deref()),
                "threads": thread_views(&threads, device.as_deref()),
                "comment_count": comment_count,
                "device_name": device,
                "viewer_settings": serde_json::to_string(&state.viewer).unwrap_or_default(),
            }),
        )?;
        Ok(page.into_response())
    }
    .await;

    state.page_or_alert(result, "/memory")
}

fn comment_view(comment: &Comment, device: Option<&str>) -> Value {
    json!({
        "id": comment.id,
        "text": comment.text,
        "commenter": comment.commenter,
        "created_at": comment.created_at,
        "owned": is_owner(comment, device),
    })
}

fn thread_views(threads: &[CommentThread], device: Option<&str>) -> Vec<Value> {
    threads
        .iter()
        .map(|thread| {
            let mut view = comment_view(&thread.comment, device);
            view["replies"] = thread
                .replies
                .iter()
                .map(|reply| comment_view(reply, device))
                .collect();
            view
        })
        .collect()
}

pub async fn edit_memory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let result: WallResult<Response> = async {
        let form = Submission::read(multipart).await?.into_edit();
        state.memories.update(id, form).await?;
        Ok(Redirect::to(&format!("/memory/{}?notice=saved", id)).into_response())
    }
    .await;

    state.page_or_alert(result, &format!("/memory/{}?mode=edit", id))
}

pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<DeleteMemoryForm>,
) -> Response {
    let result: WallResult<Response> = async {
        state.memories.delete(id, &form.secret_code).await?;
        Ok(Redirect::to("/memory?notice=deleted").into_response())
    }
    .await;

    state.page_or_alert(result, &format!("/memory/{}?mode=delete", id))
}
