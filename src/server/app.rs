use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{api, assets, comments, health, memories, pages};
use crate::backend::bucket::PUBLIC_OBJECT_PREFIX;
use crate::backend::WallBackend;
use crate::common::load_templates;
use crate::config::WallConfig;
use crate::errors::{WallError, WallResult};
use crate::services::{CommentService, MemoryService};
use crate::viewer::ViewerSettings;

/// Largest accepted request body, large enough for phone photos.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub memories: MemoryService,
    pub comments: CommentService,
    pub templates: Arc<Handlebars<'static>>,
    pub viewer: ViewerSettings,
}

impl AppState {
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> WallResult<Html<String>> {
        Ok(Html(self.templates.render(template, data)?))
    }

    /// Renders an error as the alert page with a link back to `back`.
    pub fn alert(&self, error: WallError, back: &str) -> Response {
        error.log();
        let status = error.status_code();
        let data = json!({
            "title": "Oops",
            "message": error.alert_message(),
            "back": back,
        });
        match self.templates.render("alert", &data) {
            Ok(page) => (status, Html(page)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render alert page: {}", e);
                (status, error.alert_message()).into_response()
            }
        }
    }

    /// Page response, or the alert page when the request failed.
    pub fn page_or_alert(&self, result: WallResult<Response>, back: &str) -> Response {
        result.unwrap_or_else(|error| self.alert(error, back))
    }
}

pub async fn create_app(backend: WallBackend, config: &WallConfig) -> Result<Router> {
    let templates = load_templates().context("Failed to load page templates")?;
    let state = AppState {
        memories: MemoryService::new(backend.clone()),
        comments: CommentService::new(backend.store.clone()),
        templates: Arc::new(templates),
        viewer: config.viewer.clone(),
    };

    let cors = match config.cors_origin.as_deref() {
        Some(origin) if origin != "*" => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin {}", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/assets/:file", get(assets::serve_asset))
        .route("/memory", get(memories::gallery).post(memories::create_memory))
        .route("/memory/new", get(memories::new_memory_form))
        .route("/memory/:id", get(memories::detail))
        .route("/memory/:id/edit", post(memories::edit_memory))
        .route("/memory/:id/delete", post(memories::delete_memory))
        .route("/memory/:id/comments", post(comments::post_comment))
        .route(
            "/memory/:id/comments/:comment_id/edit",
            post(comments::edit_comment),
        )
        .route(
            "/memory/:id/comments/:comment_id/delete",
            post(comments::delete_comment),
        )
        .nest("/api/v1", api_v1_routes());

    if let Some(dir) = &backend.local_bucket_dir {
        let mount = format!("{}/{}", PUBLIC_OBJECT_PREFIX, config.bucket);
        app = app.nest_service(&mount, ServeDir::new(dir));
    }

    let app = app
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/memories", get(api::list_memories).post(api::create_memory))
        .route(
            "/memories/:id",
            get(api::get_memory)
                .put(api::update_memory)
                .delete(api::delete_memory),
        )
        .route(
            "/memories/:id/comments",
            get(api::list_comments).post(api::create_comment),
        )
        .route(
            "/comments/:id",
            put(api::update_comment).delete(api::delete_comment),
        )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
