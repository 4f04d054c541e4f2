use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::app::AppState;

pub async fn home(State(state): State<AppState>) -> Response {
    let page = state.render("home", &json!({ "page_title": "Smart Project Wall" }));
    state.page_or_alert(page.map(IntoResponse::into_response), "/")
}

pub async fn about(State(state): State<AppState>) -> Response {
    let page = state.render("about", &json!({ "page_title": "About" }));
    state.page_or_alert(page.map(IntoResponse::into_response), "/")
}
