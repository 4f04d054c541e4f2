use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    Forbidden,
    NotFound,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Unavailable => "backend_unavailable",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum WallError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    Invalid(&'static str),

    #[error("Access code rejected")]
    InvalidAccessCode,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Comment {0} belongs to another commenter")]
    NotOwner(i64),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend rejected request ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

impl WallError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) | Self::Invalid(_) => ErrorKind::Validation,
            Self::InvalidAccessCode | Self::NotOwner(_) => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Request(_) | Self::Backend { .. } => ErrorKind::Unavailable,
            Self::Database(_) | Self::Storage(_) | Self::Io(_) | Self::Template(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unavailable => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short text for the alert dialog. Never includes backend details.
    pub fn alert_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Please fill in the {field} first."),
            Self::Invalid(reason) => (*reason).to_string(),
            Self::InvalidAccessCode => "Wrong secret code! Only the team can do this.".to_string(),
            Self::NotOwner(_) => "You can only change your own comments.".to_string(),
            Self::NotFound { entity, .. } => format!("{} not found.", capitalize(entity)),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Logs the full error when it is not the caller's fault.
    pub fn log(&self) {
        if matches!(self.kind(), ErrorKind::Unavailable | ErrorKind::Internal) {
            error!(kind = self.kind().as_str(), "{}", self);
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for WallError {
    fn into_response(self) -> Response {
        self.log();
        let body = Json(json!({
            "error": self.alert_message(),
            "kind": self.kind().as_str(),
        }));
        (self.status_code(), body).into_response()
    }
}
