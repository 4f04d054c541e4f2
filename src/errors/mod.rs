//! Error types for the wall.
//!
//! Every failure is collapsed into [`WallError`]. The error carries enough detail
//! for the logs, while [`WallError::alert_message`] gives the short, static text
//! that is shown to the person who triggered the action.
//!
//! ```rust
//! use memory_wall::errors::{ErrorKind, WallError};
//!
//! let err = WallError::MissingField("title");
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! assert_eq!(err.alert_message(), "Please fill in the title first.");
//! ```

mod wall_error;

pub use wall_error::{ErrorKind, WallError};

/// Result alias used across services and backends.
pub type WallResult<T> = Result<T, WallError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn kinds_map_to_status_codes() {
        assert_eq!(
            WallError::MissingField("image").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WallError::InvalidAccessCode.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WallError::not_found("memory", 3).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WallError::Backend {
                status: 503,
                message: "down".into()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            WallError::Storage("disk full".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn alerts_do_not_leak_details() {
        let err = WallError::Backend {
            status: 500,
            message: "relation \"memories\" does not exist".into(),
        };
        assert!(!err.alert_message().contains("memories"));
        assert!(err.to_string().contains("memories"));
    }

    #[test]
    fn hand_written_alerts() {
        assert_eq!(
            WallError::InvalidAccessCode.alert_message(),
            "Wrong secret code! Only the team can do this."
        );
        assert_eq!(
            WallError::NotOwner(4).alert_message(),
            "You can only change your own comments."
        );
        assert_eq!(
            WallError::not_found("comment", 9).alert_message(),
            "Comment not found."
        );
    }

    #[test]
    fn result_alias() {
        let result: WallResult<()> = Err(WallError::NotOwner(1));
        assert!(result.is_err());
    }
}
