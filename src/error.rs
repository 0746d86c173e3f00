use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("You must be logged in")]
    AuthRequired,

    #[error("You are not authorized for this action")]
    NotOwner,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Session error")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    /// For `map_err` at a storage call site: tags the failure with the
    /// operation's public message while keeping the cause for the log.
    pub fn storage(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Storage { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthRequired => StatusCode::UNAUTHORIZED,
            AppError::NotOwner => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage { message, source } => {
                tracing::error!(error = %source, "{message}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Session(source) => {
                tracing::error!(error = %source, "session store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
