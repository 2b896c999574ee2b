use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::store::StoreError;
use crate::views;

/// Failure of a request handler, rendered as an HTML error page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("contact not found")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, Html(views::not_found_page())).into_response(),
            AppError::Store(err) => {
                error!(error = ?err, "contact store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::server_error_page()),
                )
                    .into_response()
            }
        }
    }
}
