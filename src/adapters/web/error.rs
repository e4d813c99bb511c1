//! HTTP error responses for web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::domain::error::ProfitError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &ProfitError) -> StatusCode {
    match err {
        ProfitError::FutureDate { .. }
        | ProfitError::MalformedInput { .. }
        | ProfitError::UnsupportedFileFormat { .. }
        | ProfitError::MissingColumns { .. }
        | ProfitError::NothingToAnalyze => StatusCode::BAD_REQUEST,
        ProfitError::NoData { .. } | ProfitError::Batch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ProfitError::DataSource { .. } => StatusCode::BAD_GATEWAY,
        ProfitError::ConfigParse { .. }
        | ProfitError::ConfigInvalid { .. }
        | ProfitError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ProfitError> for WebError {
    fn from(err: ProfitError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl From<askama::Error> for WebError {
    fn from(err: askama::Error) -> Self {
        Self::internal(format!("template error: {}", err))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), message = %self.message, "request failed");
        }
        (
            self.status,
            Json(ErrorBody {
                error: &self.message,
            }),
        )
            .into_response()
    }
}
