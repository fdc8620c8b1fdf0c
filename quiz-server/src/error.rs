//! Error types shared by the session store, the question bank loader, and
//! the HTTP layer.

use std::io;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Errors produced by quiz operations against the session store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("Session not found")]
    SessionNotFound,
    /// The current question was requested after the last one was answered.
    #[error("Quiz completed")]
    QuizCompleted,
    /// An answer was submitted after the last question was answered.
    #[error("Quiz already completed")]
    AlreadyCompleted,
    #[error("answer index {index} is out of range for {options} options")]
    InvalidAnswer { index: i64, options: usize },
    #[error("{0}")]
    InvalidRequest(String),
}

impl QuizError {
    pub fn status(&self) -> StatusCode {
        match self {
            QuizError::SessionNotFound => StatusCode::NOT_FOUND,
            QuizError::QuizCompleted
            | QuizError::AlreadyCompleted
            | QuizError::InvalidAnswer { .. }
            | QuizError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Reasons an external question file could not be used.
///
/// These never reach a client: the loader logs them and falls back to the
/// built-in questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read question file: {0}")]
    Io(#[from] io::Error),
    #[error("question file is not a JSON array of questions: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question file contains no valid questions")]
    Empty,
}

/// HTTP-facing wrapper that renders a [`QuizError`] as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError(pub QuizError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        Self(QuizError::InvalidRequest("Invalid request body".to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (self.0.status(), Json(body)).into_response()
    }
}
