//! Error types surfaced by the quiz core, plus their HTTP mapping.
//!
//! The core never returns a structurally invalid question; wrong option
//! counts or duplicate options are invariant violations handled internally
//! (`InsufficientCategoryData` discards the fact and retries another one).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// Rejected at entry, never retried.
    #[error("unsupported sport: '{0}'")]
    InvalidSport(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Expired sessions are removed on access; callers must create a new one.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// Fatal for the current request only; session state stays intact.
    #[error("question content exhausted for this session")]
    ExhaustedContent,

    /// Internal invariant violation given seed-list padding; the offending
    /// fact is discarded and generation retried with a different one.
    #[error("not enough data in category '{category}' to build {needed} distractors")]
    InsufficientCategoryData { category: String, needed: usize },

    #[error("question not issued to this session: {0}")]
    QuestionNotFound(String),

    #[error("survival round not found: {0}")]
    RoundNotFound(String),

    /// Expired rounds are removed on access, mirroring quiz sessions.
    #[error("survival round expired: {0}")]
    RoundExpired(String),

    #[error("survival round is not active")]
    RoundNotActive,

    #[error("no valid names for initials '{0}'")]
    EmptyCandidatePool(String),

    #[error("player '{0}' is not part of this round")]
    UnknownPlayer(String),

    #[error("it is not this player's turn")]
    OutOfTurn,

    #[error("invalid match outcome: {0}")]
    InvalidOutcome(String),
}

impl QuizError {
    fn status(&self) -> StatusCode {
        match self {
            QuizError::InvalidSport(_)
            | QuizError::InvalidOutcome(_)
            | QuizError::UnknownPlayer(_) => StatusCode::BAD_REQUEST,
            QuizError::SessionNotFound(_)
            | QuizError::QuestionNotFound(_)
            | QuizError::RoundNotFound(_) => StatusCode::NOT_FOUND,
            QuizError::SessionExpired(_) | QuizError::RoundExpired(_) => StatusCode::GONE,
            QuizError::OutOfTurn | QuizError::RoundNotActive => StatusCode::CONFLICT,
            QuizError::ExhaustedContent | QuizError::EmptyCandidatePool(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            QuizError::InsufficientCategoryData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
