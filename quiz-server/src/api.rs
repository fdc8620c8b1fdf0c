//! JSON protocol over HTTP.
//!
//! | Method | Path                         | Store operation                      |
//! |--------|------------------------------|--------------------------------------|
//! | POST   | `/api/start-quiz`            | [`SessionStore::create`]             |
//! | GET    | `/api/question/:session_id`  | [`SessionStore::current_question`]   |
//! | POST   | `/api/answer/:session_id`    | [`SessionStore::record_answer`]      |
//! | GET    | `/api/results/:session_id`   | [`SessionStore::results`]            |
//!
//! Handlers hold no state of their own; everything lives in the store.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ApiError, QuizError},
    question::OPTION_COUNT,
    session::{AnswerRecord, SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    /// Used when `start-quiz` does not name a question count.
    pub default_question_count: usize,
}

impl AppState {
    pub fn new(store: Arc<SessionStore>, default_question_count: usize) -> Self {
        Self {
            store,
            default_question_count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizRequest {
    #[serde(default)]
    pub question_count: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizResponse {
    pub session_id: String,
    pub total_questions: usize,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub question_number: usize,
    pub total_questions: usize,
    pub question: String,
    pub answers: [String; OPTION_COUNT],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub answer_index: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub correct: bool,
    pub correct_answer: usize,
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub score: usize,
    pub total_questions: usize,
    pub percentage: u32,
    /// Whole seconds since the session started.
    pub time_taken: u64,
    pub answers: Vec<AnswerRecord>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/start-quiz", post(start_quiz))
        .route("/api/question/:session_id", get(get_question))
        .route("/api/answer/:session_id", post(submit_answer))
        .route("/api/results/:session_id", get(get_results))
        .with_state(state)
}

async fn start_quiz(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StartQuizResponse>, ApiError> {
    // An empty body is allowed and means "use the defaults".
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        StartQuizRequest::default()
    } else {
        serde_json::from_slice::<StartQuizRequest>(&body).map_err(|err| {
            debug!(error = %err, "rejected start-quiz body");
            QuizError::InvalidRequest("Invalid request body".to_string())
        })?
    };

    let question_count = match request.question_count {
        None => state.default_question_count,
        Some(count) => usize::try_from(count)
            .ok()
            .filter(|count| *count > 0)
            .ok_or_else(|| {
                QuizError::InvalidRequest("questionCount must be a positive integer".to_string())
            })?,
    };

    let (session_id, total_questions) = state.store.create(question_count);
    info!(session_id = %session_id, requested = question_count, total_questions, "quiz started");

    Ok(Json(StartQuizResponse {
        session_id,
        total_questions,
        message: "Quiz started successfully".to_string(),
    }))
}

async fn get_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let current = state.store.current_question(&session_id)?;

    Ok(Json(QuestionResponse {
        question_number: current.number,
        total_questions: current.total,
        question: current.question.text,
        answers: current.question.options,
    }))
}

async fn submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    // Unknown sessions take precedence over a bad body.
    if !state.store.contains(&session_id) {
        return Err(QuizError::SessionNotFound.into());
    }
    let Json(request) = payload?;
    let outcome = state
        .store
        .record_answer(&session_id, request.answer_index)?;
    debug!(
        session_id = %session_id,
        answer = request.answer_index,
        correct = outcome.correct,
        "answer recorded"
    );

    Ok(Json(AnswerResponse {
        correct: outcome.correct,
        correct_answer: outcome.correct_answer,
        explanation: outcome.explanation,
    }))
}

async fn get_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let results = state.store.results(&session_id)?;

    Ok(Json(ResultsResponse {
        score: results.score,
        total_questions: results.total,
        percentage: results.percentage,
        time_taken: results.time_taken_secs,
        answers: results.answers,
    }))
}
