// src/routes/analysis.rs
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::warn;

use crate::{
    error::AppError,
    message::{FeedbackResponse, Message},
    services::{
        analysis::{self, Quiz, Score, parse_model_json},
        metrics_manager::op,
    },
    state::SharedState,
};

// A body that is not a message array fails the same way an upstream error does.
async fn read_history(
    state: &SharedState,
    operation: &str,
    body: Result<Json<Vec<Message>>, JsonRejection>,
) -> Result<Vec<Message>, AppError> {
    match body {
        Ok(Json(history)) => Ok(history),
        Err(rejection) => {
            state.metrics.increment_failure(operation).await;
            Err(rejection.into())
        }
    }
}

pub async fn feedback_handler(
    State(state): State<SharedState>,
    body: Result<Json<Vec<Message>>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, AppError> {
    state.metrics.increment_request(op::FEEDBACK).await;
    let history = read_history(&state, op::FEEDBACK, body).await?;
    match analysis::feedback(state.completion.as_ref(), &history).await {
        Ok(feedback) => Ok(Json(FeedbackResponse { feedback })),
        Err(e) => {
            state.metrics.increment_failure(op::FEEDBACK).await;
            Err(e.into())
        }
    }
}

// Returns the model's text untouched; a parse failure is only logged.
pub async fn score_handler(
    State(state): State<SharedState>,
    body: Result<Json<Vec<Message>>, JsonRejection>,
) -> Result<String, AppError> {
    state.metrics.increment_request(op::SCORE).await;
    let history = read_history(&state, op::SCORE, body).await?;
    let text = match analysis::score(state.completion.as_ref(), &history).await {
        Ok(text) => text,
        Err(e) => {
            state.metrics.increment_failure(op::SCORE).await;
            return Err(e.into());
        }
    };

    match parse_model_json::<Score>(&text) {
        Ok(score) if !score.within_scale() => warn!(?score, "score outside the 0-5 scale"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "score output is not the expected JSON"),
    }
    Ok(text)
}

pub async fn quiz_handler(State(state): State<SharedState>) -> Result<String, AppError> {
    state.metrics.increment_request(op::QUIZ).await;
    let text = match analysis::quiz(state.completion.as_ref()).await {
        Ok(text) => text,
        Err(e) => {
            state.metrics.increment_failure(op::QUIZ).await;
            return Err(e.into());
        }
    };

    match parse_model_json::<Quiz>(&text) {
        Ok(quiz) => {
            let problems = quiz.problems();
            if !problems.is_empty() {
                warn!(?problems, "quiz output deviates from the schema");
            }
        }
        Err(e) => warn!(error = %e, "quiz output is not the expected JSON"),
    }
    Ok(text)
}
