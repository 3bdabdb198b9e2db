//! services/api/src/web/learning.rs
//!
//! Quiz and insights endpoints. Nothing here is persisted.

use axum::Json;
use didactic_core::insights::ProgressSummary;
use didactic_core::quiz::{question_bank, QuizAttempt};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::web::rest::ApiJson;

/// A question as shown to the learner; the answer stays on the server.
#[derive(Serialize, ToSchema)]
pub struct QuizQuestionView {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct QuizView {
    pub questions: Vec<QuizQuestionView>,
}

#[derive(Deserialize, ToSchema)]
pub struct QuizSubmission {
    /// Answers in question order.
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct QuizResult {
    pub score: u32,
    pub total: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub lessons_completed: u32,
    pub quizzes_taken: u32,
    pub average_score: u32,
}

impl From<ProgressSummary> for InsightsResponse {
    fn from(summary: ProgressSummary) -> Self {
        Self {
            lessons_completed: summary.lessons_completed,
            quizzes_taken: summary.quizzes_taken,
            average_score: summary.average_score,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/quiz",
    responses((status = 200, description = "The quiz questions", body = QuizView))
)]
pub async fn quiz_handler() -> Json<QuizView> {
    let questions = question_bank()
        .into_iter()
        .map(|q| QuizQuestionView {
            id: q.id,
            text: q.text,
            options: q.options,
        })
        .collect();
    Json(QuizView { questions })
}

/// Score a full set of answers. Answers beyond the last question are ignored.
#[utoipa::path(
    post,
    path = "/api/quiz/submit",
    request_body = QuizSubmission,
    responses(
        (status = 200, description = "Score for the submitted answers", body = QuizResult),
        (status = 400, description = "Malformed body", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn submit_quiz_handler(
    ApiJson(submission): ApiJson<QuizSubmission>,
) -> Json<QuizResult> {
    let mut attempt = QuizAttempt::new(question_bank());
    for answer in &submission.answers {
        if attempt.answer(answer).is_none() {
            break;
        }
    }
    Json(QuizResult {
        score: attempt.score(),
        total: attempt.total(),
    })
}

#[utoipa::path(
    get,
    path = "/api/insights",
    responses((status = 200, description = "Progress summary", body = InsightsResponse))
)]
pub async fn insights_handler() -> Json<InsightsResponse> {
    Json(ProgressSummary::default().into())
}
