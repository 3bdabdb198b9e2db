//! crates/didactic_core/src/insights.rs

use serde::Serialize;

/// Progress figures shown on the insights page. Fixed values; nothing is tracked yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub lessons_completed: u32,
    pub quizzes_taken: u32,
    pub average_score: u32,
}

impl Default for ProgressSummary {
    fn default() -> Self {
        Self {
            lessons_completed: 2,
            quizzes_taken: 3,
            average_score: 80,
        }
    }
}
