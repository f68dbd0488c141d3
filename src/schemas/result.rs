use serde::Deserialize;
use time::OffsetDateTime;

use super::deserialize_option_offset_datetime_flexible;

/// Summary row from the attempted-results list.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AttemptedResult {
    pub(crate) quiz_id: i64,
    pub(crate) title: String,
    pub(crate) score: i64,
    pub(crate) total: i64,
    #[serde(default, deserialize_with = "deserialize_option_offset_datetime_flexible")]
    pub(crate) submitted_at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultDetail {
    pub(crate) score: i64,
    pub(crate) total: i64,
    pub(crate) questions: Vec<ResultQuestion>,
}

/// Graded question: the correct and selected answers arrive as normalized
/// hashes, never as plaintext.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResultQuestion {
    pub(crate) id: i64,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) correct_answer_hash: String,
    #[serde(default)]
    pub(crate) selected_answer_hash: Option<String>,
}

impl ResultQuestion {
    pub(crate) fn options(&self) -> [&str; 4] {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d]
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardSummary {
    #[serde(rename = "totalQuizzes")]
    pub(crate) total_quizzes: i64,
    pub(crate) completed: i64,
    #[serde(rename = "averageScore")]
    pub(crate) average_score: f64,
    #[serde(default)]
    pub(crate) recent: Vec<RecentResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecentResult {
    pub(crate) title: String,
    pub(crate) score: i64,
    pub(crate) total: i64,
}
