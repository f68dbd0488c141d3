use serde::Serialize;

/// One atomic attempt submission. Every loaded question is represented,
/// skipped questions with an empty `selected_option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct QuizSubmission {
    #[serde(rename = "quizId")]
    pub(crate) quiz_id: i64,
    pub(crate) answers: Vec<AnswerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct AnswerEntry {
    #[serde(rename = "questionId")]
    pub(crate) question_id: i64,
    #[serde(rename = "selectedOption")]
    pub(crate) selected_option: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ViolationReport {
    #[serde(rename = "quizId")]
    pub(crate) quiz_id: i64,
    #[serde(rename = "type")]
    pub(crate) kind: String,
}
