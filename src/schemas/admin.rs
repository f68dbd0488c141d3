use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Validate)]
pub(crate) struct QuizCreate {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AdminQuiz {
    pub(crate) id: i64,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) is_active: bool,
    #[serde(default)]
    pub(crate) has_submissions: bool,
}

#[derive(Debug, Serialize, Validate)]
pub(crate) struct QuestionDraft {
    #[serde(rename = "quizId")]
    pub(crate) quiz_id: i64,
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub(crate) question: String,
    #[validate(length(min = 4, max = 4, message = "exactly four options are required"))]
    pub(crate) options: Vec<String>,
    #[serde(rename = "correctOption")]
    #[validate(length(min = 1, message = "correct option must not be empty"))]
    pub(crate) correct_option: String,
}

impl QuestionDraft {
    pub(crate) fn ensure_consistent(&self) -> Result<(), String> {
        ensure_options_consistent(&self.options, &self.correct_option)
    }
}

#[derive(Debug, Serialize, Validate)]
pub(crate) struct QuestionUpdate {
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub(crate) question: String,
    #[validate(length(min = 4, max = 4, message = "exactly four options are required"))]
    pub(crate) options: Vec<String>,
    #[serde(rename = "correctOption")]
    #[validate(length(min = 1, message = "correct option must not be empty"))]
    pub(crate) correct_option: String,
}

impl QuestionUpdate {
    pub(crate) fn ensure_consistent(&self) -> Result<(), String> {
        ensure_options_consistent(&self.options, &self.correct_option)
    }
}

#[derive(Debug, Serialize, Validate)]
pub(crate) struct PublishRequest {
    #[serde(rename = "targetClass")]
    #[validate(length(min = 1, message = "target class must not be empty"))]
    pub(crate) target_class: String,
    #[serde(rename = "publishAt")]
    pub(crate) publish_at: String,
}

#[derive(Debug, Serialize, Validate)]
pub(crate) struct StudentCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(email(message = "invalid email address"))]
    pub(crate) email: String,
}

fn ensure_options_consistent(options: &[String], correct: &str) -> Result<(), String> {
    if options.iter().any(|option| option.trim().is_empty()) {
        return Err("options must not be blank".to_string());
    }
    if !options.iter().any(|option| option == correct) {
        return Err("correct option must match one of the four options".to_string());
    }
    Ok(())
}
