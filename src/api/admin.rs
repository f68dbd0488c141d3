use serde_json::Value;
use validator::Validate;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::schemas::admin::{
    AdminQuiz, PublishRequest, QuestionDraft, QuestionUpdate, QuizCreate, StudentCreate,
};
use crate::schemas::quiz::Question;

pub(crate) async fn create_quiz(client: &ApiClient, title: &str) -> Result<(), ApiError> {
    let payload = QuizCreate { title: title.trim().to_string() };
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let _: Value = client.post("/admin/quiz", &payload).await?;
    Ok(())
}

pub(crate) async fn list_quizzes(client: &ApiClient) -> Result<Vec<AdminQuiz>, ApiError> {
    client.get("/admin/quizzes").await
}

pub(crate) async fn add_question(
    client: &ApiClient,
    draft: &QuestionDraft,
) -> Result<(), ApiError> {
    draft.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    draft.ensure_consistent().map_err(ApiError::BadRequest)?;
    let _: Value = client.post("/admin/question", draft).await?;
    Ok(())
}

pub(crate) async fn list_questions(
    client: &ApiClient,
    quiz_id: i64,
) -> Result<Vec<Question>, ApiError> {
    client.get(&format!("/admin/quiz/{quiz_id}/questions")).await
}

pub(crate) async fn update_question(
    client: &ApiClient,
    question_id: i64,
    update: &QuestionUpdate,
) -> Result<(), ApiError> {
    update.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    update.ensure_consistent().map_err(ApiError::BadRequest)?;
    let _: Value = client.put(&format!("/admin/question/{question_id}"), update).await?;
    Ok(())
}

pub(crate) async fn publish_quiz(
    client: &ApiClient,
    quiz_id: i64,
    request: &PublishRequest,
) -> Result<(), ApiError> {
    request.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let _: Value = client.patch(&format!("/admin/quiz/{quiz_id}/publish"), request).await?;
    Ok(())
}

pub(crate) async fn delete_question(client: &ApiClient, question_id: i64) -> Result<(), ApiError> {
    let _: Value = client.delete(&format!("/admin/question/{question_id}")).await?;
    Ok(())
}

pub(crate) async fn delete_quiz(client: &ApiClient, quiz_id: i64) -> Result<(), ApiError> {
    let _: Value = client.delete(&format!("/admin/quiz/{quiz_id}")).await?;
    Ok(())
}

pub(crate) async fn add_student(
    client: &ApiClient,
    student: &StudentCreate,
) -> Result<(), ApiError> {
    student.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let _: Value = client.post("/admin/students", student).await?;
    Ok(())
}
