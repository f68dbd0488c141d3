use async_trait::async_trait;
use serde_json::Value;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::schemas::quiz::{Quiz, QuizDetail};
use crate::schemas::result::{AttemptedResult, DashboardSummary, ResultDetail};
use crate::schemas::submission::{QuizSubmission, ViolationReport};

/// Student-facing backend surface. The session runner talks to this trait so
/// the quiz flow can be driven against a scripted backend in tests.
#[async_trait]
pub(crate) trait StudentApi: Send + Sync {
    async fn assigned_quizzes(&self) -> Result<Vec<Quiz>, ApiError>;
    async fn quiz_detail(&self, quiz_id: i64) -> Result<QuizDetail, ApiError>;
    async fn submit_attempt(&self, submission: &QuizSubmission) -> Result<(), ApiError>;
    async fn results(&self) -> Result<Vec<AttemptedResult>, ApiError>;
    async fn result_detail(&self, quiz_id: i64) -> Result<ResultDetail, ApiError>;
    async fn dashboard(&self) -> Result<DashboardSummary, ApiError>;
    async fn report_violation(&self, quiz_id: i64, kind: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl StudentApi for ApiClient {
    async fn assigned_quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
        self.get("/student/quizzes").await
    }

    async fn quiz_detail(&self, quiz_id: i64) -> Result<QuizDetail, ApiError> {
        self.get(&format!("/student/quiz/{quiz_id}")).await
    }

    async fn submit_attempt(&self, submission: &QuizSubmission) -> Result<(), ApiError> {
        let _: Value = self.post("/student/submit", submission).await?;
        Ok(())
    }

    async fn results(&self) -> Result<Vec<AttemptedResult>, ApiError> {
        self.get("/student/results").await
    }

    async fn result_detail(&self, quiz_id: i64) -> Result<ResultDetail, ApiError> {
        self.get(&format!("/student/quiz/{quiz_id}/result")).await
    }

    async fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
        self.get("/student/dashboard").await
    }

    async fn report_violation(&self, quiz_id: i64, kind: &str) -> Result<(), ApiError> {
        let payload = ViolationReport { quiz_id, kind: kind.to_string() };
        let _: Value = self.post("/student/violation", &payload).await?;
        Ok(())
    }
}
