use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::review::hash_answer;

pub(crate) const TEST_TOKEN: &str = "test-token";
pub(crate) const TEST_EMAIL: &str = "asha@example.com";
pub(crate) const TEST_PASSWORD: &str = "quiz-pass";

/// Requests the fixture backend captured, for assertions on wire shapes.
#[derive(Clone, Default)]
pub(crate) struct Recorded {
    pub(crate) submissions: Arc<Mutex<Vec<Value>>>,
    pub(crate) violations: Arc<Mutex<Vec<Value>>>,
    pub(crate) admin_calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorded {
    fn admin(&self, call: impl Into<String>, body: Value) {
        self.admin_calls.lock().unwrap().push((call.into(), body));
    }
}

pub(crate) struct TestBackend {
    pub(crate) base_url: String,
    pub(crate) recorded: Recorded,
}

/// Serves the QuizPoint REST surface with canned data on an ephemeral port.
pub(crate) async fn spawn_backend() -> TestBackend {
    let recorded = Recorded::default();
    let router = router(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind fixture port");
    let addr = listener.local_addr().expect("fixture addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve fixture");
    });

    TestBackend { base_url: format!("http://{addr}"), recorded }
}

fn router(recorded: Recorded) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/student/quizzes", get(student_quizzes))
        .route("/student/quiz/:id", get(student_quiz_detail))
        .route("/student/submit", post(student_submit))
        .route("/student/results", get(student_results))
        .route("/student/quiz/:id/result", get(student_result_detail))
        .route("/student/dashboard", get(student_dashboard))
        .route("/student/violation", post(student_violation))
        .route("/admin/quiz", post(admin_create_quiz))
        .route("/admin/quizzes", get(admin_quizzes))
        .route("/admin/question", post(admin_add_question))
        .route("/admin/quiz/:id/questions", get(admin_questions))
        .route("/admin/question/:id", put(admin_update_question).delete(admin_delete_question))
        .route("/admin/quiz/:id/publish", patch(admin_publish_quiz))
        .route("/admin/quiz/:id", delete(admin_delete_quiz))
        .route("/admin/students", post(admin_add_student))
        .with_state(recorded)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {TEST_TOKEN}"))
        .unwrap_or(false)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid authentication credentials"})))
}

fn ok() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({"message": "ok"})))
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == TEST_EMAIL && body["password"] == TEST_PASSWORD {
        (
            StatusCode::OK,
            Json(json!({
                "token": TEST_TOKEN,
                "user": {"name": "Asha", "role": "STUDENT", "mustChangePassword": false}
            })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Login failed"})))
    }
}

async fn student_quizzes(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    // Mixed timestamp styles on purpose: RFC3339 and naive UTC.
    (
        StatusCode::OK,
        Json(json!([
            {
                "id": 7,
                "title": "Geography",
                "publish_at": "2026-03-01T10:00:00Z",
                "visible_until": "2026-03-08T10:00:00Z"
            },
            {
                "id": 8,
                "title": "History",
                "publish_at": "2026-03-01T10:00:00",
                "visible_until": "2026-03-08 10:00:00"
            }
        ])),
    )
}

async fn student_quiz_detail(
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != 7 {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Quiz not found"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "questions": [
                {
                    "id": 71,
                    "question_text": "Capital of France?",
                    "option_a": "Paris",
                    "option_b": "London",
                    "option_c": "Berlin",
                    "option_d": "Madrid"
                },
                {
                    "id": 72,
                    "question_text": "Capital of Japan?",
                    "option_a": "Kyoto",
                    "option_b": "Tokyo",
                    "option_c": "Osaka",
                    "option_d": "Nagoya"
                }
            ]
        })),
    )
}

async fn student_submit(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.submissions.lock().unwrap().push(body);
    ok()
}

async fn student_results(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([
            {
                "quiz_id": 5,
                "title": "Biology",
                "score": 3,
                "total": 4,
                "submitted_at": "2026-02-20T09:30:00Z"
            }
        ])),
    )
}

async fn student_result_detail(
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "score": 1,
            "total": 2,
            "questions": [
                {
                    "id": id * 10 + 1,
                    "question_text": "Capital of France?",
                    "option_a": "Paris",
                    "option_b": "London",
                    "option_c": "Berlin",
                    "option_d": "Madrid",
                    "correct_answer_hash": hash_answer("Paris"),
                    "selected_answer_hash": hash_answer("Berlin")
                }
            ]
        })),
    )
}

async fn student_dashboard(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "totalQuizzes": 6,
            "completed": 4,
            "averageScore": 72.5,
            "recent": [{"title": "Biology", "score": 3, "total": 4}]
        })),
    )
}

async fn student_violation(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.violations.lock().unwrap().push(body);
    ok()
}

async fn admin_quizzes(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([
            {"id": 7, "title": "Geography", "is_active": true, "has_submissions": false}
        ])),
    )
}

async fn admin_questions(headers: HeaderMap, Path(_id): Path<i64>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([
            {
                "id": 71,
                "question_text": "Capital of France?",
                "option_a": "Paris",
                "option_b": "London",
                "option_c": "Berlin",
                "option_d": "Madrid"
            }
        ])),
    )
}

async fn admin_create_quiz(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.admin("POST /admin/quiz", body);
    ok()
}

async fn admin_add_question(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.admin("POST /admin/question", body);
    ok()
}

async fn admin_update_question(
    State(recorded): State<Recorded>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.admin(format!("PUT /admin/question/{id}"), body);
    ok()
}

async fn admin_publish_quiz(
    State(recorded): State<Recorded>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.admin(format!("PATCH /admin/quiz/{id}/publish"), body);
    ok()
}

async fn admin_delete_question(
    State(recorded): State<Recorded>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.admin(format!("DELETE /admin/question/{id}"), Value::Null);
    ok()
}

async fn admin_delete_quiz(
    State(recorded): State<Recorded>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.admin(format!("DELETE /admin/quiz/{id}"), Value::Null);
    ok()
}

async fn admin_add_student(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorded.admin("POST /admin/students", body);
    ok()
}
