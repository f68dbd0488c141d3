use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::student::StudentApi;
use crate::schemas::quiz::Quiz;
use crate::session::machine::{
    Direction, QuizSession, SessionCommand, SessionError, SessionEvent,
};
use crate::session::timer::CountdownTimer;

/// Outcomes the UI layer reacts to after a batch of transitions.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SessionSignal {
    Submitted,
    RefreshAvailability,
    Error(String),
}

/// Owns the pure state machine plus its effectful collaborators: the
/// countdown task and the backend. Commands returned by the machine are
/// executed here; async completions come back through the event channel,
/// stamped with the epoch they were issued for.
pub(crate) struct SessionRunner {
    session: QuizSession,
    timer: CountdownTimer,
    api: Arc<dyn StudentApi>,
    events_tx: UnboundedSender<SessionEvent>,
    tick_period: Duration,
}

impl SessionRunner {
    pub(crate) fn new(
        api: Arc<dyn StudentApi>,
        question_seconds: u32,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let runner = Self {
            session: QuizSession::new(question_seconds),
            timer: CountdownTimer::new(),
            api,
            events_tx,
            tick_period: Duration::from_secs(1),
        };
        (runner, events_rx)
    }

    #[cfg(test)]
    fn set_tick_period(&mut self, period: Duration) {
        self.tick_period = period;
    }

    pub(crate) fn session(&self) -> &QuizSession {
        &self.session
    }

    pub(crate) fn open(&mut self, quiz: Quiz) -> Vec<SessionSignal> {
        tracing::info!(quiz_id = quiz.id, title = %quiz.title, "Opening quiz");
        let commands = self.session.open(quiz);
        self.dispatch(commands)
    }

    pub(crate) fn abandon(&mut self) -> Vec<SessionSignal> {
        let commands = self.session.abandon();
        self.dispatch(commands)
    }

    pub(crate) fn select_answer(
        &mut self,
        question_id: i64,
        option: &str,
    ) -> Result<(), SessionError> {
        self.session.select_answer(question_id, option)
    }

    pub(crate) fn advance(
        &mut self,
        direction: Direction,
    ) -> Result<Vec<SessionSignal>, SessionError> {
        let commands = self.session.advance(direction)?;
        Ok(self.dispatch(commands))
    }

    pub(crate) fn submit(&mut self) -> Result<Vec<SessionSignal>, SessionError> {
        let commands = self.session.submit()?;
        Ok(self.dispatch(commands))
    }

    pub(crate) fn handle_event(&mut self, event: SessionEvent) -> Vec<SessionSignal> {
        let commands = self.session.handle_event(event);
        self.dispatch(commands)
    }

    fn dispatch(&mut self, commands: Vec<SessionCommand>) -> Vec<SessionSignal> {
        let mut signals = Vec::new();
        for command in commands {
            match command {
                SessionCommand::LoadQuestions { epoch, quiz_id } => {
                    let api = Arc::clone(&self.api);
                    let events = self.events_tx.clone();
                    tokio::spawn(async move {
                        let event = match api.quiz_detail(quiz_id).await {
                            Ok(detail) => SessionEvent::QuestionsLoaded {
                                epoch,
                                questions: detail.questions,
                            },
                            Err(err) => {
                                SessionEvent::LoadFailed { epoch, error: err.to_string() }
                            }
                        };
                        let _ = events.send(event);
                    });
                }
                SessionCommand::StartCountdown { epoch } => {
                    self.timer.start(epoch, self.tick_period, self.events_tx.clone());
                }
                SessionCommand::StopCountdown => self.timer.stop(),
                SessionCommand::SubmitAnswers { epoch, submission } => {
                    tracing::info!(
                        quiz_id = submission.quiz_id,
                        questions = submission.answers.len(),
                        "Submitting quiz attempt"
                    );
                    let api = Arc::clone(&self.api);
                    let events = self.events_tx.clone();
                    tokio::spawn(async move {
                        let event = match api.submit_attempt(&submission).await {
                            Ok(()) => SessionEvent::SubmitSucceeded { epoch },
                            Err(err) => {
                                SessionEvent::SubmitFailed { epoch, error: err.to_string() }
                            }
                        };
                        let _ = events.send(event);
                    });
                }
                SessionCommand::RefreshAvailability => {
                    signals.push(SessionSignal::RefreshAvailability)
                }
                SessionCommand::NotifySubmitted => signals.push(SessionSignal::Submitted),
                SessionCommand::NotifyError { error } => {
                    tracing::warn!(error = %error, "Quiz session error");
                    signals.push(SessionSignal::Error(error));
                }
            }
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::macros::datetime;

    use crate::api::errors::ApiError;
    use crate::schemas::quiz::{Question, QuizDetail};
    use crate::schemas::result::{AttemptedResult, DashboardSummary, ResultDetail};
    use crate::schemas::submission::QuizSubmission;
    use crate::session::machine::Phase;

    struct FakeBackend {
        questions: Vec<Question>,
        fail_submit: AtomicBool,
        submissions: Mutex<Vec<QuizSubmission>>,
    }

    impl FakeBackend {
        fn with_questions(questions: Vec<Question>) -> Self {
            Self {
                questions,
                fail_submit: AtomicBool::new(false),
                submissions: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StudentApi for FakeBackend {
        async fn assigned_quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
            Ok(Vec::new())
        }

        async fn quiz_detail(&self, _quiz_id: i64) -> Result<QuizDetail, ApiError> {
            Ok(QuizDetail { questions: self.questions.clone() })
        }

        async fn submit_attempt(&self, submission: &QuizSubmission) -> Result<(), ApiError> {
            if self.fail_submit.load(Ordering::SeqCst) {
                return Err(ApiError::Backend {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            self.submissions.lock().unwrap().push(submission.clone());
            Ok(())
        }

        async fn results(&self) -> Result<Vec<AttemptedResult>, ApiError> {
            Ok(Vec::new())
        }

        async fn result_detail(&self, _quiz_id: i64) -> Result<ResultDetail, ApiError> {
            Ok(ResultDetail { score: 0, total: 0, questions: Vec::new() })
        }

        async fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
            Ok(DashboardSummary {
                total_quizzes: 0,
                completed: 0,
                average_score: 0.0,
                recent: Vec::new(),
            })
        }

        async fn report_violation(&self, _quiz_id: i64, _kind: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn quiz() -> Quiz {
        Quiz {
            id: 7,
            title: "Geography".to_string(),
            publish_at: datetime!(2026-03-01 00:00 UTC),
            visible_until: datetime!(2026-03-08 00:00 UTC),
        }
    }

    fn question(id: i64) -> Question {
        Question {
            id,
            question_text: format!("Question {id}?"),
            option_a: "Paris".to_string(),
            option_b: "London".to_string(),
            option_c: "Berlin".to_string(),
            option_d: "Madrid".to_string(),
        }
    }

    async fn drive_until(
        runner: &mut SessionRunner,
        events: &mut UnboundedReceiver<SessionEvent>,
        stop: impl Fn(&[SessionSignal]) -> bool,
    ) -> Vec<SessionSignal> {
        let deadline = Duration::from_secs(5);
        let collected = tokio::time::timeout(deadline, async {
            loop {
                let event = events.recv().await.expect("event stream open");
                let signals = runner.handle_event(event);
                if stop(&signals) {
                    return signals;
                }
            }
        })
        .await
        .expect("scenario finished in time");
        collected
    }

    #[tokio::test]
    async fn open_answer_and_manual_submit_round_trip() {
        let backend = Arc::new(FakeBackend::with_questions(vec![question(1), question(2)]));
        let (mut runner, mut events) = SessionRunner::new(backend.clone(), 30);

        assert!(runner.open(quiz()).is_empty());
        drive_until(&mut runner, &mut events, |_| {
            true // first event is the loaded question set
        })
        .await;
        assert_eq!(runner.session().phase(), Phase::InProgress);

        runner.select_answer(1, "Paris").expect("select");
        runner.advance(Direction::Next).expect("next");
        runner.advance(Direction::Next).expect("submit");
        assert_eq!(runner.session().phase(), Phase::Submitting);

        let signals = drive_until(&mut runner, &mut events, |signals| {
            signals.contains(&SessionSignal::Submitted)
        })
        .await;
        assert!(signals.contains(&SessionSignal::RefreshAvailability));
        assert_eq!(runner.session().phase(), Phase::Idle);

        let recorded = backend.submissions.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].answers[0].selected_option, "Paris");
        assert_eq!(recorded[0].answers[1].selected_option, "");
    }

    #[tokio::test]
    async fn countdown_expiry_submits_without_user_input() {
        let backend = Arc::new(FakeBackend::with_questions(vec![question(1), question(2)]));
        let (mut runner, mut events) = SessionRunner::new(backend.clone(), 1);
        runner.set_tick_period(Duration::from_millis(5));

        runner.open(quiz());
        let signals = drive_until(&mut runner, &mut events, |signals| {
            signals.contains(&SessionSignal::Submitted)
        })
        .await;

        assert!(signals.contains(&SessionSignal::RefreshAvailability));
        let recorded = backend.submissions.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].answers.len(), 2);
        assert!(recorded[0].answers.iter().all(|entry| entry.selected_option.is_empty()));
    }

    #[tokio::test]
    async fn failed_submit_surfaces_error_and_retry_succeeds() {
        let backend = Arc::new(FakeBackend::with_questions(vec![question(1)]));
        backend.fail_submit.store(true, Ordering::SeqCst);
        let (mut runner, mut events) = SessionRunner::new(backend.clone(), 30);

        runner.open(quiz());
        drive_until(&mut runner, &mut events, |_| true).await;
        runner.select_answer(1, "Berlin").expect("select");
        runner.submit().expect("submit");

        let signals = drive_until(&mut runner, &mut events, |signals| {
            signals.iter().any(|signal| matches!(signal, SessionSignal::Error(_)))
        })
        .await;
        assert!(signals
            .iter()
            .any(|signal| matches!(signal, SessionSignal::Error(message) if message.contains("503"))));
        assert_eq!(runner.session().phase(), Phase::InProgress);
        assert_eq!(runner.session().selected_answer(1), Some("Berlin"));

        backend.fail_submit.store(false, Ordering::SeqCst);
        runner.submit().expect("retry");
        drive_until(&mut runner, &mut events, |signals| {
            signals.contains(&SessionSignal::Submitted)
        })
        .await;

        let recorded = backend.submissions.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].answers[0].selected_option, "Berlin");
    }
}
