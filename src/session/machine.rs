use std::collections::HashMap;

use rand::seq::SliceRandom;
use thiserror::Error;

use crate::schemas::quiz::{Question, Quiz};
use crate::schemas::submission::{AnswerEntry, QuizSubmission};

/// The quiz-attempt state machine. Transitions are pure: user operations and
/// async events mutate local state and return commands for the runner to
/// execute. No I/O, no timers, no rendering in here.
///
/// Every transition that invalidates outstanding work (a question fetch, a
/// running countdown, an in-flight submission) bumps `epoch`; events carrying
/// an older epoch are discarded, which is what keeps stray ticks and stale
/// network completions from corrupting the current question.
#[derive(Debug)]
pub(crate) struct QuizSession {
    phase: Phase,
    attempt: Option<ActiveAttempt>,
    pending_open: Option<Quiz>,
    epoch: u64,
    question_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    InProgress,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Previous,
    Next,
}

#[derive(Debug)]
pub(crate) struct SessionQuestion {
    pub(crate) question: Question,
    /// Option texts in the order shown to the test-taker. Generated once per
    /// question at open time and held fixed for the life of the attempt.
    pub(crate) display_options: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct ActiveAttempt {
    pub(crate) quiz: Quiz,
    pub(crate) questions: Vec<SessionQuestion>,
    pub(crate) current: usize,
    pub(crate) answers: HashMap<i64, String>,
    pub(crate) countdown: u32,
    pub(crate) submit_failures: u32,
}

#[derive(Debug)]
pub(crate) enum SessionEvent {
    QuestionsLoaded { epoch: u64, questions: Vec<Question> },
    LoadFailed { epoch: u64, error: String },
    Tick { epoch: u64 },
    SubmitSucceeded { epoch: u64 },
    SubmitFailed { epoch: u64, error: String },
}

#[derive(Debug, PartialEq)]
pub(crate) enum SessionCommand {
    LoadQuestions { epoch: u64, quiz_id: i64 },
    StartCountdown { epoch: u64 },
    StopCountdown,
    SubmitAnswers { epoch: u64, submission: QuizSubmission },
    RefreshAvailability,
    NotifySubmitted,
    NotifyError { error: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SessionError {
    #[error("no quiz attempt is in progress")]
    NotInProgress,
    #[error("question {0} is not part of the active quiz")]
    UnknownQuestion(i64),
    #[error("option does not belong to question {0}")]
    UnknownOption(i64),
}

impl QuizSession {
    pub(crate) fn new(question_seconds: u32) -> Self {
        Self {
            phase: Phase::Idle,
            attempt: None,
            pending_open: None,
            epoch: 0,
            question_seconds,
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn attempt(&self) -> Option<&ActiveAttempt> {
        self.attempt.as_ref()
    }

    pub(crate) fn current_question(&self) -> Option<&SessionQuestion> {
        self.attempt.as_ref().and_then(|attempt| attempt.questions.get(attempt.current))
    }

    pub(crate) fn countdown(&self) -> Option<u32> {
        self.attempt.as_ref().map(|attempt| attempt.countdown)
    }

    pub(crate) fn selected_answer(&self, question_id: i64) -> Option<&str> {
        self.attempt
            .as_ref()
            .and_then(|attempt| attempt.answers.get(&question_id))
            .map(String::as_str)
    }

    /// Opening while another attempt is active silently discards it,
    /// matching the observed product behavior. The session stays `Idle`
    /// until the question set actually arrives.
    pub(crate) fn open(&mut self, quiz: Quiz) -> Vec<SessionCommand> {
        self.epoch += 1;
        self.phase = Phase::Idle;
        self.attempt = None;
        let quiz_id = quiz.id;
        self.pending_open = Some(quiz);
        vec![
            SessionCommand::StopCountdown,
            SessionCommand::LoadQuestions { epoch: self.epoch, quiz_id },
        ]
    }

    /// Leaving the quiz view destroys the attempt.
    pub(crate) fn abandon(&mut self) -> Vec<SessionCommand> {
        self.epoch += 1;
        self.phase = Phase::Idle;
        self.attempt = None;
        self.pending_open = None;
        vec![SessionCommand::StopCountdown]
    }

    pub(crate) fn select_answer(
        &mut self,
        question_id: i64,
        option: &str,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let attempt = self.attempt_mut();
        let question = attempt
            .questions
            .iter()
            .find(|entry| entry.question.id == question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        if !question.display_options.iter().any(|text| text == option) {
            return Err(SessionError::UnknownOption(question_id));
        }
        attempt.answers.insert(question_id, option.to_string());
        Ok(())
    }

    pub(crate) fn advance(
        &mut self,
        direction: Direction,
    ) -> Result<Vec<SessionCommand>, SessionError> {
        if self.phase != Phase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let (current, count) = {
            let attempt = self.attempt_ref();
            (attempt.current, attempt.questions.len())
        };

        match direction {
            Direction::Previous if current == 0 => Ok(Vec::new()),
            Direction::Previous => Ok(self.move_to(current - 1)),
            // The forward control doubles as Submit on the final question.
            Direction::Next if current + 1 >= count => self.submit(),
            Direction::Next => Ok(self.move_to(current + 1)),
        }
    }

    pub(crate) fn submit(&mut self) -> Result<Vec<SessionCommand>, SessionError> {
        if self.phase != Phase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let attempt = self.attempt_ref();
        let submission = QuizSubmission {
            quiz_id: attempt.quiz.id,
            answers: attempt
                .questions
                .iter()
                .map(|entry| AnswerEntry {
                    question_id: entry.question.id,
                    selected_option: attempt
                        .answers
                        .get(&entry.question.id)
                        .cloned()
                        .unwrap_or_default(),
                })
                .collect(),
        };

        self.phase = Phase::Submitting;
        self.epoch += 1;
        Ok(vec![
            SessionCommand::StopCountdown,
            SessionCommand::SubmitAnswers { epoch: self.epoch, submission },
        ])
    }

    pub(crate) fn handle_event(&mut self, event: SessionEvent) -> Vec<SessionCommand> {
        match event {
            SessionEvent::QuestionsLoaded { epoch, questions } => {
                self.questions_loaded(epoch, questions)
            }
            SessionEvent::LoadFailed { epoch, error } => {
                if epoch != self.epoch || self.pending_open.is_none() {
                    tracing::debug!(epoch, "Discarding stale quiz load failure");
                    return Vec::new();
                }
                self.pending_open = None;
                vec![SessionCommand::NotifyError { error }]
            }
            SessionEvent::Tick { epoch } => self.tick(epoch),
            SessionEvent::SubmitSucceeded { epoch } => {
                if epoch != self.epoch || self.phase != Phase::Submitting {
                    tracing::debug!(epoch, "Discarding stale submit acknowledgment");
                    return Vec::new();
                }
                self.epoch += 1;
                self.phase = Phase::Idle;
                self.attempt = None;
                vec![SessionCommand::NotifySubmitted, SessionCommand::RefreshAvailability]
            }
            SessionEvent::SubmitFailed { epoch, error } => {
                if epoch != self.epoch || self.phase != Phase::Submitting {
                    tracing::debug!(epoch, "Discarding stale submit failure");
                    return Vec::new();
                }
                // Answers stay captured; the countdown stays stopped so the
                // attempt cannot time out again while the student retries.
                self.phase = Phase::InProgress;
                if let Some(attempt) = self.attempt.as_mut() {
                    attempt.submit_failures += 1;
                }
                vec![SessionCommand::NotifyError { error }]
            }
        }
    }

    fn questions_loaded(&mut self, epoch: u64, questions: Vec<Question>) -> Vec<SessionCommand> {
        if epoch != self.epoch {
            tracing::debug!(epoch, "Discarding stale question set");
            return Vec::new();
        }
        let Some(quiz) = self.pending_open.take() else {
            return Vec::new();
        };
        if questions.is_empty() {
            return vec![SessionCommand::NotifyError {
                error: format!("Quiz \"{}\" has no questions", quiz.title),
            }];
        }

        let questions = questions
            .into_iter()
            .map(|question| {
                let display_options = shuffled_options(&question);
                SessionQuestion { question, display_options }
            })
            .collect();

        self.attempt = Some(ActiveAttempt {
            quiz,
            questions,
            current: 0,
            answers: HashMap::new(),
            countdown: self.question_seconds,
            submit_failures: 0,
        });
        self.phase = Phase::InProgress;
        self.epoch += 1;
        vec![SessionCommand::StartCountdown { epoch: self.epoch }]
    }

    fn tick(&mut self, epoch: u64) -> Vec<SessionCommand> {
        if epoch != self.epoch || self.phase != Phase::InProgress {
            tracing::debug!(epoch, "Discarding stale countdown tick");
            return Vec::new();
        }
        let attempt = self.attempt_mut();
        attempt.countdown = attempt.countdown.saturating_sub(1);
        if attempt.countdown > 0 {
            return Vec::new();
        }

        let (current, count) = (attempt.current, attempt.questions.len());
        if current + 1 >= count {
            self.submit().expect("submit from in-progress attempt")
        } else {
            self.move_to(current + 1)
        }
    }

    fn move_to(&mut self, index: usize) -> Vec<SessionCommand> {
        let seconds = self.question_seconds;
        let attempt = self.attempt_mut();
        attempt.current = index;
        attempt.countdown = seconds;
        self.epoch += 1;
        vec![SessionCommand::StartCountdown { epoch: self.epoch }]
    }

    fn attempt_ref(&self) -> &ActiveAttempt {
        self.attempt.as_ref().expect("attempt present while in progress")
    }

    fn attempt_mut(&mut self) -> &mut ActiveAttempt {
        self.attempt.as_mut().expect("attempt present while in progress")
    }
}

fn shuffled_options(question: &Question) -> Vec<String> {
    let mut options: Vec<String> =
        question.options().iter().map(|text| text.to_string()).collect();
    options.shuffle(&mut rand::thread_rng());
    options
}
