use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use time::UtcOffset;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::student::StudentApi;
use crate::app::{logout, session_file_path, InputLines};
use crate::core::config::Settings;
use crate::core::time::{format_display, now_utc};
use crate::review::{self, OptionVerdict};
use crate::schemas::quiz::Quiz;
use crate::schemas::result::AttemptedResult;
use crate::session::availability::eligible_quizzes;
use crate::session::machine::{Direction, Phase, SessionEvent};
use crate::session::runner::{SessionRunner, SessionSignal};

const LEAVE_VIOLATION: &str = "LEFT_QUIZ";

pub(crate) async fn run(
    client: Arc<ApiClient>,
    settings: &Settings,
    display_name: &str,
    lines: &mut InputLines,
) -> Result<()> {
    let (runner, mut events) =
        SessionRunner::new(client.clone(), settings.quiz().question_seconds);
    let mut app = StudentApp {
        client,
        runner,
        quizzes: Vec::new(),
        attempted: Vec::new(),
        offset: settings.display().utc_offset,
        session_file: session_file_path(settings),
    };

    println!("Hello {display_name}! Type 'h' for the list of commands.");
    if let Err(err) = app.refresh_lists().await {
        println!("Failed to load your quizzes: {err}");
    }
    app.print_quiz_list();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read console input")? else { break };
                if !app.handle_command(line.trim()).await? {
                    break;
                }
            }
            Some(event) = events.recv() => {
                app.handle_session_event(event).await;
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    app.leave_active_quiz().await;
    Ok(())
}

struct StudentApp {
    client: Arc<ApiClient>,
    runner: SessionRunner,
    quizzes: Vec<Quiz>,
    attempted: Vec<AttemptedResult>,
    offset: UtcOffset,
    session_file: PathBuf,
}

impl StudentApp {
    async fn refresh_lists(&mut self) -> Result<(), ApiError> {
        self.quizzes = self.client.assigned_quizzes().await?;
        self.attempted = self.client.results().await?;
        Ok(())
    }

    fn eligible(&self) -> Vec<&Quiz> {
        eligible_quizzes(&self.quizzes, &self.attempted, now_utc())
    }

    fn print_quiz_list(&self) {
        let eligible = self.eligible();
        if eligible.is_empty() {
            println!("You don't have any quizzes for now.");
            return;
        }
        println!("Available quizzes:");
        for quiz in eligible {
            println!(
                "  [{}] {}  (open {} until {})",
                quiz.id,
                quiz.title,
                format_display(quiz.publish_at, self.offset),
                format_display(quiz.visible_until, self.offset)
            );
        }
        println!("Start one with 'start <id>'.");
    }

    /// Returns `false` when the console should exit.
    async fn handle_command(&mut self, line: &str) -> Result<bool> {
        if line.is_empty() {
            return Ok(true);
        }
        match self.runner.session().phase() {
            Phase::Idle => self.handle_menu_command(line).await,
            Phase::InProgress | Phase::Submitting => self.handle_quiz_command(line).await,
        }
    }

    async fn handle_menu_command(&mut self, line: &str) -> Result<bool> {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("h") | Some("help") => print_menu_help(),
            Some("l") | Some("list") => self.print_quiz_list(),
            Some("r") | Some("refresh") => match self.refresh_lists().await {
                Ok(()) => self.print_quiz_list(),
                Err(err) if err.is_unauthorized() => {
                    println!("Your session has expired; please restart and log in again.");
                }
                Err(err) => println!("Failed to refresh: {err}"),
            },
            Some("start") => match parts.next().and_then(|raw| raw.parse::<i64>().ok()) {
                Some(quiz_id) => self.start_quiz(quiz_id).await,
                None => println!("Usage: start <quiz id>"),
            },
            Some("d") | Some("dashboard") => self.show_dashboard().await,
            Some("s") | Some("results") => self.show_results().await,
            Some("v") | Some("view") => match parts.next().and_then(|raw| raw.parse::<i64>().ok()) {
                Some(quiz_id) => self.show_result_detail(quiz_id).await,
                None => println!("Usage: view <quiz id>"),
            },
            Some("logout") => {
                logout(&self.client, &self.session_file);
                return Ok(false);
            }
            Some("q") | Some("quit") => return Ok(false),
            _ => println!("Unknown command. Type 'h' for help."),
        }
        Ok(true)
    }

    async fn start_quiz(&mut self, quiz_id: i64) {
        let Some(quiz) = self.eligible().into_iter().find(|quiz| quiz.id == quiz_id).cloned()
        else {
            println!("Quiz {quiz_id} is not available right now.");
            return;
        };
        println!("Loading \"{}\"...", quiz.title);
        let signals = self.runner.open(quiz);
        self.apply_signals(signals).await;
    }

    async fn handle_quiz_command(&mut self, line: &str) -> Result<bool> {
        if self.runner.session().phase() == Phase::Submitting {
            println!("Submission in progress, hold on...");
            return Ok(true);
        }

        let line = line.to_ascii_lowercase();
        match line.as_str() {
            "a" | "b" | "c" | "d" => {
                let index = (line.as_bytes()[0] - b'a') as usize;
                self.select_by_index(index);
            }
            "n" | "next" => match self.runner.advance(Direction::Next) {
                Ok(signals) => {
                    self.apply_signals(signals).await;
                    self.print_question();
                }
                Err(err) => println!("{err}"),
            },
            "p" | "prev" | "previous" => match self.runner.advance(Direction::Previous) {
                Ok(signals) => {
                    self.apply_signals(signals).await;
                    self.print_question();
                }
                Err(err) => println!("{err}"),
            },
            "submit" | "retry" => match self.runner.submit() {
                Ok(signals) => self.apply_signals(signals).await,
                Err(err) => println!("{err}"),
            },
            "x" | "leave" => {
                self.leave_active_quiz().await;
                println!("Left the quiz. Your attempt was not submitted.");
                self.print_quiz_list();
            }
            "q" | "quit" => {
                self.leave_active_quiz().await;
                return Ok(false);
            }
            "h" | "help" => print_quiz_help(),
            _ => println!("Unknown command. Type 'h' for help."),
        }
        Ok(true)
    }

    fn select_by_index(&mut self, index: usize) {
        let Some((question_id, option)) =
            self.runner.session().current_question().and_then(|question| {
                question
                    .display_options
                    .get(index)
                    .map(|option| (question.question.id, option.clone()))
            })
        else {
            println!("No question is active.");
            return;
        };

        match self.runner.select_answer(question_id, &option) {
            Ok(()) => self.print_question(),
            Err(err) => println!("{err}"),
        }
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        let before = self.view_state();
        let signals = self.runner.handle_event(event);
        self.apply_signals(signals).await;
        let after = self.view_state();

        if after.0 == Phase::InProgress && (before.0 != Phase::InProgress || before.1 != after.1) {
            self.print_question();
        } else if after.0 == Phase::InProgress && before.2 != after.2 {
            if let Some(countdown) = after.2 {
                if countdown == 10 || (1..=5).contains(&countdown) {
                    println!("  ... {countdown}s left");
                }
            }
        }
    }

    fn view_state(&self) -> (Phase, Option<usize>, Option<u32>) {
        let session = self.runner.session();
        (
            session.phase(),
            session.attempt().map(|attempt| attempt.current),
            session.countdown(),
        )
    }

    async fn apply_signals(&mut self, signals: Vec<SessionSignal>) {
        for signal in signals {
            match signal {
                SessionSignal::Submitted => {
                    println!("Quiz submitted. Your answers were recorded.");
                }
                SessionSignal::RefreshAvailability => {
                    if let Err(err) = self.refresh_lists().await {
                        println!("Failed to refresh the quiz list: {err}");
                    } else {
                        self.print_quiz_list();
                    }
                }
                SessionSignal::Error(message) => {
                    println!("Something went wrong: {message}");
                    if let Some(attempt) = self.runner.session().attempt() {
                        if attempt.submit_failures > 0 {
                            println!("Your answers are kept; type 'retry' to submit again.");
                        }
                    }
                }
            }
        }
    }

    fn print_question(&self) {
        let session = self.runner.session();
        if session.phase() != Phase::InProgress {
            return;
        }
        let (Some(attempt), Some(question)) = (session.attempt(), session.current_question())
        else {
            return;
        };

        println!();
        println!(
            "Question {}/{}  [{}s]",
            attempt.current + 1,
            attempt.questions.len(),
            attempt.countdown
        );
        println!("{}", question.question.question_text);
        for (index, option) in question.display_options.iter().enumerate() {
            let label = (b'A' + index as u8) as char;
            let marker = if session.selected_answer(question.question.id)
                == Some(option.as_str())
            {
                "  <- selected"
            } else {
                ""
            };
            println!("  {label}) {option}{marker}");
        }
    }

    async fn show_dashboard(&self) {
        match self.client.dashboard().await {
            Ok(summary) => {
                println!("Total quizzes: {}", summary.total_quizzes);
                println!("Completed:     {}", summary.completed);
                println!("Average score: {:.1}", summary.average_score);
                if !summary.recent.is_empty() {
                    println!("Recent:");
                    for entry in &summary.recent {
                        println!("  {} - {}/{}", entry.title, entry.score, entry.total);
                    }
                }
            }
            Err(err) => println!("Failed to load the dashboard: {err}"),
        }
    }

    async fn show_results(&self) {
        match self.client.results().await {
            Ok(results) if results.is_empty() => println!("No graded attempts yet."),
            Ok(results) => {
                println!("Graded attempts:");
                for result in results {
                    let submitted = result
                        .submitted_at
                        .map(|instant| format_display(instant, self.offset))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "  [{}] {}  {}/{}  ({submitted})",
                        result.quiz_id, result.title, result.score, result.total
                    );
                }
                println!("Inspect one with 'view <quiz id>'.");
            }
            Err(err) => println!("Failed to load results: {err}"),
        }
    }

    async fn show_result_detail(&self, quiz_id: i64) {
        match self.client.result_detail(quiz_id).await {
            Ok(detail) => {
                println!("Score: {}/{}", detail.score, detail.total);
                if detail.total > 0 {
                    let percent =
                        (detail.score as f64 / detail.total as f64 * 100.0).round() as i64;
                    println!("Percentage: {percent}%");
                }
                for (index, question) in detail.questions.iter().enumerate() {
                    println!();
                    println!("{}. {}", index + 1, question.question_text);
                    for (option, verdict) in review::review_options(question) {
                        match verdict {
                            OptionVerdict::Correct => println!("   + {option}"),
                            OptionVerdict::ChosenIncorrect => {
                                println!("   x {option}  (your answer)")
                            }
                            OptionVerdict::Neutral => println!("     {option}"),
                        }
                    }
                }
            }
            Err(err) => println!("Failed to load the result: {err}"),
        }
    }

    async fn leave_active_quiz(&mut self) {
        let Some(quiz_id) = self.runner.session().attempt().map(|attempt| attempt.quiz.id)
        else {
            return;
        };
        self.runner.abandon();
        if let Err(err) = self.client.report_violation(quiz_id, LEAVE_VIOLATION).await {
            tracing::warn!(error = %err, quiz_id, "Failed to report abandoned attempt");
        }
    }
}

fn print_menu_help() {
    println!("Commands:");
    println!("  l / list        show available quizzes");
    println!("  r / refresh     reload quizzes and results");
    println!("  start <id>      begin a quiz");
    println!("  d / dashboard   progress summary");
    println!("  s / results     graded attempts");
    println!("  v / view <id>   review one graded attempt");
    println!("  logout          forget the stored session and exit");
    println!("  q / quit        exit");
}

fn print_quiz_help() {
    println!("During a quiz:");
    println!("  a..d            select the option with that label");
    println!("  n / next        next question (submits on the last one)");
    println!("  p / prev        previous question");
    println!("  submit / retry  submit the attempt");
    println!("  x / leave       abandon the attempt");
    println!("  q / quit        abandon and exit");
}
