use std::sync::Arc;

use anyhow::Result;
use time::UtcOffset;

use crate::api::admin as admin_api;
use crate::api::client::ApiClient;
use crate::app::{logout, prompt, session_file_path, InputLines};
use crate::core::config::Settings;
use crate::core::time::{format_display, format_offset, now_utc};
use crate::schemas;
use crate::schemas::admin::{PublishRequest, QuestionDraft, QuestionUpdate, StudentCreate};

pub(crate) async fn run(
    client: Arc<ApiClient>,
    settings: &Settings,
    display_name: &str,
    lines: &mut InputLines,
) -> Result<()> {
    let offset = settings.display().utc_offset;
    println!("Admin console ready, {display_name}. Type 'h' for commands.");

    loop {
        let Some(line) = prompt(lines, "> ").await? else { break };
        let mut parts = line.split_whitespace();
        match parts.next() {
            None => {}
            Some("h") | Some("help") => print_help(),
            Some("l") | Some("list") => list_quizzes(&client).await,
            Some("c") | Some("create") => create_quiz(&client, lines).await?,
            Some("ql") => match parse_id(parts.next()) {
                Some(quiz_id) => list_questions(&client, quiz_id).await,
                None => println!("Usage: ql <quiz id>"),
            },
            Some("qa") => match parse_id(parts.next()) {
                Some(quiz_id) => add_question(&client, lines, quiz_id).await?,
                None => println!("Usage: qa <quiz id>"),
            },
            Some("qe") => match parse_id(parts.next()) {
                Some(question_id) => edit_question(&client, lines, question_id).await?,
                None => println!("Usage: qe <question id>"),
            },
            Some("pub") | Some("publish") => match parse_id(parts.next()) {
                Some(quiz_id) => publish_quiz(&client, lines, quiz_id, offset).await?,
                None => println!("Usage: pub <quiz id>"),
            },
            Some("delete-quiz") => match parse_id(parts.next()) {
                Some(quiz_id) => match admin_api::delete_quiz(&client, quiz_id).await {
                    Ok(()) => println!("Quiz {quiz_id} deleted."),
                    Err(err) => println!("Delete failed: {err}"),
                },
                None => println!("Usage: delete-quiz <quiz id>"),
            },
            Some("delete-question") => match parse_id(parts.next()) {
                Some(question_id) => {
                    match admin_api::delete_question(&client, question_id).await {
                        Ok(()) => println!("Question {question_id} deleted."),
                        Err(err) => println!("Delete failed: {err}"),
                    }
                }
                None => println!("Usage: delete-question <question id>"),
            },
            Some("s") | Some("student") => add_student(&client, lines).await?,
            Some("logout") => {
                logout(&client, &session_file_path(settings));
                break;
            }
            Some("q") | Some("quit") => break,
            _ => println!("Unknown command. Type 'h' for help."),
        }
    }

    Ok(())
}

async fn list_quizzes(client: &ApiClient) {
    match admin_api::list_quizzes(client).await {
        Ok(quizzes) if quizzes.is_empty() => println!("No quizzes yet."),
        Ok(quizzes) => {
            for quiz in quizzes {
                let status = if quiz.is_active { "active" } else { "draft" };
                let submissions = if quiz.has_submissions { ", has submissions" } else { "" };
                println!("  [{}] {}  ({status}{submissions})", quiz.id, quiz.title);
            }
        }
        Err(err) => println!("Failed to list quizzes: {err}"),
    }
}

async fn create_quiz(client: &ApiClient, lines: &mut InputLines) -> Result<()> {
    let Some(title) = prompt(lines, "Quiz title: ").await? else { return Ok(()) };
    match admin_api::create_quiz(client, &title).await {
        Ok(()) => println!("Quiz created."),
        Err(err) => println!("Create failed: {err}"),
    }
    Ok(())
}

async fn list_questions(client: &ApiClient, quiz_id: i64) {
    match admin_api::list_questions(client, quiz_id).await {
        Ok(questions) if questions.is_empty() => println!("No questions in quiz {quiz_id}."),
        Ok(questions) => {
            for question in questions {
                println!("  [{}] {}", question.id, question.question_text);
                for (label, option) in ["A", "B", "C", "D"].iter().zip(question.options()) {
                    println!("      {label}) {option}");
                }
            }
        }
        Err(err) => println!("Failed to list questions: {err}"),
    }
}

async fn add_question(client: &ApiClient, lines: &mut InputLines, quiz_id: i64) -> Result<()> {
    let Some((question, options, correct_option)) = question_form(lines).await? else {
        return Ok(());
    };
    let draft = QuestionDraft { quiz_id, question, options, correct_option };
    match admin_api::add_question(client, &draft).await {
        Ok(()) => println!("Question added."),
        Err(err) => println!("Add failed: {err}"),
    }
    Ok(())
}

async fn edit_question(
    client: &ApiClient,
    lines: &mut InputLines,
    question_id: i64,
) -> Result<()> {
    let Some((question, options, correct_option)) = question_form(lines).await? else {
        return Ok(());
    };
    let update = QuestionUpdate { question, options, correct_option };
    match admin_api::update_question(client, question_id, &update).await {
        Ok(()) => println!("Question updated."),
        Err(err) => println!("Update failed: {err}"),
    }
    Ok(())
}

async fn question_form(
    lines: &mut InputLines,
) -> Result<Option<(String, Vec<String>, String)>> {
    let Some(question) = prompt(lines, "Question text: ").await? else { return Ok(None) };
    let mut options = Vec::with_capacity(4);
    for label in ["A", "B", "C", "D"] {
        let Some(option) = prompt(lines, &format!("Option {label}: ")).await? else {
            return Ok(None);
        };
        options.push(option);
    }
    let Some(correct) = prompt(lines, "Correct option (exact text): ").await? else {
        return Ok(None);
    };
    Ok(Some((question, options, correct)))
}

async fn publish_quiz(
    client: &ApiClient,
    lines: &mut InputLines,
    quiz_id: i64,
    offset: UtcOffset,
) -> Result<()> {
    let Some(target_class) = prompt(lines, "Target class: ").await? else { return Ok(()) };
    let Some(raw) = prompt(lines, "Publish at (e.g. 2026-03-01T10:00 or RFC3339): ").await?
    else {
        return Ok(());
    };

    let Some(publish_at) = schemas::parse_offset_datetime_flexible(&raw) else {
        println!("Could not parse \"{raw}\" as a timestamp.");
        return Ok(());
    };
    if publish_at < now_utc() {
        println!("Note: that moment is already in the past; the quiz goes live immediately.");
    }

    let request =
        PublishRequest { target_class, publish_at: format_offset(publish_at) };
    match admin_api::publish_quiz(client, quiz_id, &request).await {
        Ok(()) => println!(
            "Quiz {quiz_id} scheduled for {}.",
            format_display(publish_at, offset)
        ),
        Err(err) => println!("Publish failed: {err}"),
    }
    Ok(())
}

async fn add_student(client: &ApiClient, lines: &mut InputLines) -> Result<()> {
    let Some(name) = prompt(lines, "Student name: ").await? else { return Ok(()) };
    let Some(email) = prompt(lines, "Student email: ").await? else { return Ok(()) };
    let student = StudentCreate { name, email };
    match admin_api::add_student(client, &student).await {
        Ok(()) => println!("Student added."),
        Err(err) => println!("Add failed: {err}"),
    }
    Ok(())
}

fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.parse().ok())
}

fn print_help() {
    println!("Commands:");
    println!("  l / list                 list quizzes");
    println!("  c / create               create a quiz");
    println!("  ql <quiz id>             list its questions");
    println!("  qa <quiz id>             add a question");
    println!("  qe <question id>         edit a question");
    println!("  pub <quiz id>            schedule publication");
    println!("  delete-quiz <id>         delete a quiz");
    println!("  delete-question <id>     delete a question");
    println!("  s / student              add a student to the roster");
    println!("  logout                   forget the stored session and exit");
    println!("  q / quit                 exit");
}
