use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::api::auth;
use crate::api::client::ApiClient;
use crate::core::config::Settings;
use crate::core::session_store::{self, StoredSession};
use crate::schemas::auth::Role;

pub(crate) mod admin;
pub(crate) mod student;

pub(crate) type InputLines = Lines<BufReader<Stdin>>;

pub(crate) fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Prints a label without newline and reads one trimmed line. `None` means
/// the console input was closed.
pub(crate) async fn prompt(lines: &mut InputLines, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush().ok();
    let line = lines.next_line().await.context("Failed to read console input")?;
    Ok(line.map(|value| value.trim().to_string()))
}

pub(crate) fn session_file_path(settings: &Settings) -> PathBuf {
    settings
        .auth()
        .session_file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(session_store::default_path)
}

/// Resolves a usable login session: an explicit token from the environment,
/// a previously stored session of the right role, or an interactive login.
/// Accounts flagged must-change-password are forced through the reset flow
/// and back to the login prompt, matching the web client.
pub(crate) async fn establish_session(
    client: &ApiClient,
    settings: &Settings,
    lines: &mut InputLines,
    expected: Role,
) -> Result<StoredSession> {
    if let Some(token) = settings.auth().token.clone() {
        client.set_token(Some(token.clone()));
        return Ok(StoredSession {
            token,
            name: "operator".to_string(),
            role: expected,
            must_change_password: false,
        });
    }

    let path = session_file_path(settings);
    if let Some(stored) = session_store::load(&path) {
        if stored.must_change_password {
            client.set_token(Some(stored.token.clone()));
            force_password_reset(client, lines).await?;
            session_store::clear(&path);
            client.set_token(None);
            println!("Password updated. Please log in again.");
        } else if stored.role != expected {
            println!(
                "Stored session belongs to a {} account; please log in.",
                stored.role.as_str()
            );
        } else {
            client.set_token(Some(stored.token.clone()));
            println!("Welcome back, {}.", stored.name);
            return Ok(stored);
        }
    }

    login_loop(client, settings, lines, expected, &path).await
}

async fn login_loop(
    client: &ApiClient,
    settings: &Settings,
    lines: &mut InputLines,
    expected: Role,
    path: &std::path::Path,
) -> Result<StoredSession> {
    println!("Sign in to continue. (Type 'forgot' to request a reset email, 'reset-token' to use one.)");

    loop {
        let (email, password, from_env) = match credentials(settings, lines).await? {
            Credentials::Login { email, password, from_env } => (email, password, from_env),
            Credentials::Forgot => {
                forgot_password_flow(client, lines).await?;
                continue;
            }
            Credentials::ResetToken => {
                token_reset_flow(client, lines).await?;
                continue;
            }
        };

        match auth::login(client, &email, &password).await {
            Ok(response) => {
                let stored = StoredSession::from_login(response.token, &response.user);
                if stored.must_change_password {
                    force_password_reset(client, lines).await?;
                    client.set_token(None);
                    println!("Password updated. Please log in again.");
                    continue;
                }
                if stored.role != expected {
                    client.set_token(None);
                    bail!(
                        "account \"{}\" has role {}, which this console does not serve",
                        stored.name,
                        stored.role.as_str()
                    );
                }
                if let Err(err) = session_store::save(path, &stored) {
                    tracing::warn!(error = %err, "Failed to persist session");
                }
                println!("Logged in as {}.", stored.name);
                return Ok(stored);
            }
            Err(err) if from_env => {
                bail!("login with QUIZPOINT_EMAIL/QUIZPOINT_PASSWORD failed: {err}")
            }
            Err(err) => println!("Login failed: {err}"),
        }
    }
}

enum Credentials {
    Login { email: String, password: String, from_env: bool },
    Forgot,
    ResetToken,
}

async fn credentials(settings: &Settings, lines: &mut InputLines) -> Result<Credentials> {
    if let (Some(email), Some(password)) =
        (settings.auth().email.clone(), settings.auth().password.clone())
    {
        return Ok(Credentials::Login { email, password, from_env: true });
    }

    let Some(email) = prompt(lines, "Email: ").await? else {
        bail!("console input closed before login completed");
    };
    match email.as_str() {
        "forgot" => return Ok(Credentials::Forgot),
        "reset-token" => return Ok(Credentials::ResetToken),
        _ => {}
    }

    let Some(password) = prompt(lines, "Password: ").await? else {
        bail!("console input closed before login completed");
    };
    Ok(Credentials::Login { email, password, from_env: false })
}

async fn forgot_password_flow(client: &ApiClient, lines: &mut InputLines) -> Result<()> {
    let Some(email) = prompt(lines, "Account email: ").await? else {
        bail!("console input closed");
    };
    match auth::forgot_password(client, &email).await {
        Ok(()) => println!("If the account exists, a reset email is on its way."),
        Err(err) => println!("Could not request a reset email: {err}"),
    }
    Ok(())
}

async fn token_reset_flow(client: &ApiClient, lines: &mut InputLines) -> Result<()> {
    let Some(token) = prompt(lines, "Reset token: ").await? else {
        bail!("console input closed");
    };
    let Some(new_password) = read_new_password(lines).await? else {
        bail!("console input closed");
    };
    match auth::reset_password_with_token(client, &token, &new_password).await {
        Ok(()) => println!("Password updated. You can log in now."),
        Err(err) => println!("Password reset failed: {err}"),
    }
    Ok(())
}

async fn force_password_reset(client: &ApiClient, lines: &mut InputLines) -> Result<()> {
    println!("A password reset is required before continuing.");
    loop {
        let Some(new_password) = read_new_password(lines).await? else {
            bail!("console input closed before the required password reset");
        };
        match auth::reset_password(client, &new_password).await {
            Ok(()) => return Ok(()),
            Err(err) => println!("Password reset failed: {err}"),
        }
    }
}

async fn read_new_password(lines: &mut InputLines) -> Result<Option<String>> {
    loop {
        let Some(password) = prompt(lines, "New password: ").await? else {
            return Ok(None);
        };
        if password.chars().count() < 6 {
            println!("Password must be at least 6 characters");
            continue;
        }
        return Ok(Some(password));
    }
}

pub(crate) fn logout(client: &ApiClient, path: &std::path::Path) {
    session_store::clear(path);
    client.set_token(None);
    println!("Logged out.");
}
