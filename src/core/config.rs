use std::env;

use thiserror::Error;
use time::{macros::format_description, UtcOffset};

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    api: ApiSettings,
    auth: AuthSettings,
    quiz: QuizSettings,
    display: DisplaySettings,
    runtime: RuntimeSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) base_url: String,
    pub(crate) timeout_seconds: u64,
    pub(crate) connect_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct AuthSettings {
    pub(crate) email: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) token: Option<String>,
    pub(crate) session_file: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct QuizSettings {
    pub(crate) question_seconds: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct DisplaySettings {
    pub(crate) utc_offset: UtcOffset,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let base_url = env_or_default("QUIZPOINT_API_URL", "http://localhost:5000/api")
            .trim_end_matches('/')
            .to_string();
        let timeout_seconds = parse_u64(
            "QUIZPOINT_TIMEOUT_SECONDS",
            env_or_default("QUIZPOINT_TIMEOUT_SECONDS", "30"),
        )?;
        let connect_timeout_seconds = parse_u64(
            "QUIZPOINT_CONNECT_TIMEOUT_SECONDS",
            env_or_default("QUIZPOINT_CONNECT_TIMEOUT_SECONDS", "10"),
        )?;

        let email = env_optional("QUIZPOINT_EMAIL");
        let password = env_optional("QUIZPOINT_PASSWORD");
        let token = env_optional("QUIZPOINT_TOKEN");
        let session_file = env_optional("QUIZPOINT_SESSION_FILE");

        let question_seconds = parse_u32(
            "QUIZPOINT_QUESTION_SECONDS",
            env_or_default("QUIZPOINT_QUESTION_SECONDS", "30"),
        )?;

        let utc_offset =
            parse_utc_offset("QUIZPOINT_DISPLAY_OFFSET", env_optional("QUIZPOINT_DISPLAY_OFFSET"))?;

        let environment = parse_environment(
            env_optional("QUIZPOINT_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );

        let log_level = env_or_default("QUIZPOINT_LOG_LEVEL", "info");
        let json = env_optional("QUIZPOINT_LOG_JSON")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);

        let settings = Self {
            api: ApiSettings { base_url, timeout_seconds, connect_timeout_seconds },
            auth: AuthSettings { email, password, token, session_file },
            quiz: QuizSettings { question_seconds },
            display: DisplaySettings { utc_offset },
            runtime: RuntimeSettings { environment },
            telemetry: TelemetrySettings { log_level, json },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn auth(&self) -> &AuthSettings {
        &self.auth
    }

    pub(crate) fn quiz(&self) -> &QuizSettings {
        &self.quiz
    }

    pub(crate) fn display(&self) -> &DisplaySettings {
        &self.display
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "QUIZPOINT_API_URL",
                value: self.api.base_url.clone(),
            });
        }
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUIZPOINT_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }
        if self.quiz.question_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUIZPOINT_QUESTION_SECONDS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u32(field: &'static str, value: String) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|val| val.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

// Timestamps travel as absolute instants; the display offset only affects how
// they are rendered. Defaults to IST to match the deployed cohort.
fn parse_utc_offset(
    field: &'static str,
    value: Option<String>,
) -> Result<UtcOffset, ConfigError> {
    let Some(raw) = value else {
        return Ok(UtcOffset::from_hms(5, 30, 0).expect("static offset"));
    };

    UtcOffset::parse(&raw, &format_description!("[offset_hour sign:mandatory]:[offset_minute]"))
        .map_err(|_| ConfigError::InvalidValue { field, value: raw })
}
