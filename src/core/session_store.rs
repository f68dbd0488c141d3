use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::schemas::auth::{Role, UserProfile};

/// Client-local persisted session: the bearer token plus the profile flags
/// the UI needs before any request is made. The quiz session controller
/// never reads or writes this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    pub(crate) token: String,
    pub(crate) name: String,
    pub(crate) role: Role,
    #[serde(default)]
    pub(crate) must_change_password: bool,
}

impl StoredSession {
    pub(crate) fn from_login(token: String, profile: &UserProfile) -> Self {
        Self {
            token,
            name: profile.name.clone(),
            role: profile.role,
            must_change_password: profile.must_change_password,
        }
    }
}

pub(crate) fn default_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".quizpoint_session")
}

/// Tolerant load: a missing or corrupt file just means "not logged in".
pub(crate) fn load(path: &Path) -> Option<StoredSession> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Discarding unreadable session file");
            None
        }
    }
}

pub(crate) fn save(path: &Path, session: &StoredSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create session directory {}", parent.display()))?;
    }

    let raw = serde_json::to_string_pretty(session).context("Failed to encode session")?;
    fs::write(path, raw)
        .with_context(|| format!("Failed to write session file {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            tracing::warn!(error = %err, path = %path.display(), "Failed to set session file permissions");
        }
    }

    Ok(())
}

pub(crate) fn clear(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %err, path = %path.display(), "Failed to remove session file");
        }
    }
}
