use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub(crate) token: String,
    pub(crate) user: UserProfile,
}

/// Profile fields the client persists between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserProfile {
    pub(crate) name: String,
    pub(crate) role: Role,
    #[serde(rename = "mustChangePassword", default)]
    pub(crate) must_change_password: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "STUDENT")]
    Student,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Student => "STUDENT",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ForgotPasswordRequest {
    pub(crate) email: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordRequest {
    #[serde(rename = "newPassword")]
    pub(crate) new_password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResetRequest {
    pub(crate) token: String,
    #[serde(rename = "newPassword")]
    pub(crate) new_password: String,
}
