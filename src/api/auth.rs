use serde_json::Value;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::schemas::auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest, TokenResetRequest,
};

/// Logs in and installs the returned bearer token on the client.
pub(crate) async fn login(
    client: &ApiClient,
    email: &str,
    password: &str,
) -> Result<LoginResponse, ApiError> {
    let payload =
        LoginRequest { email: email.trim().to_string(), password: password.to_string() };
    let response: LoginResponse = client.post("/auth/login", &payload).await?;
    client.set_token(Some(response.token.clone()));
    Ok(response)
}

pub(crate) async fn forgot_password(client: &ApiClient, email: &str) -> Result<(), ApiError> {
    let payload = ForgotPasswordRequest { email: email.trim().to_string() };
    let _: Value = client.post("/auth/forgot-password", &payload).await?;
    Ok(())
}

/// First-login flow: the bearer token authenticates the change.
pub(crate) async fn reset_password(client: &ApiClient, new_password: &str) -> Result<(), ApiError> {
    let payload = ResetPasswordRequest { new_password: new_password.to_string() };
    let _: Value = client.put("/auth/reset-password", &payload).await?;
    Ok(())
}

/// Forgot-password flow: authenticated by the emailed token instead.
pub(crate) async fn reset_password_with_token(
    client: &ApiClient,
    token: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let payload =
        TokenResetRequest { token: token.to_string(), new_password: new_password.to_string() };
    let _: Value = client.post("/auth/reset-password-token", &payload).await?;
    Ok(())
}
