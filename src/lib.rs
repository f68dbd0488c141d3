pub(crate) mod api;
pub(crate) mod app;
pub(crate) mod core;
pub(crate) mod review;
pub(crate) mod schemas;
pub(crate) mod session;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::core::{config::Settings, telemetry};
use crate::schemas::auth::Role;

pub async fn run() -> anyhow::Result<()> {
    let (client, settings, mut lines) = bootstrap("student console")?;
    let session =
        app::establish_session(&client, &settings, &mut lines, Role::Student).await?;
    app::student::run(client, &settings, &session.name, &mut lines).await
}

pub async fn run_admin() -> anyhow::Result<()> {
    let (client, settings, mut lines) = bootstrap("admin console")?;
    let session = app::establish_session(&client, &settings, &mut lines, Role::Admin).await?;
    app::admin::run(client, &settings, &session.name, &mut lines).await
}

fn bootstrap(console: &str) -> anyhow::Result<(Arc<ApiClient>, Settings, app::InputLines)> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let client = Arc::new(ApiClient::from_settings(&settings)?);

    tracing::info!(
        base_url = %settings.api().base_url,
        environment = %settings.runtime().environment.as_str(),
        "QuizPoint {console} starting"
    );

    Ok((client, settings, app::stdin_lines()))
}
