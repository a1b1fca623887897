//! Quiz Coach server entry point.
//!
//! Loads configuration, connects to PostgreSQL, wires the adapters into the
//! application services and serves the webhook gateway over HTTP.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use quiz_coach::adapters::completion::{HfRouterCompletion, HfRouterConfig};
use quiz_coach::adapters::gateway::SlackMessenger;
use quiz_coach::adapters::http::{app_router, AppState};
use quiz_coach::adapters::postgres::{PostgresQuestionBank, PostgresSessionStore};
use quiz_coach::application::{EventDispatcher, Trainer};
use quiz_coach::config::AppConfig;
use quiz_coach::domain::SignatureVerifier;
use quiz_coach::ports::CompletionOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database connected and migrations applied");

    let sessions = Arc::new(PostgresSessionStore::new(pool.clone()));
    let bank = Arc::new(PostgresQuestionBank::new(pool));

    let messenger = Arc::new(SlackMessenger::with_base_url(
        config.gateway.bot_token.expose_secret(),
        &config.gateway.api_base_url,
    )?);

    let completion = Arc::new(HfRouterCompletion::new(
        HfRouterConfig::new(config.ai.api_token.expose_secret())
            .with_model(&config.ai.model)
            .with_base_url(&config.ai.base_url)
            .with_ping_timeout(Duration::from_secs(config.ai.ping_timeout_secs)),
    )?);

    let trainer = Arc::new(
        Trainer::new(sessions, bank, messenger, completion).with_completion_options(
            CompletionOptions {
                timeout: Duration::from_secs(config.ai.generation_timeout_secs),
                ..CompletionOptions::default()
            },
        ),
    );

    let state = AppState {
        verifier: Arc::new(SignatureVerifier::new(
            config.gateway.signing_secret.expose_secret(),
        )),
        dispatcher: Arc::new(EventDispatcher::new(trainer)),
    };

    let app = app_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.server.socket_addr()?;
    info!(%addr, model = %config.ai.model, "quiz coach listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
