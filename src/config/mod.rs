//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `QUIZ_COACH`
//! prefix and `__` (double underscore) as the nesting separator.
//!
//! # Example
//!
//! ```no_run
//! use quiz_coach::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod database;
mod error;
mod gateway;
mod server;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Messaging gateway credentials
    pub gateway: GatewayConfig,

    /// Completion service configuration
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads variables such as
    /// `QUIZ_COACH__SERVER__PORT=8000` and
    /// `QUIZ_COACH__DATABASE__URL=postgresql://…`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("QUIZ_COACH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration sections
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any value is semantically invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.gateway.validate()?;
        self.ai.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("QUIZ_COACH__DATABASE__URL", "postgresql://test@localhost/quiz");
        env::set_var("QUIZ_COACH__GATEWAY__SIGNING_SECRET", "secret");
        env::set_var("QUIZ_COACH__GATEWAY__BOT_TOKEN", "xoxb-test");
        env::set_var("QUIZ_COACH__AI__API_TOKEN", "hf_test");
    }

    fn clear_env() {
        env::remove_var("QUIZ_COACH__DATABASE__URL");
        env::remove_var("QUIZ_COACH__GATEWAY__SIGNING_SECRET");
        env::remove_var("QUIZ_COACH__GATEWAY__BOT_TOKEN");
        env::remove_var("QUIZ_COACH__AI__API_TOKEN");
        env::remove_var("QUIZ_COACH__SERVER__PORT");
    }

    #[test]
    fn loads_and_validates_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.database.url, "postgresql://test@localhost/quiz");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn server_section_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.ai.model, "google/gemma-2-2b-it");
    }

    #[test]
    fn custom_server_port_overrides_default() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("QUIZ_COACH__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().server.port, 3000);
    }
}
