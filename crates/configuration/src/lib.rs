use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Config, DashboardSettings, DatabaseSettings, LoggingSettings};

/// Prefix for environment overrides, e.g. `CAFE__DASHBOARD__MAX_LIMIT=50`.
const ENV_PREFIX: &str = "CAFE";

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file at `path`
/// (optional), `CAFE__*` environment variables, and finally `DATABASE_URL`.
/// The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut builder = defaults()?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    finish(builder)
}

/// Parses configuration from TOML text, applying the same defaults and validation.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let builder = defaults()?.add_source(config::File::from_str(toml, config::FileFormat::Toml));
    finish(builder)
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Ok(config::Config::builder()
        .set_default("database.max_connections", 10)?
        .set_default("database.acquire_timeout_secs", 5)?)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    tracing::debug!(?config.dashboard, "Configuration loaded.");
    Ok(config)
}
