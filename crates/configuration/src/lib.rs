use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{is_sql_identifier, DatabaseSettings, ServerSettings, Settings};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `CONTACTS__DATABASE__PASSWORD`.
pub const ENV_PREFIX: &str = "CONTACTS";

/// Command-line flags selecting the configuration file.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Path to the configuration file (TOML or YAML).
    #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
    pub config: std::path::PathBuf,
}

/// Loads the application configuration from `path`.
///
/// The file format is inferred from the extension. Environment variables
/// prefixed with `CONTACTS__` override file values. The result is validated
/// before it is returned, so a `Settings` in hand is always usable.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate().map_err(ConfigError::ValidationError)?;

    tracing::debug!(path = %path.display(), database = ?settings.database, "Configuration loaded.");
    Ok(settings)
}
