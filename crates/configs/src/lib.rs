//! # configs
//!
//! Typed settings for the portal binaries.
//!
//! Sources are layered, later ones win:
//! 1. built-in defaults
//! 2. `config/portal.toml` (optional)
//! 3. environment variables prefixed `PORTAL__`, nested with `__`
//!    (e.g. `PORTAL__DATABASE__URL`, `PORTAL__DIGEST__HOUR`)
//!
//! A `.env` file in the working directory is loaded first, if present.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

pub const CONFIG_FILE: &str = "config/portal";
pub const ENV_PREFIX: &str = "PORTAL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub mail: MailSettings,
    pub digest: DigestSettings,
    pub content: ContentSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// Unset means the in-memory store.
    pub url: Option<SecretString>,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    Log,
    Outbox,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub backend: MailBackend,
    pub from: String,
    pub outbox_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DigestSettings {
    pub enabled: bool,
    /// Three-letter or full English weekday name.
    pub weekday: String,
    pub hour: u32,
    pub minute: u32,
    pub subject: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentSettings {
    pub banned_words: Vec<String>,
    pub news_daily_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    /// `EnvFilter` directive; `RUST_LOG` overrides it when set.
    pub filter: String,
}

/// Builder pre-loaded with every default, ready for more sources.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.max_connections", 10)?
        .set_default("database.run_migrations", true)?
        .set_default("mail.backend", "log")?
        .set_default("mail.from", "noreply@example.com")?
        .set_default("mail.outbox_dir", "./data/outbox")?
        .set_default("digest.enabled", true)?
        .set_default("digest.weekday", "mon")?
        .set_default("digest.hour", 8)?
        .set_default("digest.minute", 0)?
        .set_default("digest.subject", "Weekly news digest")?
        .set_default("content.banned_words", Vec::<String>::new())?
        .set_default("content.news_daily_limit", 3)?
        .set_default("log.format", "pretty")?
        .set_default("log.filter", "info,sqlx=warn")?;
    Ok(builder)
}

impl Settings {
    /// Loads `.env`, then defaults, the optional file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let config = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("content.banned_words")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.digest.hour > 23 {
            return Err(ConfigError::Invalid {
                key: "digest.hour",
                reason: format!("{} is not an hour of the day", self.digest.hour),
            });
        }
        if self.digest.minute > 59 {
            return Err(ConfigError::Invalid {
                key: "digest.minute",
                reason: format!("{} is not a minute of the hour", self.digest.minute),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
