use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKCLUB_ENV";
const CONFIG_DIR_ENV: &str = "BOOKCLUB_CONFIG_DIR";

/// Signing secret used when nothing is configured. Refused in production.
pub const DEV_JWT_SECRET: &str = "bookclub-development-secret";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_MINUTES: u64 = 60 * 24 * 365;

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay
    /// and `BOOKCLUB_*` variables (nested keys separated by `__`).
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix("BOOKCLUB")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parse_environment(&environment)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Reject combinations that are unsafe to run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.environment == Environment::Production && self.auth.jwt_secret == DEV_JWT_SECRET {
            return Err(anyhow!(
                "auth.jwt_secret must be configured in production (set BOOKCLUB_AUTH__JWT_SECRET)"
            ));
        }
        if self.auth.token_ttl_minutes == 0 {
            return Err(anyhow!("auth.token_ttl_minutes must be greater than zero"));
        }
        if self.auth.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(anyhow!(
                "auth.token_ttl_minutes must be at most {} (one year)",
                MAX_TOKEN_TTL_MINUTES
            ));
        }
        Ok(())
    }
}

fn parse_environment(value: &str) -> anyhow::Result<Environment> {
    match value {
        "local" => Ok(Environment::Local),
        "staging" => Ok(Environment::Staging),
        "production" => Ok(Environment::Production),
        other => Err(anyhow!(
            "unsupported environment '{}'; expected local/staging/production",
            other
        )),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "sqlite://bookclub.db?mode=rwc".to_string()
    }

    fn default_max_connections() -> u32 {
        8
    }

    /// Settings for a throwaway in-memory database.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info,tower_http=info,sqlx=warn".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "AuthSettings::default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "AuthSettings::default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
    #[serde(default)]
    pub password_hash: PasswordHashSettings,
}

impl AuthSettings {
    fn default_jwt_secret() -> String {
        DEV_JWT_SECRET.to_string()
    }

    fn default_token_ttl_minutes() -> u64 {
        15
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: Self::default_jwt_secret(),
            token_ttl_minutes: Self::default_token_ttl_minutes(),
            password_hash: PasswordHashSettings::default(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHashSettings {
    #[serde(default = "PasswordHashSettings::default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "PasswordHashSettings::default_iterations")]
    pub iterations: u32,
    #[serde(default = "PasswordHashSettings::default_parallelism")]
    pub parallelism: u32,
}

impl PasswordHashSettings {
    fn default_memory_kib() -> u32 {
        19 * 1024
    }

    fn default_iterations() -> u32 {
        2
    }

    fn default_parallelism() -> u32 {
        1
    }

    /// Cheapest parameters argon2 accepts; for tests only.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for PasswordHashSettings {
    fn default() -> Self {
        Self {
            memory_kib: Self::default_memory_kib(),
            iterations: Self::default_iterations(),
            parallelism: Self::default_parallelism(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_database_is_local_sqlite_file() {
        let settings = Settings::default();
        assert_eq!(settings.database.url, "sqlite://bookclub.db?mode=rwc");
    }

    #[test]
    fn production_requires_real_secret() {
        let mut settings = Settings {
            environment: Environment::Production,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        settings.auth.jwt_secret = "s3cr3t-from-vault".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_token_ttl_is_rejected() {
        let mut settings = Settings::default();
        settings.auth.token_ttl_minutes = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn token_ttl_is_capped_at_one_year() {
        let mut settings = Settings::default();
        settings.auth.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES;
        assert!(settings.validate().is_ok());

        settings.auth.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES + 1;
        assert!(settings.validate().is_err());
        settings.auth.token_ttl_minutes = u64::MAX;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(parse_environment("qa").is_err());
        assert_eq!(parse_environment("staging").unwrap(), Environment::Staging);
    }
}
