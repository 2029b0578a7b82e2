use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::password::PasswordPolicy;

// Development fallbacks, never meant for a real deployment
pub const DEV_JWT_SECRET: &str = "super-secret";
pub const DEV_APP_SECRET: &str = "dev-secret-key";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

// Runtime settings, read from the environment once at startup
#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub secret_key: String,
    pub jwt_expires_minutes: i64,
    pub cors_origin: HeaderValue,
    pub password_policy: PasswordPolicy,
    pub require_email: bool,
    pub bcrypt_cost: u32,
}

// Secrets are never printed
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_secret", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("jwt_expires_minutes", &self.jwt_expires_minutes)
            .field("cors_origin", &self.cors_origin)
            .field("password_policy", &self.password_policy)
            .field("require_email", &self.require_email)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_url: "sqlite://db.sqlite".to_string(),
            database_max_connections: 10,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            secret_key: DEV_APP_SECRET.to_string(),
            jwt_expires_minutes: 15,
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            password_policy: PasswordPolicy::strict(),
            require_email: true,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Config {
    // Builds the configuration from process environment variables.
    // Call `dotenv::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Builds the configuration from an arbitrary key lookup; missing keys keep
    // their development default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup("BIND_ADDR") {
            config.bind_addr = parse("BIND_ADDR", value)?;
        }
        if let Some(value) = lookup("DATABASE_URL") {
            config.database_url = value;
        }
        if let Some(value) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.database_max_connections = parse("DATABASE_MAX_CONNECTIONS", value)?;
        }
        if let Some(value) = lookup("JWT_SECRET_KEY") {
            config.jwt_secret = non_empty("JWT_SECRET_KEY", value)?;
        }
        if let Some(value) = lookup("SECRET_KEY") {
            config.secret_key = non_empty("SECRET_KEY", value)?;
        }
        if let Some(value) = lookup("JWT_ACCESS_TOKEN_EXPIRES_MINUTES") {
            let minutes: i64 = parse("JWT_ACCESS_TOKEN_EXPIRES_MINUTES", value.clone())?;
            if minutes <= 0 {
                return Err(ConfigError::Invalid {
                    key: "JWT_ACCESS_TOKEN_EXPIRES_MINUTES",
                    value,
                });
            }
            config.jwt_expires_minutes = minutes;
        }
        if let Some(value) = lookup("CORS_ORIGIN") {
            config.cors_origin = HeaderValue::from_str(&value)
                .map_err(|_| ConfigError::Invalid { key: "CORS_ORIGIN", value })?;
        }
        if let Some(value) = lookup("PASSWORD_POLICY") {
            config.password_policy = match value.to_ascii_lowercase().as_str() {
                "basic" => PasswordPolicy::basic(),
                "strict" => PasswordPolicy::strict(),
                _ => return Err(ConfigError::Invalid { key: "PASSWORD_POLICY", value }),
            };
        }
        if let Some(value) = lookup("REQUIRE_EMAIL") {
            config.require_email = parse_bool("REQUIRE_EMAIL", value)?;
        }
        if let Some(value) = lookup("BCRYPT_COST") {
            let cost: u32 = parse("BCRYPT_COST", value.clone())?;
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::Invalid { key: "BCRYPT_COST", value });
            }
            config.bcrypt_cost = cost;
        }

        Ok(config)
    }

    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn uses_dev_app_secret(&self) -> bool {
        self.secret_key == DEV_APP_SECRET
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

fn non_empty(key: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid { key, value });
    }
    Ok(value)
}
