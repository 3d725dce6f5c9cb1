//! Runtime configuration for the API.
//!
//! Values come from the process environment (a `.env` file is honoured)
//! or, when `APP_CONFIG_PATH` is set, from a JSON file with the same shape
//! as [`AppConfig`].

mod config_loader;
pub use config_loader::*;

pub const ENV_CONFIG_PATH: &str = "APP_CONFIG_PATH";
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_BODY_LIMIT: &str = "BODY_LIMIT";
pub const ENV_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_SECS";
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
pub const ENV_JWT_EXPIRY: &str = "JWT_EXPIRY_MINUTES";
pub const ENV_CORS_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_GROQ_BASE_URL: &str = "GROQ_BASE_URL";
pub const ENV_GROQ_MODEL: &str = "GROQ_MODEL";
pub const ENV_SENTRY_DSN: &str = "SENTRY_DSN";
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-change-in-production";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_JWT_EXPIRY_MINUTES: u64 = 30;
/// One year
pub const MAX_JWT_EXPIRY_MINUTES: u64 = 525_600;
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-70b-versatile";
