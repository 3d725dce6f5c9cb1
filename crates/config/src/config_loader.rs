use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, str::FromStr};
use tracing::{debug, info};

use app_error::{AppError, AppErrorExt, AppResult};

use crate::*;

/// Complete application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub environment: String,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub completion: CompletionConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_minutes: u64,
    pub algorithm: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

/// Settings for the chat completion provider. The provider is disabled
/// when `api_key` is absent or blank.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MonitoringConfig {
    pub sentry: SentryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl CompletionConfig {
    /// API key with surrounding whitespace removed, if one is set at all.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let content = fs::read_to_string(path.as_ref()).config_err()?;
        let config: AppConfig = serde_json::from_str(&content).config_err()?;
        debug!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    /// Build configuration from the process environment, reading `.env` first.
    pub fn from_env() -> AppResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to
    /// defaults for anything the lookup does not provide.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let cors_origins = get(ENV_CORS_ORIGINS)
            .map(|origins| {
                origins
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.security.cors.allowed_origins.clone());

        Ok(Self {
            environment: get(ENV_ENVIRONMENT).unwrap_or(defaults.environment),
            server: ServerConfig {
                host: get(ENV_HOST).unwrap_or(defaults.server.host),
                port: parse_or(get(ENV_PORT), ENV_PORT, defaults.server.port)?,
                body_limit: parse_or(get(ENV_BODY_LIMIT), ENV_BODY_LIMIT, defaults.server.body_limit)?,
                request_timeout_secs: parse_or(
                    get(ENV_REQUEST_TIMEOUT),
                    ENV_REQUEST_TIMEOUT,
                    defaults.server.request_timeout_secs,
                )?,
            },
            security: SecurityConfig {
                jwt: JwtConfig {
                    secret: get(ENV_SECRET_KEY).unwrap_or(defaults.security.jwt.secret),
                    expiry_minutes: parse_or(
                        get(ENV_JWT_EXPIRY),
                        ENV_JWT_EXPIRY,
                        defaults.security.jwt.expiry_minutes,
                    )?,
                    algorithm: defaults.security.jwt.algorithm,
                },
                cors: CorsConfig {
                    allowed_origins: cors_origins,
                    ..defaults.security.cors
                },
            },
            completion: CompletionConfig {
                api_key: get(ENV_GROQ_API_KEY),
                base_url: get(ENV_GROQ_BASE_URL).unwrap_or(defaults.completion.base_url),
                model: get(ENV_GROQ_MODEL).unwrap_or(defaults.completion.model),
            },
            monitoring: MonitoringConfig {
                sentry: SentryConfig {
                    dsn: get(ENV_SENTRY_DSN),
                    ..defaults.monitoring.sentry
                },
                logging: LoggingConfig {
                    level: get(ENV_LOG_LEVEL).unwrap_or(defaults.monitoring.logging.level),
                    format: get(ENV_LOG_FORMAT).unwrap_or(defaults.monitoring.logging.format),
                },
            },
        })
    }

    /// Load from `APP_CONFIG_PATH` when set, otherwise from the environment,
    /// and validate the result.
    pub fn load() -> AppResult<Self> {
        dotenv().ok();

        let config = match env::var(ENV_CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::from_env()?,
        };

        info!("Loaded configuration for environment: {}", config.environment);
        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Validate the configuration
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();
        let is_production = self.is_production();

        if self.server.host.trim().is_empty() {
            errors.push("Server host cannot be empty".to_string());
        }

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        if self.server.body_limit == 0 {
            errors.push("Body limit must be greater than 0".to_string());
        }

        if self.server.request_timeout_secs == 0 {
            errors.push("Request timeout must be greater than 0".to_string());
        }

        let jwt = &self.security.jwt;
        if jwt.secret.is_empty() {
            errors.push("JWT secret cannot be empty".to_string());
        } else if is_production && (jwt.secret.len() < 32 || jwt.secret == DEFAULT_SECRET_KEY) {
            errors.push("JWT secret is not secure for production use".to_string());
        }

        if jwt.expiry_minutes == 0 {
            errors.push("JWT expiry must be at least one minute".to_string());
        } else if jwt.expiry_minutes > MAX_JWT_EXPIRY_MINUTES {
            errors.push(format!(
                "JWT expiry cannot exceed {} minutes",
                MAX_JWT_EXPIRY_MINUTES
            ));
        }

        if jwt.algorithm != "HS256" {
            errors.push(format!("Unsupported JWT algorithm '{}'", jwt.algorithm));
        }

        let base_url = self.completion.base_url.trim();
        if base_url.is_empty() {
            errors.push("Completion base URL cannot be empty".to_string());
        } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            errors.push("Completion base URL must be an http(s) URL".to_string());
        } else if is_production && !base_url.starts_with("https://") {
            errors.push("Production should use a secure 'https://' completion endpoint".to_string());
        }

        if self.completion.model.trim().is_empty() {
            errors.push("Completion model cannot be empty".to_string());
        }

        if !errors.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid configuration: {}",
                errors.join(", ")
            )));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> AppResult<T> {
    match value {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!("Invalid value '{}' for {}", raw, key))
        }),
        None => Ok(default),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            completion: CompletionConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            body_limit: 1048576, // 1MB
            request_timeout_secs: 60,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET_KEY.to_string(),
            expiry_minutes: DEFAULT_JWT_EXPIRY_MINUTES,
            algorithm: "HS256".to_string(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: DEFAULT_GROQ_MODEL.to_string(),
        }
    }
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
