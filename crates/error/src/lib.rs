pub mod middleware_handling;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ConfigError(anyhow::Error),
    ServerError(anyhow::Error),
    InputError(String),
    PayloadTooLargeError(String),
    NotFoundError(String),
    AuthenticationError(String),
    ResourceExistsError(String),
    ServiceUnavailableError(String),
    ProviderError(String),
}

impl AppError {
    // Authentication errors
    pub fn invalid_credentials() -> Self {
        Self::AuthenticationError("Incorrect credentials".to_string())
    }

    pub fn not_authenticated() -> Self {
        Self::AuthenticationError("Not authenticated".to_string())
    }

    /// Bad signature, expiry and garbage all end up here so callers
    /// cannot tell them apart.
    pub fn token_invalid() -> Self {
        Self::AuthenticationError("Could not validate credentials".to_string())
    }

    // Resource errors
    pub fn username_exists() -> Self {
        Self::ResourceExistsError("Username already exists".to_string())
    }

    pub fn resource_not_found(resource_type: &str, identifier: &str) -> Self {
        Self::NotFoundError(format!(
            "{} '{}' was not found.",
            resource_type, identifier
        ))
    }

    // Completion provider errors
    pub fn ai_not_configured() -> Self {
        Self::ServiceUnavailableError("AI service not configured".to_string())
    }

    pub fn provider(cause: impl fmt::Display) -> Self {
        Self::ProviderError(format!("AI error: {}", cause))
    }

    // Validation errors
    pub fn validation(field: &str, message: &str) -> Self {
        Self::InputError(format!("Validation failed for '{}': {}", field, message))
    }

    /// Message sent back to the client. Internal failures never leak their cause.
    pub fn detail(&self) -> String {
        match self {
            Self::ConfigError(_) => "System configuration error".to_string(),
            Self::ServerError(_) => "Internal server error".to_string(),
            Self::InputError(msg)
            | Self::PayloadTooLargeError(msg)
            | Self::NotFoundError(msg)
            | Self::AuthenticationError(msg)
            | Self::ResourceExistsError(msg)
            | Self::ServiceUnavailableError(msg)
            | Self::ProviderError(msg) => msg.clone(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ConfigError(_) | Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InputError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLargeError(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFoundError(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::ResourceExistsError(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailableError(_) | Self::ProviderError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ServerError(_) => "SERVER_ERROR",
            Self::InputError(_) => "VALIDATION_ERROR",
            Self::PayloadTooLargeError(_) => "PAYLOAD_TOO_LARGE",
            Self::NotFoundError(_) => "NOT_FOUND",
            Self::AuthenticationError(_) => "AUTH_ERROR",
            Self::ResourceExistsError(_) => "RESOURCE_EXISTS",
            Self::ServiceUnavailableError(_) => "SERVICE_UNAVAILABLE",
            Self::ProviderError(_) => "PROVIDER_ERROR",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            Self::InputError(_) => Some("Please review your input and try again."),
            Self::PayloadTooLargeError(_) => {
                Some("Please reduce the size of your request and try again.")
            }
            Self::AuthenticationError(_) => Some("Please log in to access this resource."),
            Self::ResourceExistsError(_) => Some("Please choose a different username."),
            Self::ServiceUnavailableError(_) | Self::ProviderError(_) => {
                Some("Please try again later or contact support if the issue persists.")
            }
            _ => None,
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::ServerError(error)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(e) => write!(f, "Configuration error: {}", e),
            Self::ServerError(e) => write!(f, "Server error: {}", e),
            Self::InputError(msg) => write!(f, "Input error: {}", msg),
            Self::PayloadTooLargeError(msg) => write!(f, "Payload too large: {}", msg),
            Self::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            Self::AuthenticationError(msg) => write!(f, "Authentication error: {}", msg),
            Self::ResourceExistsError(msg) => write!(f, "Resource exists: {}", msg),
            Self::ServiceUnavailableError(msg) => write!(f, "Service unavailable: {}", msg),
            Self::ProviderError(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, code: &str, detail: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            code: code.to_string(),
            detail: detail.into(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.code();
        let detail = self.detail();

        // Log the error with context
        if status.is_server_error() {
            tracing::error!(error_code = error_code, status_code = %status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(error_code = error_code, status_code = %status.as_u16(), error = %self, "Request rejected");
        }

        let mut body = ErrorResponse::new(status, error_code, detail);
        if let Some(help) = self.help() {
            body = body.with_help(help);
        }

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type AppResult<T> = Result<T, AppError>;

// Extension trait to wrap foreign errors with a specific kind
pub trait AppErrorExt<T> {
    fn config_err(self) -> AppResult<T>;
    fn server_err(self) -> AppResult<T>;
}

impl<T, E> AppErrorExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn config_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ConfigError(e.into()))
    }

    fn server_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ServerError(e.into()))
    }
}
