use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "AI Doctor API";
pub const SERVICE_VERSION: &str = "2.0.0";

/// Body of `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub message: String,
    pub version: String,
    pub status: String,
}

impl Default for ServiceDescriptor {
    fn default() -> Self {
        Self {
            message: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
            status: "production".to_string(),
        }
    }
}

/// Body of `GET /health`. `groq` reports whether the completion provider
/// was configured at startup, not whether it is currently reachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDescriptor {
    pub status: String,
    pub groq: String,
}

impl HealthDescriptor {
    pub fn new(provider_configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            groq: if provider_configured {
                "connected".to_string()
            } else {
                "not configured".to_string()
            },
        }
    }
}
