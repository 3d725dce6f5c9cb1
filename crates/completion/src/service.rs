use app_config::CompletionConfig;
use app_error::{AppError, AppResult};
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::{CompletionClient, GroqClient};

/// Wraps an optional completion client. When the provider was not
/// configured at startup, every call fails fast without touching the network.
#[derive(Clone, Default)]
pub struct CompletionService {
    client: Option<Arc<dyn CompletionClient>>,
}

impl CompletionService {
    /// Service with no provider behind it.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn with_client(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Build from configuration. A missing or blank API key disables the
    /// service; so does a client that cannot be constructed.
    pub fn from_config(config: &CompletionConfig) -> Self {
        let Some(api_key) = config.api_key() else {
            warn!("No GROQ_API_KEY provided, AI functionality will be disabled");
            return Self::disabled();
        };

        match GroqClient::new(api_key, &config.base_url, &config.model) {
            Ok(client) => {
                info!("Groq client initialized successfully (model: {})", client.model());
                Self::with_client(Arc::new(client))
            }
            Err(e) => {
                warn!("Failed to initialize Groq client: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn complete(&self, user_message: &str) -> AppResult<String> {
        match &self.client {
            Some(client) => client.complete(user_message).await,
            None => Err(AppError::ai_not_configured()),
        }
    }
}
