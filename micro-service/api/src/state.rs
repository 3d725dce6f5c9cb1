use app_completion::CompletionService;
use app_config::AppConfig;
use axum::extract::FromRef;
use std::sync::Arc;

use crate::service::AuthService;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub completion: CompletionService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        completion: CompletionService,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            auth_service,
            completion,
            config,
        }
    }

    /// Wire up services from configuration: an empty user store, a token
    /// service keyed on the configured secret and, if an API key is
    /// present, a completion client.
    pub fn from_config(config: AppConfig) -> Self {
        let jwt = &config.security.jwt;
        let auth_service = Arc::new(AuthService::new(jwt.secret.as_bytes(), jwt.expiry_minutes));
        let completion = CompletionService::from_config(&config.completion);

        Self::new(auth_service, completion, Arc::new(config))
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth_service)
    }
}

impl FromRef<AppState> for CompletionService {
    fn from_ref(state: &AppState) -> Self {
        state.completion.clone()
    }
}
