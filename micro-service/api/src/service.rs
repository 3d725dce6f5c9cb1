use app_database::{InMemoryUserStore, UserStore};
use app_error::{AppError, AppResult};
use app_middleware::{JwtService, security::password, validation};
use app_models::{LoginInput, RegisterInput, TokenResponse, UserProfile, UserRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Trait defining the authentication service interface
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    /// Register a new user
    async fn register(&self, input: RegisterInput) -> AppResult<UserProfile>;

    /// Check credentials and issue a session token
    async fn login(&self, input: LoginInput) -> AppResult<TokenResponse>;

    /// Resolve a bearer token to the user it was issued for
    async fn authenticate(&self, token: &str) -> AppResult<UserRecord>;

    /// Look a user up by username
    async fn find_user(&self, username: &str) -> Option<UserRecord>;

    /// Get the JWT service
    fn get_jwt_service(&self) -> Arc<JwtService>;
}

/// Implementation of the authentication service
pub struct AuthService {
    jwt_service: Arc<JwtService>,
    user_store: Arc<dyn UserStore>,
}

impl AuthService {
    /// Create a new authentication service with the given JWT secret and an
    /// empty in-memory user store
    pub fn new(jwt_secret: &[u8], expiry_minutes: u64) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::from_minutes(jwt_secret, expiry_minutes)),
            user_store: Arc::new(InMemoryUserStore::new()),
        }
    }

    /// Replace the user store
    pub fn with_store(mut self, user_store: Arc<dyn UserStore>) -> Self {
        self.user_store = user_store;
        self
    }

    fn validate_registration(input: &RegisterInput) -> AppResult<()> {
        validation::validate_username(&input.username)?;
        validation::validate_email(&input.email)?;
        validation::validate_password(&input.password)?;
        Ok(())
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    fn get_jwt_service(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt_service)
    }

    async fn register(&self, input: RegisterInput) -> AppResult<UserProfile> {
        Self::validate_registration(&input)?;

        // Cheap early exit; the store re-checks atomically on insert
        if self.user_store.get_record(&input.username).await.is_some() {
            return Err(AppError::username_exists());
        }

        let password_hash = password::hash_password(&input.password)?;
        let record = UserRecord::new(input.username, input.email, input.full_name, password_hash);

        let stored = self.user_store.create_record(record).await?;
        info!("Registered user {}", stored.username);

        Ok(UserProfile::from(stored))
    }

    async fn login(&self, input: LoginInput) -> AppResult<TokenResponse> {
        let Some(user) = self.user_store.get_record(&input.username).await else {
            warn!("Login attempt for unknown user {}", input.username);
            return Err(AppError::invalid_credentials());
        };

        if !password::verify_password(&input.password, &user.password_hash) {
            warn!("Login attempt with wrong password for {}", user.username);
            return Err(AppError::invalid_credentials());
        }

        let token = self.jwt_service.generate_token(&user.username)?;
        info!("Issued session token for {}", user.username);

        Ok(TokenResponse::bearer(token))
    }

    async fn authenticate(&self, token: &str) -> AppResult<UserRecord> {
        let subject = self.jwt_service.verify_subject(token)?;

        self.user_store.get_record(&subject).await.ok_or_else(|| {
            warn!("Token subject {} does not match any user", subject);
            AppError::token_invalid()
        })
    }

    async fn find_user(&self, username: &str) -> Option<UserRecord> {
        self.user_store.get_record(username).await
    }
}
