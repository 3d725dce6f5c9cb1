use app_error::{AppError, AppResult};
use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (username)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

/// Issues and checks HS256 session tokens signed with a shared secret.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Lifetimes too large to represent saturate, and `generate_token`
    /// then reports a server error.
    pub fn from_minutes(secret: &[u8], minutes: u64) -> Self {
        let lifetime = i64::try_from(minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or(Duration::MAX);
        Self::new(secret, lifetime)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn generate_token(&self, subject: &str) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.lifetime).ok_or_else(|| {
            AppError::ServerError(anyhow::anyhow!(
                "Token lifetime of {} minutes is out of range",
                self.lifetime.num_minutes()
            ))
        })?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AppError::ServerError(anyhow::anyhow!("Failed to generate token: {}", e))
        })
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                warn!("Token validation failed: {}", e);
                AppError::token_invalid()
            })?;

        debug!("Token validated for subject: {}", token_data.claims.sub);
        Ok(token_data.claims)
    }

    /// Validate a token and return only its subject.
    pub fn verify_subject(&self, token: &str) -> AppResult<String> {
        self.validate_token(token).map(|claims| claims.sub)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
