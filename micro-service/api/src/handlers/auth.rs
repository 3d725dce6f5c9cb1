use axum::{Json, extract::State};
use std::sync::Arc;

use app_error::AppResult;
use app_models::{RegisterInput, TokenResponse, UserProfile};

use crate::{
    extractors::{CurrentUser, LoginForm, ValidJson},
    service::{AuthService, AuthServiceTrait},
};

/// `POST /auth/register`
pub async fn register(
    State(auth_service): State<Arc<AuthService>>,
    ValidJson(input): ValidJson<RegisterInput>,
) -> AppResult<Json<UserProfile>> {
    let profile = auth_service.register(input).await?;
    Ok(Json(profile))
}

/// `POST /auth/login`, form-encoded or JSON credentials
pub async fn login(
    State(auth_service): State<Arc<AuthService>>,
    LoginForm(input): LoginForm,
) -> AppResult<Json<TokenResponse>> {
    let token = auth_service.login(input).await?;
    Ok(Json(token))
}

/// `GET /auth/me`
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(UserProfile::from(user))
}
