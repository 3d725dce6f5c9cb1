use axum::{
    Form, Json,
    extract::{
        FromRef, FromRequest, FromRequestParts, Multipart, Request,
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, JsonRejection},
    },
    http::{StatusCode, header, request::Parts},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use app_error::AppError;
use app_middleware::bearer_token;
use app_models::{LoginInput, UserRecord};

use crate::service::{AuthService, AuthServiceTrait};

/// The user owning the bearer token on the request.
///
/// Rejects with 401 when the header is missing, the token does not
/// verify, or its subject is no longer in the store.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(AppError::not_authenticated)?;
        let auth_service = Arc::<AuthService>::from_ref(state);

        let user = auth_service.authenticate(token).await?;
        Ok(Self(user))
    }
}

/// Login credentials, accepted as an OAuth2 password form (urlencoded or
/// multipart) or as JSON.
#[derive(Debug, Clone)]
pub struct LoginForm(pub LoginInput);

impl LoginForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<LoginInput, AppError> {
        let mut username = None;
        let mut password = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("username") => username = Some(field.text().await.map_err(multipart_error)?),
                Some("password") => password = Some(field.text().await.map_err(multipart_error)?),
                // grant_type, scope, client_id and friends
                _ => {}
            }
        }

        Ok(LoginInput {
            username: username.ok_or_else(|| AppError::validation("username", "field required"))?,
            password: password.ok_or_else(|| AppError::validation("password", "field required"))?,
        })
    }
}

impl<S> FromRequest<S> for LoginForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let input = if content_type.starts_with("application/json") {
            Json::<LoginInput>::from_request(req, state)
                .await
                .map_err(json_rejection)?
                .0
        } else if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(multipart_rejection)?;
            Self::from_multipart(multipart).await?
        } else {
            Form::<LoginInput>::from_request(req, state)
                .await
                .map_err(form_rejection)?
                .0
        };

        Ok(Self(input))
    }
}

/// `Json<T>` whose rejections use the application error shape.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    debug!("Rejected JSON body: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLargeError(
            "The request body exceeds the maximum allowed size".to_string(),
        );
    }
    AppError::InputError(rejection.body_text())
}

fn form_rejection(rejection: FormRejection) -> AppError {
    debug!("Rejected form body: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLargeError(
            "The request body exceeds the maximum allowed size".to_string(),
        );
    }
    AppError::InputError(rejection.body_text())
}

fn multipart_rejection(rejection: MultipartRejection) -> AppError {
    debug!("Rejected multipart body: {}", rejection.body_text());
    AppError::InputError(rejection.body_text())
}

fn multipart_error(error: MultipartError) -> AppError {
    debug!("Failed to read multipart field: {}", error.body_text());
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLargeError(
            "The request body exceeds the maximum allowed size".to_string(),
        );
    }
    AppError::InputError(error.body_text())
}
