use axum::{Json, extract::State};
use tracing::info;

use app_completion::CompletionService;
use app_error::AppResult;
use app_models::{ChatRequest, ChatResponse};

use crate::extractors::{CurrentUser, ValidJson};

/// Appended verbatim to every successful reply.
pub const MEDICAL_DISCLAIMER: &str = "\n\n⚠️ **MEDICAL DISCLAIMER**: This information is for educational purposes only. Always consult healthcare professionals for medical advice.";

/// `POST /chat`
pub async fn chat(
    State(completion): State<CompletionService>,
    CurrentUser(user): CurrentUser,
    ValidJson(request): ValidJson<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    info!("Chat request from {}", user.username);

    let reply = completion.complete(&request.message).await?;

    Ok(Json(ChatResponse {
        response: format!("{}{}", reply, MEDICAL_DISCLAIMER),
    }))
}
