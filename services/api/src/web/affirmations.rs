//! services/api/src/web/affirmations.rs
//!
//! Affirmation generation, paid for with one soul gem per request.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use manifestly_core::{ports::PortError, prompts::DEFAULT_LANGUAGE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct AffirmationRequest {
    pub desire: Option<String>,
    pub ui_language: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AffirmationResponse {
    pub affirmation: String,
    /// Balance left after this request.
    pub soul_gems: i32,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soul_gems: Option<i32>,
}

type ErrorResponse = (StatusCode, Json<ErrorBody>);

fn failure(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
            soul_gems: None,
        }),
    )
}

fn insufficient_gems() -> ErrorResponse {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorBody {
            message: "Insufficient Soul Gems".to_string(),
            soul_gems: Some(0),
        }),
    )
}

/// Generates an affirmation for the caller's desire and debits one soul gem.
///
/// The balance is checked before the model is called and debited only after
/// an affirmation was produced.
#[utoipa::path(
    post,
    path = "/affirmations",
    request_body = AffirmationRequest,
    responses(
        (status = 200, description = "Affirmation generated", body = AffirmationResponse),
        (status = 400, description = "Missing desire", body = ErrorBody),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "No soul gems left", body = ErrorBody),
        (status = 500, description = "Generation failed", body = ErrorBody)
    )
)]
pub async fn create_affirmation_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<AffirmationRequest>,
) -> Result<Json<AffirmationResponse>, ErrorResponse> {
    let desire = req
        .desire
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Missing required fields"))?;

    let user = state.db.get_user(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => insufficient_gems(),
        other => {
            error!(%user_id, "Failed to load user: {:?}", other);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load user")
        }
    })?;
    if user.soul_gems < 1 {
        return Err(insufficient_gems());
    }

    let language = req
        .ui_language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);

    let affirmation = state
        .affirmation_adapter
        .generate_affirmation(desire, language, user.religion.as_deref())
        .await
        .map_err(|e| {
            error!(%user_id, "Affirmation generation failed: {:?}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        })?;

    let soul_gems = state.db.debit_soul_gem(user_id).await.map_err(|e| match e {
        PortError::InsufficientCredits => insufficient_gems(),
        other => {
            error!(%user_id, "Failed to debit soul gem: {:?}", other);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to debit soul gem")
        }
    })?;

    // The gem is already spent, so a failed history write still returns the text.
    if let Err(e) = state.db.save_affirmation(user_id, desire, &affirmation).await {
        error!(%user_id, "Failed to record affirmation: {:?}", e);
    }

    info!(%user_id, soul_gems, "Affirmation delivered");
    Ok(Json(AffirmationResponse {
        affirmation,
        soul_gems,
    }))
}
