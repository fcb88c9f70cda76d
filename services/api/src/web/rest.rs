//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the journaling REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{affirmations, auth, state::AppState};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use manifestly_core::{
    domain::{parse_time_zone, EmotionScore, NewSession, ProfileUpdate, Session, User},
    insights::{ChartPoint, DashboardSummary, EmotionLabel},
    ports::PortError,
    prompts::{random_guest_prompt, PastSession, FALLBACK_PROMPT},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Number of earlier sessions fetched as context for a new prompt.
const PROMPT_HISTORY: i64 = 5;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        guest_prompt_handler,
        generate_prompt_handler,
        create_session_handler,
        list_sessions_handler,
        dashboard_handler,
        get_profile_handler,
        update_profile_handler,
        affirmations::create_affirmation_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            PromptRequest,
            PromptResponse,
            CreateSessionRequest,
            SessionResponse,
            DashboardResponse,
            ChartPointResponse,
            ProfileResponse,
            UpdateProfileRequest,
            affirmations::AffirmationRequest,
            affirmations::AffirmationResponse,
            affirmations::ErrorBody,
        )
    ),
    tags(
        (name = "Manifestly API", description = "Journaling sessions, reflection prompts and affirmations.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct PromptRequest {
    pub emotion_score: i64,
}

#[derive(Serialize, ToSchema)]
pub struct PromptResponse {
    pub prompt: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub emotion_score: i64,
    pub prompt: String,
    pub reflection: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub emotion_score: u8,
    pub emotion_label: String,
    pub prompt: String,
    pub reflection: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            emotion_score: session.emotion_score.get(),
            emotion_label: EmotionLabel::from_score(session.emotion_score).to_string(),
            prompt: session.prompt,
            reflection: session.reflection,
            created_at: session.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChartPointResponse {
    pub date: String,
    pub score: u8,
}

impl From<ChartPoint> for ChartPointResponse {
    fn from(point: ChartPoint) -> Self {
        Self {
            date: point.date,
            score: point.score,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub current_streak: u32,
    pub total_sessions: usize,
    pub average_score: f64,
    pub chart: Vec<ChartPointResponse>,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            current_streak: summary.current_streak,
            total_sessions: summary.total_sessions,
            average_score: summary.average_score,
            chart: summary.chart.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub intention: Option<String>,
    pub religion: Option<String>,
    pub time_zone: String,
    pub soul_gems: i32,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            intention: user.intention,
            religion: user.religion,
            time_zone: user.time_zone,
            soul_gems: user.soul_gems,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub intention: Option<String>,
    pub religion: Option<String>,
    pub time_zone: Option<String>,
}

fn internal(context: &str, e: PortError) -> (StatusCode, String) {
    error!("{}: {:?}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
}

fn parse_score(value: i64) -> Result<EmotionScore, (StatusCode, String)> {
    EmotionScore::new(value).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Returns one of the fixed prompts offered to visitors without an account.
#[utoipa::path(
    get,
    path = "/guest/prompt",
    responses((status = 200, description = "A guest reflection prompt", body = PromptResponse))
)]
pub async fn guest_prompt_handler() -> Json<PromptResponse> {
    Json(PromptResponse {
        prompt: random_guest_prompt().to_string(),
    })
}

/// Generates a reflection prompt for the caller's current emotional state.
///
/// Recent sessions are passed to the model as context. When the model is
/// unavailable the fixed fallback prompt is returned instead of an error.
#[utoipa::path(
    post,
    path = "/prompts",
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Prompt generated", body = PromptResponse),
        (status = 400, description = "Emotion score outside 1..=10"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn generate_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<PromptRequest>,
) -> Result<Json<PromptResponse>, (StatusCode, String)> {
    let score = parse_score(req.emotion_score)?;

    let past: Vec<PastSession> = match state.db.recent_sessions(user_id, PROMPT_HISTORY).await {
        Ok(sessions) => sessions
            .into_iter()
            .map(|s| PastSession {
                emotion_score: s.emotion_score,
                reflection: s.reflection,
            })
            .collect(),
        Err(e) => {
            warn!(%user_id, "Generating prompt without history: {:?}", e);
            Vec::new()
        }
    };

    let prompt = match state.prompt_adapter.generate_prompt(score, &past).await {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!(%user_id, "Prompt generation failed, using fallback: {:?}", e);
            FALLBACK_PROMPT.to_string()
        }
    };

    Ok(Json(PromptResponse { prompt }))
}

/// Stores a completed session (score, prompt and reflection).
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session saved", body = SessionResponse),
        (status = 400, description = "Invalid score or empty prompt"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let score = parse_score(req.emotion_score)?;
    let new_session = NewSession::new(user_id, score, req.prompt, req.reflection)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let session = state
        .db
        .create_session(new_session)
        .await
        .map_err(|e| internal("Failed to save session", e))?;

    info!(%user_id, session_id = %session.id, "Session completed");
    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// Lists the caller's sessions, newest first.
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "Session history", body = [SessionResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<SessionResponse>>, (StatusCode, String)> {
    let sessions = state
        .db
        .list_sessions(user_id)
        .await
        .map_err(|e| internal("Failed to fetch sessions", e))?;

    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// Streak, totals and chart data, with calendar days cut in the caller's zone.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<DashboardResponse>, (StatusCode, String)> {
    let user = state
        .db
        .get_user(user_id)
        .await
        .map_err(|e| internal("Failed to fetch profile", e))?;
    let sessions = state
        .db
        .list_sessions(user_id)
        .await
        .map_err(|e| internal("Failed to fetch sessions", e))?;

    let summary = DashboardSummary::build(&sessions, state.now(), &user.tz());
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let user = state
        .db
        .get_user(user_id)
        .await
        .map_err(|e| internal("Failed to fetch profile", e))?;
    Ok(Json(user.into()))
}

/// Updates name, intention, religion or time zone. Omitted fields are kept.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Unknown time zone"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let time_zone = req
        .time_zone
        .as_deref()
        .map(|tz| parse_time_zone(tz).map(|tz| tz.name().to_string()))
        .transpose()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let update = ProfileUpdate {
        name: req.name,
        intention: req.intention,
        religion: req.religion,
        time_zone,
    };
    let user = state
        .db
        .update_profile(user_id, update)
        .await
        .map_err(|e| internal("Failed to update profile", e))?;
    Ok(Json(user.into()))
}
