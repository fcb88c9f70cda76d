#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use api_lib::web::build_router;
use api_lib::web::state::{system_clock, AppState, Clock};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use manifestly_core::domain::{
    Affirmation, EmotionScore, NewSession, ProfileUpdate, Session, User, UserCredentials,
};
use manifestly_core::ports::{
    AffirmationGenerationService, DatabaseService, PortError, PortResult, PromptGenerationService,
};
use manifestly_core::prompts::PastSession;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// In-memory database
//=========================================================================================

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, (User, String)>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    sessions: Vec<Session>,
    affirmations: Vec<Affirmation>,
}

#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
}

impl InMemoryDb {
    /// Inserts a user with a live auth session and returns the id and cookie.
    pub fn seed_user(&self, soul_gems: i32, time_zone: &str) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let user = User {
            id: user_id,
            email: format!("{}@example.com", user_id),
            name: None,
            intention: None,
            religion: None,
            time_zone: time_zone.to_string(),
            soul_gems,
            created_at: Utc::now(),
        };
        let auth_session_id = Uuid::new_v4().to_string();

        let mut tables = self.tables.lock().expect("lock");
        tables.users.insert(user_id, (user, String::new()));
        tables
            .auth_sessions
            .insert(auth_session_id.clone(), (user_id, Utc::now() + Duration::days(1)));
        (user_id, format!("session={}", auth_session_id))
    }

    pub fn expire_auth_sessions(&self) {
        let mut tables = self.tables.lock().expect("lock");
        for (_, expires_at) in tables.auth_sessions.values_mut() {
            *expires_at = Utc::now() - Duration::minutes(1);
        }
    }

    pub fn auth_session_count(&self) -> usize {
        self.tables.lock().expect("lock").auth_sessions.len()
    }

    pub fn set_religion(&self, user_id: Uuid, religion: &str) {
        let mut tables = self.tables.lock().expect("lock");
        if let Some((user, _)) = tables.users.get_mut(&user_id) {
            user.religion = Some(religion.to_string());
        }
    }

    pub fn insert_session(&self, user_id: Uuid, score: i64, reflection: &str, created_at: DateTime<Utc>) {
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            emotion_score: EmotionScore::new(score).expect("valid score"),
            prompt: "Picture yourself radiating confidence.".to_string(),
            reflection: Some(reflection.to_string()),
            created_at,
        };
        self.tables.lock().expect("lock").sessions.push(session);
    }

    pub fn soul_gems(&self, user_id: Uuid) -> i32 {
        self.tables.lock().expect("lock").users[&user_id].0.soul_gems
    }

    pub fn affirmations(&self) -> Vec<Affirmation> {
        self.tables.lock().expect("lock").affirmations.clone()
    }

    fn sessions_for(&self, user_id: Uuid) -> Vec<Session> {
        let tables = self.tables.lock().expect("lock");
        let mut sessions: Vec<Session> = tables
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        name: Option<&str>,
    ) -> PortResult<User> {
        let mut tables = self.tables.lock().expect("lock");
        if tables.users.values().any(|(u, _)| u.email == email) {
            return Err(PortError::Conflict(format!("Email {} is already registered", email)));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(str::to_string),
            intention: None,
            religion: None,
            time_zone: "UTC".to_string(),
            soul_gems: 3,
            created_at: Utc::now(),
        };
        tables
            .users
            .insert(user.id, (user.clone(), hashed_password.to_string()));
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.lock().expect("lock");
        tables
            .users
            .values()
            .find(|(u, _)| u.email == email)
            .map(|(u, hash)| UserCredentials {
                user_id: u.id,
                email: u.email.clone(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables
            .lock()
            .expect("lock")
            .auth_sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let tables = self.tables.lock().expect("lock");
        match tables.auth_sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables
            .lock()
            .expect("lock")
            .auth_sessions
            .remove(session_id);
        Ok(())
    }

    async fn delete_expired_auth_sessions(&self) -> PortResult<u64> {
        let mut tables = self.tables.lock().expect("lock");
        let before = tables.auth_sessions.len();
        let now = Utc::now();
        tables.auth_sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - tables.auth_sessions.len()) as u64)
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let tables = self.tables.lock().expect("lock");
        tables
            .users
            .get(&user_id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> PortResult<User> {
        let mut tables = self.tables.lock().expect("lock");
        let (user, _) = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        if update.name.is_some() {
            user.name = update.name;
        }
        if update.intention.is_some() {
            user.intention = update.intention;
        }
        if update.religion.is_some() {
            user.religion = update.religion;
        }
        if let Some(time_zone) = update.time_zone {
            user.time_zone = time_zone;
        }
        Ok(user.clone())
    }

    async fn create_session(&self, session: NewSession) -> PortResult<Session> {
        let stored = Session {
            id: Uuid::new_v4(),
            user_id: session.user_id,
            emotion_score: session.emotion_score,
            prompt: session.prompt,
            reflection: session.reflection,
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .expect("lock")
            .sessions
            .push(stored.clone());
        Ok(stored)
    }

    async fn list_sessions(&self, user_id: Uuid) -> PortResult<Vec<Session>> {
        Ok(self.sessions_for(user_id))
    }

    async fn recent_sessions(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<Session>> {
        let mut sessions = self.sessions_for(user_id);
        sessions.truncate(limit.max(0) as usize);
        Ok(sessions)
    }

    async fn debit_soul_gem(&self, user_id: Uuid) -> PortResult<i32> {
        let mut tables = self.tables.lock().expect("lock");
        match tables.users.get_mut(&user_id) {
            Some((user, _)) if user.soul_gems >= 1 => {
                user.soul_gems -= 1;
                Ok(user.soul_gems)
            }
            _ => Err(PortError::InsufficientCredits),
        }
    }

    async fn save_affirmation(
        &self,
        user_id: Uuid,
        input: &str,
        ai_response: &str,
    ) -> PortResult<Affirmation> {
        let affirmation = Affirmation {
            id: Uuid::new_v4(),
            user_id,
            input: input.to_string(),
            ai_response: ai_response.to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .expect("lock")
            .affirmations
            .push(affirmation.clone());
        Ok(affirmation)
    }
}

//=========================================================================================
// Scripted model adapters
//=========================================================================================

/// Returns a fixed reply, or fails when `reply` is `None`.
pub struct ScriptedPrompts {
    reply: Option<String>,
    pub calls: AtomicUsize,
    pub last_past: Mutex<Vec<PastSession>>,
}

impl ScriptedPrompts {
    pub fn replying(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(str::to_string),
            calls: AtomicUsize::new(0),
            last_past: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PromptGenerationService for ScriptedPrompts {
    async fn generate_prompt(&self, _score: EmotionScore, past: &[PastSession]) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_past.lock().expect("lock") = past.to_vec();
        self.reply
            .clone()
            .ok_or_else(|| PortError::Unexpected("model unavailable".to_string()))
    }
}

pub struct ScriptedAffirmations {
    reply: Option<String>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(String, String, Option<String>)>>,
}

impl ScriptedAffirmations {
    pub fn replying(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(str::to_string),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AffirmationGenerationService for ScriptedAffirmations {
    async fn generate_affirmation(
        &self,
        desire: &str,
        language: &str,
        religion: Option<&str>,
    ) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("lock") = Some((
            desire.to_string(),
            language.to_string(),
            religion.map(str::to_string),
        ));
        self.reply
            .clone()
            .ok_or_else(|| PortError::Unexpected("model unavailable".to_string()))
    }
}

//=========================================================================================
// Test application
//=========================================================================================

pub struct TestApp {
    pub router: axum::Router,
    pub db: Arc<InMemoryDb>,
    pub prompts: Arc<ScriptedPrompts>,
    pub affirmations: Arc<ScriptedAffirmations>,
}

impl TestApp {
    pub fn new(prompt_reply: Option<&str>, affirmation_reply: Option<&str>) -> Self {
        Self::with_clock(system_clock(), prompt_reply, affirmation_reply)
    }

    /// An app whose clock is frozen at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::with_clock(Arc::new(move || now), None, None)
    }

    fn with_clock(clock: Clock, prompt_reply: Option<&str>, affirmation_reply: Option<&str>) -> Self {
        let db = Arc::new(InMemoryDb::default());
        let prompts = Arc::new(ScriptedPrompts::replying(prompt_reply));
        let affirmations = Arc::new(ScriptedAffirmations::replying(affirmation_reply));

        let state = Arc::new(AppState {
            db: db.clone(),
            prompt_adapter: prompts.clone(),
            affirmation_adapter: affirmations.clone(),
            clock,
        });

        Self {
            router: build_router(state),
            db,
            prompts,
            affirmations,
        }
    }
}

pub struct JsonResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

pub async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse {
        status,
        set_cookie,
        body,
    }
}

pub fn request(
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    json_body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    match json_body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

/// Turns a `Set-Cookie` value into the matching `Cookie` request header.
pub fn cookie_from(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
