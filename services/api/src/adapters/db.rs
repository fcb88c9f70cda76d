//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use manifestly_core::domain::{
    Affirmation, EmotionScore, NewSession, ProfileUpdate, Session, User, UserCredentials,
};
use manifestly_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
    initial_soul_gems: i32,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`. New accounts start with `initial_soul_gems`.
    pub fn new(pool: PgPool, initial_soul_gems: i32) -> Self {
        Self {
            pool,
            initial_soul_gems,
        }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str =
    "id, email, name, intention, religion, time_zone, soul_gems, created_at";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    name: Option<String>,
    intention: Option<String>,
    religion: Option<String>,
    time_zone: String,
    soul_gems: i32,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            intention: self.intention,
            religion: self.religion,
            time_zone: self.time_zone,
            soul_gems: self.soul_gems,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
}

const SESSION_COLUMNS: &str = "id, user_id, emotion_score, prompt, reflection, created_at";

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    user_id: Uuid,
    emotion_score: i32,
    prompt: String,
    reflection: Option<String>,
    created_at: DateTime<Utc>,
}
impl SessionRecord {
    /// Rows outside the score domain are rejected, never skipped.
    fn to_domain(self) -> PortResult<Session> {
        let emotion_score = EmotionScore::new(i64::from(self.emotion_score)).map_err(|e| {
            warn!(session_id = %self.id, "Rejecting stored session: {}", e);
            PortError::Unexpected(format!("Session {} is malformed: {}", self.id, e))
        })?;
        Ok(Session {
            id: self.id,
            user_id: self.user_id,
            emotion_score,
            prompt: self.prompt,
            reflection: self.reflection,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct AffirmationRecord {
    id: Uuid,
    user_id: Uuid,
    input: String,
    ai_response: String,
    created_at: DateTime<Utc>,
}
impl AffirmationRecord {
    fn to_domain(self) -> Affirmation {
        Affirmation {
            id: self.id,
            user_id: self.user_id,
            input: self.input,
            ai_response: self.ai_response,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        name: Option<&str>,
    ) -> PortResult<User> {
        let query = format!(
            "INSERT INTO users (id, email, hashed_password, name, soul_gems) VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(hashed_password)
            .bind(name)
            .bind(self.initial_soul_gems)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    PortError::Conflict(format!("Email {} is already registered", email))
                }
                other => unexpected(other),
            })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("User {} not found", email)))?;

        Ok(UserCredentials {
            user_id: record.id,
            email: record.email,
            hashed_password: record.hashed_password,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_expired_auth_sessions(&self) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> PortResult<User> {
        let query = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                intention = COALESCE($3, intention), \
                religion = COALESCE($4, religion), \
                time_zone = COALESCE($5, time_zone) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(user_id)
            .bind(update.name)
            .bind(update.intention)
            .bind(update.religion)
            .bind(update.time_zone)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_session(&self, session: NewSession) -> PortResult<Session> {
        let query = format!(
            "INSERT INTO sessions (id, user_id, emotion_score, prompt, reflection) VALUES ($1, $2, $3, $4, $5) RETURNING {SESSION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SessionRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(session.user_id)
            .bind(i32::from(session.emotion_score.get()))
            .bind(session.prompt)
            .bind(session.reflection)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }

    async fn list_sessions(&self, user_id: Uuid) -> PortResult<Vec<Session>> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, SessionRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(SessionRecord::to_domain).collect()
    }

    async fn recent_sessions(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<Session>> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        );
        let records = sqlx::query_as::<_, SessionRecord>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(SessionRecord::to_domain).collect()
    }

    async fn debit_soul_gem(&self, user_id: Uuid) -> PortResult<i32> {
        let remaining: Option<i32> = sqlx::query_scalar(
            "UPDATE users SET soul_gems = soul_gems - 1 WHERE id = $1 AND soul_gems >= 1 RETURNING soul_gems",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        remaining.ok_or(PortError::InsufficientCredits)
    }

    async fn save_affirmation(
        &self,
        user_id: Uuid,
        input: &str,
        ai_response: &str,
    ) -> PortResult<Affirmation> {
        let record = sqlx::query_as::<_, AffirmationRecord>(
            "INSERT INTO affirmations (id, user_id, input, ai_response) VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, input, ai_response, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input)
        .bind(ai_response)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }
}
