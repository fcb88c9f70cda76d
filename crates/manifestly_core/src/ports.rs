//! crates/manifestly_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Affirmation, EmotionScore, NewSession, ProfileUpdate, Session, User, UserCredentials};
use crate::prompts::PastSession;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Insufficient soul gems")]
    InsufficientCredits,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        name: Option<&str>,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning user, or `Unauthorized` when unknown or expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    /// Removes every auth session past its expiry and returns how many were removed.
    async fn delete_expired_auth_sessions(&self) -> PortResult<u64>;

    // --- Profile ---
    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> PortResult<User>;

    // --- Journaling Sessions ---
    async fn create_session(&self, session: NewSession) -> PortResult<Session>;

    /// All sessions of a user, newest first.
    async fn list_sessions(&self, user_id: Uuid) -> PortResult<Vec<Session>>;

    /// At most `limit` sessions of a user, newest first.
    async fn recent_sessions(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<Session>>;

    // --- Credits and Affirmations ---
    /// Atomically takes one soul gem and returns the remaining balance.
    /// Fails with `InsufficientCredits` when the balance is below one.
    async fn debit_soul_gem(&self, user_id: Uuid) -> PortResult<i32>;

    async fn save_affirmation(&self, user_id: Uuid, input: &str, ai_response: &str) -> PortResult<Affirmation>;
}

#[async_trait]
pub trait PromptGenerationService: Send + Sync {
    /// Generates a reflection prompt for the given emotional state.
    async fn generate_prompt(&self, score: EmotionScore, past: &[PastSession]) -> PortResult<String>;
}

#[async_trait]
pub trait AffirmationGenerationService: Send + Sync {
    /// Generates an affirmation for `desire`, written in `language`.
    async fn generate_affirmation(
        &self,
        desire: &str,
        language: &str,
        religion: Option<&str>,
    ) -> PortResult<String>;
}
