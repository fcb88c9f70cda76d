//! crates/manifestly_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors raised while constructing domain values from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Emotion score must be between 1 and 10, got {0}")]
    InvalidEmotionScore(i64),
    #[error("Prompt text must not be empty")]
    EmptyPrompt,
    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),
}

/// A self-reported emotional state on a 1..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct EmotionScore(u8);

impl EmotionScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, DomainError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::InvalidEmotionScore(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for EmotionScore {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmotionScore> for u8 {
    fn from(score: EmotionScore) -> Self {
        score.0
    }
}

/// One completed check-in-and-reflection record.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub emotion_score: EmotionScore,
    pub prompt: String,
    pub reflection: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The fields a caller supplies when a session is completed.
/// Id and timestamp are assigned by storage.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: Uuid,
    pub emotion_score: EmotionScore,
    pub prompt: String,
    pub reflection: Option<String>,
}

impl NewSession {
    pub fn new(
        user_id: Uuid,
        emotion_score: EmotionScore,
        prompt: impl Into<String>,
        reflection: Option<String>,
    ) -> Result<Self, DomainError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        // A blank reflection is stored as absent.
        let reflection = reflection.filter(|r| !r.trim().is_empty());
        Ok(Self {
            user_id,
            emotion_score,
            prompt,
            reflection,
        })
    }
}

/// A user's profile, including the credit balance for affirmations.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub intention: Option<String>,
    pub religion: Option<String>,
    /// IANA zone name used to cut calendar days for this user.
    pub time_zone: String,
    pub soul_gems: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The zone calendar days are cut in. Unknown names fall back to UTC.
    pub fn tz(&self) -> Tz {
        parse_time_zone(&self.time_zone).unwrap_or(chrono_tz::UTC)
    }
}

pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Parses an IANA zone name such as `Europe/Berlin`.
pub fn parse_time_zone(name: &str) -> Result<Tz, DomainError> {
    let trimmed = name.trim();
    trimmed
        .parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimeZone(trimmed.to_string()))
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub intention: Option<String>,
    pub religion: Option<String>,
    pub time_zone: Option<String>,
}

/// A generated affirmation together with the desire it was written for.
#[derive(Debug, Clone)]
pub struct Affirmation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub input: String,
    pub ai_response: String,
    pub created_at: DateTime<Utc>,
}
