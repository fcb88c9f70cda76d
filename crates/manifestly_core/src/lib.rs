pub mod domain;
pub mod insights;
pub mod ports;
pub mod prompts;
pub mod streak;

pub use domain::{parse_time_zone, Affirmation, AuthSession, DomainError, EmotionScore, NewSession, ProfileUpdate, Session, User, UserCredentials};
pub use insights::{DashboardSummary, EmotionLabel};
pub use ports::{AffirmationGenerationService, DatabaseService, PortError, PortResult, PromptGenerationService};
pub use streak::{current_streak, streak_for_sessions, Timestamped};
