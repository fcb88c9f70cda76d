//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use chrono::{DateTime, Utc};
use manifestly_core::ports::{
    AffirmationGenerationService, DatabaseService, PromptGenerationService,
};
use std::sync::Arc;

/// Source of "now" for calendar-day calculations.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub prompt_adapter: Arc<dyn PromptGenerationService>,
    pub affirmation_adapter: Arc<dyn AffirmationGenerationService>,
    pub clock: Clock,
}

impl AppState {
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
