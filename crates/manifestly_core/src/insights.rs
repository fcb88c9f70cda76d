//! crates/manifestly_core/src/insights.rs
//!
//! Dashboard statistics derived from a user's session history.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::domain::{EmotionScore, Session};
use crate::streak::streak_for_sessions;

/// Number of sessions plotted on the emotional-journey chart.
pub const CHART_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmotionLabel {
    VeryLow,
    Low,
    Moderate,
    Good,
    Excellent,
}

impl EmotionLabel {
    pub fn from_score(score: EmotionScore) -> Self {
        match score.get() {
            0..=2 => Self::VeryLow,
            3..=4 => Self::Low,
            5..=6 => Self::Moderate,
            7..=8 => Self::Good,
            _ => Self::Excellent,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        };
        f.write_str(label)
    }
}

/// Mean emotion score, or 0.0 when there are no sessions.
pub fn average_score(sessions: &[Session]) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    let total: u32 = sessions
        .iter()
        .map(|s| u32::from(s.emotion_score.get()))
        .sum();
    f64::from(total) / sessions.len() as f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Short day label such as "Mar 14", rendered in the user's zone.
    pub date: String,
    pub score: u8,
}

/// Takes sessions ordered newest first and returns the most recent
/// `CHART_WINDOW` of them, oldest first, ready for plotting.
pub fn chart_points<Tz>(sessions: &[Session], tz: &Tz) -> Vec<ChartPoint>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    sessions
        .iter()
        .take(CHART_WINDOW)
        .rev()
        .map(|s| ChartPoint {
            date: s.created_at.with_timezone(tz).format("%b %-d").to_string(),
            score: s.emotion_score.get(),
        })
        .collect()
}

/// Everything the dashboard shows above the session list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub current_streak: u32,
    pub total_sessions: usize,
    /// Rounded to one decimal place.
    pub average_score: f64,
    pub chart: Vec<ChartPoint>,
}

impl DashboardSummary {
    pub fn build<Tz>(sessions: &[Session], now: DateTime<Utc>, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            current_streak: streak_for_sessions(sessions, now, tz),
            total_sessions: sessions.len(),
            average_score: (average_score(sessions) * 10.0).round() / 10.0,
            chart: chart_points(sessions, tz),
        }
    }
}
