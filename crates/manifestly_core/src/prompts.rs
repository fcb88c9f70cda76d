//! crates/manifestly_core/src/prompts.rs
//!
//! Instructions sent to the language model, plus the fixed prompts used when
//! no model is involved (guest mode) or when the model call fails.

use rand::seq::SliceRandom;

use crate::domain::EmotionScore;

/// Shown whenever reflection-prompt generation fails or comes back empty.
pub const FALLBACK_PROMPT: &str =
    "Visualize your calmest self today. What would they do differently?";

/// Used when the model returns no affirmation text.
pub const FALLBACK_AFFIRMATION: &str =
    "I am worthy of my desires. They flow to me naturally. I embrace my divine potential.";

pub const DEFAULT_LANGUAGE: &str = "English";

/// Prompts offered to visitors who try a session without an account.
pub const GUEST_PROMPTS: [&str; 5] = [
    FALLBACK_PROMPT,
    "Imagine you're watching your ideal day unfold. What do you notice first?",
    "What would change if you believed everything was working in your favor?",
    "Picture yourself radiating confidence. How does your body feel?",
    "If fear couldn't hold you back, what's the first step you'd take?",
];

/// Maximum number of past sessions quoted back to the model.
pub const PAST_CONTEXT_LIMIT: usize = 3;
/// Past reflections are cut to this many characters.
pub const PAST_REFLECTION_CHARS: usize = 100;

pub fn random_guest_prompt() -> &'static str {
    GUEST_PROMPTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_PROMPT)
}

/// Coarse emotional context derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionBand {
    Struggling,
    Neutral,
    Energized,
}

impl EmotionBand {
    pub fn from_score(score: EmotionScore) -> Self {
        match score.get() {
            0..=4 => Self::Struggling,
            5..=7 => Self::Neutral,
            _ => Self::Energized,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Struggling => "feeling low or struggling",
            Self::Neutral => "feeling moderate or neutral",
            Self::Energized => "feeling positive and energized",
        }
    }
}

/// The slice of a previous session that is quoted back to the model.
#[derive(Debug, Clone)]
pub struct PastSession {
    pub emotion_score: EmotionScore,
    pub reflection: Option<String>,
}

fn past_context(past: &[PastSession]) -> String {
    if past.is_empty() {
        return String::new();
    }
    let entries: Vec<String> = past
        .iter()
        .take(PAST_CONTEXT_LIMIT)
        .map(|s| {
            let reflection: String = s
                .reflection
                .as_deref()
                .unwrap_or_default()
                .chars()
                .take(PAST_REFLECTION_CHARS)
                .collect();
            format!(
                "Emotion: {}/10, Reflection: \"{}\"",
                s.emotion_score.get(),
                reflection
            )
        })
        .collect();
    format!("\n\nRecent patterns: {}", entries.join("; "))
}

/// System instructions for generating a reflection prompt.
pub fn reflection_system_prompt(score: EmotionScore, past: &[PastSession]) -> String {
    format!(
        "You are a supportive guide for Manifestly, a neuroscience-based manifestation app.
Generate a short, powerful reflection prompt (1-2 sentences) that helps users rewire their mind.
The user is currently {}.{}

Create a prompt that:
- Is compassionate and empowering
- Bridges science and spirituality
- Encourages visualization or reframing
- Feels personal and actionable",
        EmotionBand::from_score(score).describe(),
        past_context(past)
    )
}

pub fn reflection_user_prompt(score: EmotionScore) -> String {
    format!(
        "Generate a reflection prompt for someone feeling {}/10.",
        score.get()
    )
}

/// System instructions for generating an affirmation in `language`.
pub fn affirmation_system_prompt(language: &str, religion: Option<&str>) -> String {
    let mut prompt = format!(
        "You are a master manifestation coach creating personalized affirmations that feel electric with possibility.

INSTRUCTIONS:
1. Use their EXACT desire/language and elevate it
2. Write 4-5 powerful sentences in present tense
3. Make it visceral - they should FEEL it in their body
4. Include specific sensory details about what manifesting this feels like
5. Build from \"I am\" → \"I feel\" → \"I receive\" → \"I celebrate\"
6. Make it so potent they'll want to screenshot and share it
7. End with something that creates certainty and excitement

Use cinematic, emotionally charged language. Make them feel like their manifestation is not just possible but INEVITABLE. Write completely in {language}."
    );

    if let Some(religion) = religion.map(str::trim).filter(|r| !r.is_empty()) {
        prompt.push_str(&format!(
            "\n\nSPIRITUAL CONTEXT: The person follows {religion}. If it feels natural, incorporate relevant spiritual concepts from their tradition."
        ));
    }
    prompt
}

pub fn affirmation_user_prompt(desire: &str, language: &str) -> String {
    format!("Their desire: \"{desire}\". Create an affirmation in {language}.")
}
