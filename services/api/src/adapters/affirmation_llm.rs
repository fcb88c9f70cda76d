//! services/api/src/adapters/affirmation_llm.rs
//!
//! Adapter for the affirmation LLM.
//! It implements the `AffirmationGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use manifestly_core::{
    ports::{AffirmationGenerationService, PortError, PortResult},
    prompts::{affirmation_system_prompt, affirmation_user_prompt, FALLBACK_AFFIRMATION},
};

/// An adapter that implements `AffirmationGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAffirmationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAffirmationAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl AffirmationGenerationService for OpenAiAffirmationAdapter {
    async fn generate_affirmation(
        &self,
        desire: &str,
        language: &str,
        religion: Option<&str>,
    ) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(affirmation_system_prompt(language, religion))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(affirmation_user_prompt(desire, language))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(350u32)
            .temperature(0.9)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // An empty completion still yields an affirmation.
        let affirmation = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| FALLBACK_AFFIRMATION.to_string());

        Ok(affirmation)
    }
}
