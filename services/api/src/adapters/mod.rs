pub mod affirmation_llm;
pub mod db;
pub mod prompt_llm;

pub use affirmation_llm::OpenAiAffirmationAdapter;
pub use db::DbAdapter;
pub use prompt_llm::OpenAiPromptAdapter;
