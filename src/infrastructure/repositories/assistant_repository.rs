use crate::domain::replies::ChatImage;
use async_trait::async_trait;

/// Repository for the generative model behind extraction and generation.
/// Abstracts the underlying provider (Gemini, OpenAI, ...)
///
/// Implementations only move data: prompts are built by the caller and the
/// model output is returned as-is, without local validation or retries.
#[async_trait]
pub trait AssistantRepository: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Send a screenshot plus instruction to a vision model, returning its text
    async fn extract_text(&self, image: &ChatImage, instruction: &str) -> Result<String, String>;

    /// Ask a text model for a reply set constrained to the response schema,
    /// returning the raw JSON text
    async fn generate_replies(
        &self,
        system_instruction: &str,
        content: &str,
    ) -> Result<String, String>;
}
