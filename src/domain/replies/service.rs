use super::error::ReplyServiceError;
use super::{prompt, ChatImage, ReplyResponse, UserConfig};
use crate::infrastructure::repositories::AssistantRepository;
use async_trait::async_trait;
use std::sync::Arc;

pub const NO_TEXT_EXTRACTED: &str = "No text could be extracted. Please try again.";
pub const EMPTY_TRANSCRIPT_MESSAGE: &str = "Conversation text is empty.";

/// Thin gateway over the assistant: builds prompts, forwards, decodes
pub struct ReplyService {
    assistant: Arc<dyn AssistantRepository>,
}

impl ReplyService {
    pub fn new(assistant: Arc<dyn AssistantRepository>) -> Self {
        Self { assistant }
    }
}

#[async_trait]
pub trait ReplyServiceApi: Send + Sync {
    /// Turn a chat screenshot into a speaker-attributed transcript
    async fn extract_text(&self, image: &ChatImage) -> Result<String, ReplyServiceError>;

    /// Generate reply suggestions for a transcript
    ///
    /// The result always carries exactly one safest reply; alternatives,
    /// follow-ups and risk flags are whatever the model emits.
    async fn generate_replies(
        &self,
        transcript: &str,
        config: &UserConfig,
    ) -> Result<ReplyResponse, ReplyServiceError>;
}

#[async_trait]
impl ReplyServiceApi for ReplyService {
    async fn extract_text(&self, image: &ChatImage) -> Result<String, ReplyServiceError> {
        tracing::info!(
            provider = self.assistant.name(),
            mime_type = %image.mime_type,
            payload_size = image.data.len(),
            "Extracting chat text from screenshot"
        );

        let text = self
            .assistant
            .extract_text(image, &prompt::extraction_instruction())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Text extraction failed");
                ReplyServiceError::Extraction(e)
            })?;

        let text = text.trim();
        if text.is_empty() {
            tracing::warn!("Model returned no text for screenshot");
            return Ok(NO_TEXT_EXTRACTED.to_string());
        }

        Ok(text.to_string())
    }

    async fn generate_replies(
        &self,
        transcript: &str,
        config: &UserConfig,
    ) -> Result<ReplyResponse, ReplyServiceError> {
        if transcript.trim().is_empty() {
            return Err(ReplyServiceError::Invalid(EMPTY_TRANSCRIPT_MESSAGE.to_string()));
        }
        config.validate().map_err(ReplyServiceError::Invalid)?;

        tracing::info!(
            provider = self.assistant.name(),
            goal = ?config.goal,
            tone = ?config.tone,
            language = ?config.language,
            tarof_level = ?config.effective_tarof(),
            transcript_length = transcript.len(),
            has_context = config.context().is_some(),
            "Generating replies"
        );

        let raw = self
            .assistant
            .generate_replies(
                &prompt::system_instruction(config),
                &prompt::generation_content(transcript, config),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Reply generation failed");
                ReplyServiceError::Generation(e)
            })?;

        if raw.trim().is_empty() {
            tracing::error!("Empty response from model");
            return Err(ReplyServiceError::Generation("Empty response from AI".to_string()));
        }

        let response: ReplyResponse = serde_json::from_str(raw.trim()).map_err(|e| {
            tracing::error!(error = %e, "Model response did not match the reply schema");
            ReplyServiceError::Generation(e.to_string())
        })?;

        tracing::info!(
            options = response.reply_options.len(),
            follow_ups = response.follow_ups.len(),
            has_risks = response.has_risks(),
            "Replies generated"
        );

        Ok(response)
    }
}
