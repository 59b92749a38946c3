use super::assistant_repository::AssistantRepository;
use crate::domain::replies::{prompt, ChatImage};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessageContentPartImage, ChatCompletionRequestMessageContentPartText,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
        ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

const RESPONSE_SCHEMA_NAME: &str = "reply_response";

/// OpenAI chat completions implementation of the assistant repository
pub struct OpenAiAssistantRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiAssistantRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn extraction_request(
        &self,
        image: &ChatImage,
        instruction: &str,
    ) -> Result<CreateChatCompletionRequest, String> {
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(vec![
                ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                            detail: Some(ImageDetail::High),
                        },
                    },
                ),
                ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: instruction.to_string(),
                    },
                ),
            ]))
            .build()
            .map_err(|e| format!("Failed to build OpenAI request: {}", e))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![user_message.into()])
            .build()
            .map_err(|e| format!("Failed to build OpenAI request: {}", e))
    }

    fn generation_request(
        &self,
        system_instruction: &str,
        content: &str,
    ) -> Result<CreateChatCompletionRequest, String> {
        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_instruction)
            .build()
            .map_err(|e| format!("Failed to build OpenAI request: {}", e))?;
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| format!("Failed to build OpenAI request: {}", e))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![system_message.into(), user_message.into()])
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: RESPONSE_SCHEMA_NAME.to_string(),
                    schema: Some(prompt::json_schema()),
                    strict: None,
                },
            })
            .build()
            .map_err(|e| format!("Failed to build OpenAI request: {}", e))
    }

    /// Send a chat completion and return the first choice's text
    async fn complete(&self, request: CreateChatCompletionRequest) -> Result<String, String> {
        tracing::info!(model = %self.model, "Calling OpenAI chat completions");

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                "OpenAI chat completion failed"
            );
            format!("OpenAI error: {}", e)
        })?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl AssistantRepository for OpenAiAssistantRepository {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn extract_text(&self, image: &ChatImage, instruction: &str) -> Result<String, String> {
        let request = self.extraction_request(image, instruction)?;
        self.complete(request).await
    }

    async fn generate_replies(
        &self,
        system_instruction: &str,
        content: &str,
    ) -> Result<String, String> {
        let request = self.generation_request(system_instruction, content)?;
        self.complete(request).await
    }
}
