use super::image::ImageError;
use crate::error::AppError;

pub const EXTRACTION_FAILED_MESSAGE: &str =
    "Could not read the image. Make sure the screenshot is clear.";
pub const GENERATION_FAILED_MESSAGE: &str = "Reply generation failed. Please try again.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReplyServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("generation failed: {0}")]
    Generation(String),
}

impl ReplyServiceError {
    /// The message shown to the user; provider details stay in the logs
    pub fn user_message(&self) -> String {
        match self {
            ReplyServiceError::Invalid(msg) => msg.clone(),
            ReplyServiceError::Extraction(_) => EXTRACTION_FAILED_MESSAGE.to_string(),
            ReplyServiceError::Generation(_) => GENERATION_FAILED_MESSAGE.to_string(),
        }
    }
}

impl From<ReplyServiceError> for AppError {
    fn from(err: ReplyServiceError) -> Self {
        let message = err.user_message();
        match err {
            ReplyServiceError::Invalid(_) => AppError::BadRequest(message),
            ReplyServiceError::Extraction(_) | ReplyServiceError::Generation(_) => {
                AppError::ExternalService(message)
            }
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::TooLarge(_) => AppError::PayloadTooLarge(err.to_string()),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
