use super::AppStep;
use crate::domain::replies::{ImageError, ReplyServiceError};
use crate::error::AppError;

pub const SUPERSEDED_MESSAGE: &str =
    "This conversation changed while the request was running. Please try again.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum FlowServiceError {
    #[error("flow not found")]
    NotFound,
    #[error("cannot {action} while in {}", .step.as_str())]
    InvalidStep { action: &'static str, step: AppStep },
    #[error("no interstitial is pending")]
    NoGate,
    #[error("gate still running: {0}s left")]
    GateActive(i64),
    #[error("flow changed while the request was running")]
    Superseded,
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Reply(#[from] ReplyServiceError),
}

impl FlowServiceError {
    /// Display string recorded on the flow
    pub fn user_message(&self) -> String {
        AppError::from(self.clone()).to_string()
    }
}

impl From<FlowServiceError> for AppError {
    fn from(err: FlowServiceError) -> Self {
        match err {
            FlowServiceError::NotFound => AppError::NotFound("Flow not found".to_string()),
            FlowServiceError::InvalidStep { action, step } => AppError::Conflict(format!(
                "Cannot {} while in step {}",
                action,
                step.as_str()
            )),
            FlowServiceError::NoGate => {
                AppError::BadRequest("No interstitial is waiting to be completed".to_string())
            }
            FlowServiceError::GateActive(secs) => AppError::GateActive(secs),
            FlowServiceError::Superseded => AppError::Conflict(SUPERSEDED_MESSAGE.to_string()),
            FlowServiceError::Image(err) => err.into(),
            FlowServiceError::Reply(err) => err.into(),
        }
    }
}
