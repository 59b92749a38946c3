pub mod error;
pub mod image;
pub mod model;
pub mod prompt;
pub mod service;

pub use error::ReplyServiceError;
pub use image::{ChatImage, ImageError};
pub use model::{GeneratedReply, Goal, Language, ReplyLength, ReplyResponse, Tone, UserConfig};
pub use service::{ReplyService, ReplyServiceApi};
