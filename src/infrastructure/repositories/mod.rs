pub mod assistant_repository;
pub mod gemini_assistant_repository;
pub mod openai_assistant_repository;
pub mod session_repository;
pub mod user_repository;

pub use assistant_repository::AssistantRepository;
pub use gemini_assistant_repository::GeminiAssistantRepository;
pub use openai_assistant_repository::OpenAiAssistantRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;
