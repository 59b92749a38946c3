pub mod dto;
pub mod events;
pub mod jwt;
pub mod password;
pub mod service;

pub use dto::{AuthResponse, CredentialsRequest};
pub use events::{SessionEvent, SessionEvents};
pub use jwt::{Claims, JwtManager};
pub use service::AuthService;
