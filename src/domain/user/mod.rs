pub mod dto;
pub mod model;

pub use dto::{AdminStats, UpdateUserRequest, UserListQuery, UserSummary};
pub use model::{is_valid_email, normalize_email, SessionRecord, User, UserSession};
