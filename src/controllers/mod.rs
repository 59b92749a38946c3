pub mod admin;
pub mod auth;
pub mod flow;
pub mod health;
