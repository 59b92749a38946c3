// End-to-end tests for the ReplyLens Backend API
//
// Each test context starts the real router on an ephemeral port, backed by
// its own in-memory SQLite database and a scripted assistant in place of the
// AI provider, so tests run in parallel without external services.

mod helpers;
mod test_admin;
mod test_auth;
mod test_health;
