//! Request extractors for authentication and validated payloads.

mod auth_header;
mod auth_session;
mod validate_json;

pub use self::auth_header::AuthHeader;
pub use self::auth_session::AuthSession;
pub use self::validate_json::ValidateJson;

/// Tracing target for authentication extractors.
pub(crate) const TRACING_TARGET_AUTHENTICATION: &str = "mira_server::extract::auth";
