use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::ErrorKind;
use crate::extract::AuthSession;

/// Tracing target for the admin gate.
const TRACING_TARGET: &str = "mira_server::middleware::require_admin";

/// Requires a session carrying the admin sentinel scope.
///
/// Answers `403` for authenticated non-administrators; missing or invalid
/// tokens are rejected by the [`AuthSession`] extraction itself with `401`.
pub async fn require_admin(session: AuthSession, request: Request, next: Next) -> Response {
    if !session.is_admin() {
        tracing::warn!(
            target: TRACING_TARGET,
            subject_id = %session.subject_id,
            "admin route refused for non-administrator"
        );
        return ErrorKind::Forbidden
            .with_message("Administrator access required")
            .into_response();
    }

    next.run(request).await
}
