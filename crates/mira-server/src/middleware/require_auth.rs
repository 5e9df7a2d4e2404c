use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::AuthSession;

/// Requires a valid access token to proceed with the request.
///
/// The verified session is cached in the request extensions, so downstream
/// [`AuthSession`] extractions are free.
///
/// #### Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use axum::Router;
/// use axum::middleware::from_fn_with_state;
/// use axum::routing::get;
/// use mira_auth::directory::InMemoryDirectory;
/// use mira_server::middleware::require_authentication;
/// use mira_server::service::{ServiceConfig, ServiceState};
///
/// # fn main() -> Result<(), mira_server::service::ConfigError> {
/// let config = ServiceConfig::new("0123456789abcdef0123456789abcdef");
/// let state = ServiceState::from_config(&config, Arc::new(InMemoryDirectory::new()))?;
/// let app: Router = Router::new()
///     .route("/galleries", get(|| async { "[]" }))
///     .layer(from_fn_with_state(state.clone(), require_authentication))
///     .with_state(state);
/// # Ok(())
/// # }
/// ```
pub async fn require_authentication(
    AuthSession(_): AuthSession,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
