//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;

use axum::Router;

use crate::service::ServiceState;

/// Returns a [`Router`] with every route the server exposes.
pub fn routes() -> Router<ServiceState> {
    Router::new().merge(authentication::routes())
}
