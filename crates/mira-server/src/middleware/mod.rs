//! Route layers for blanket authentication and admin gating.

mod require_admin;
mod require_auth;

pub use self::require_admin::require_admin;
pub use self::require_auth::require_authentication;
