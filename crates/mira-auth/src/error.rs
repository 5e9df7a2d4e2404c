//! Authorization core error taxonomy.
//!
//! Every failure that can cross the crate boundary is one of the [`AuthError`]
//! variants below. Lower-level causes (specific token decode failures, argon2
//! errors) are logged where they occur and collapsed into the coarse variants
//! here so that callers never learn more about a credential than they should.

use std::error::Error as StdError;

use uuid::Uuid;

use crate::directory::DirectoryError;

/// Type alias for boxed errors that are `Send + Sync`.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for authorization core operations.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// Failures surfaced by credential validation, token handling and scope
/// resolution.
///
/// The first four variants are client-attributable; the remainder are
/// server-side faults and must never be presented as authorization failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately indistinguishable to
    /// the caller so usernames cannot be enumerated.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// Credentials were correct but the account is disabled.
    #[error("user account is inactive")]
    InactiveUser,

    /// Token decode, signature, expiry or claims-shape failure. The specific
    /// cause is logged internally and never leaked.
    #[error("could not validate credentials")]
    InvalidToken,

    /// Token was valid but the granted scopes do not satisfy the handler's
    /// requirements.
    #[error("not enough permissions")]
    InsufficientPermission {
        /// The bound required scopes that the caller is missing.
        missing: Vec<String>,
    },

    /// A validly-signed token references a subject the directory no longer
    /// resolves. A correctly-signed token implies the subject existed at
    /// issuance, so this is a server-side fault, not a client error.
    #[error("subject {subject_id} no longer resolves in the user directory")]
    DirectoryAnomaly { subject_id: Uuid },

    /// The user directory could not be reached or failed mid-lookup.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// A password hash could not be computed or parsed.
    #[error("password hash operation failed: {0}")]
    Hashing(String),

    /// A session token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// Returns `true` for failures attributable to the caller.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InactiveUser
                | Self::InvalidToken
                | Self::InsufficientPermission { .. }
        )
    }

    /// Returns the unmet scopes when the failure is a scope-check denial.
    #[must_use]
    pub fn missing_scopes(&self) -> &[String] {
        match self {
            Self::InsufficientPermission { missing } => missing,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        assert!(AuthError::InvalidCredentials.is_client_error());
        assert!(AuthError::InactiveUser.is_client_error());
        assert!(AuthError::InvalidToken.is_client_error());
        assert!(
            AuthError::InsufficientPermission {
                missing: vec!["gallery_create".into()]
            }
            .is_client_error()
        );

        assert!(
            !AuthError::DirectoryAnomaly {
                subject_id: Uuid::new_v4()
            }
            .is_client_error()
        );
        assert!(!AuthError::Hashing("oops".into()).is_client_error());
    }

    #[test]
    fn missing_scopes_only_set_for_denials() {
        let denied = AuthError::InsufficientPermission {
            missing: vec!["bucket_7_item_delete".into()],
        };
        assert_eq!(denied.missing_scopes(), ["bucket_7_item_delete"]);
        assert!(AuthError::InvalidToken.missing_scopes().is_empty());
    }
}
