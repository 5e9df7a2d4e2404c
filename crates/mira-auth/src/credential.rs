//! Salted-hash credential verification using Argon2id.
//!
//! Password verification is constant-time and never a plain equality. When an
//! account does not exist, a dummy verification keeps the timing profile flat
//! so usernames cannot be enumerated through response latency.

use argon2::password_hash::Error as ArgonError;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};

use crate::directory::{DirectoryUser, UserDirectory};
use crate::{AuthError, Result};

/// Tracing target for credential verification.
const TRACING_TARGET: &str = "mira_auth::credential";

/// Verifies username/password pairs against the user directory.
///
/// Uses Argon2id with the library defaults (19 MiB memory, 2 iterations,
/// 1 lane — the OWASP recommendation).
#[derive(Debug, Clone, Default)]
pub struct CredentialValidator {
    argon2: Argon2<'static>,
}

impl CredentialValidator {
    /// Creates a validator with the recommended Argon2id configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticates a username/password pair.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] when the user is absent or the
    ///   password does not match — indistinguishable by design.
    /// - [`AuthError::InactiveUser`] when the credentials are correct but the
    ///   account is disabled.
    /// - [`AuthError::Directory`] when the directory lookup fails.
    pub async fn authenticate(
        &self,
        directory: &dyn UserDirectory,
        username: &str,
        password: &str,
    ) -> Result<DirectoryUser> {
        let Some(user) = directory.find_by_username(username).await? else {
            // Burn the same hashing work as a real verification so absent
            // accounts are not observable through timing.
            self.verify_dummy_password(password);

            tracing::warn!(
                target: TRACING_TARGET,
                "login failed: unknown username"
            );
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash)? {
            tracing::warn!(
                target: TRACING_TARGET,
                subject_id = %user.id,
                "login failed: password mismatch"
            );
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::warn!(
                target: TRACING_TARGET,
                subject_id = %user.id,
                "login rejected: account inactive"
            );
            return Err(AuthError::InactiveUser);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            subject_id = %user.id,
            "credentials verified"
        );
        Ok(user)
    }

    /// Hashes a password with a fresh cryptographically secure salt.
    ///
    /// Returns a PHC string suitable for long-term storage in the directory.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let hash = self
            .argon2
            .hash_password(password.as_bytes())
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing failed"
                );
                AuthError::Hashing(e.to_string())
            })?;

        Ok(hash.to_string())
    }

    /// Verifies a password against a stored PHC hash, timing-safe.
    ///
    /// Returns `Ok(false)` for a mismatch; a malformed stored hash is a
    /// server-side fault, not a client error.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "stored password hash is malformed"
            );
            AuthError::Hashing(e.to_string())
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(ArgonError::PasswordInvalid) => Ok(false),
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );
                Err(AuthError::Hashing(e.to_string()))
            }
        }
    }

    /// Performs a dummy verification that always fails but costs the same as
    /// a real one.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        use rand::RngExt;

        let dummy_len = rand::random_range(16..32);
        let dummy_password: String = (0..dummy_len)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();

        if let Ok(dummy_hash) = self.hash_password(&dummy_password) {
            let _ = self.verify_password(password, &dummy_hash);
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::directory::InMemoryDirectory;

    fn seeded_directory(validator: &CredentialValidator) -> (InMemoryDirectory, Uuid) {
        let directory = InMemoryDirectory::new();
        let id = Uuid::new_v4();
        directory.insert(DirectoryUser {
            id,
            username: "casey".into(),
            password_hash: validator.hash_password("mypassword").expect("hash"),
            is_active: true,
            is_admin: false,
            scopes: vec!["gallery_create".into()],
        });
        (directory, id)
    }

    #[test]
    fn hash_and_verify_round_trip() -> anyhow::Result<()> {
        let validator = CredentialValidator::new();
        let hash = validator.hash_password("mypassword")?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(validator.verify_password("mypassword", &hash)?);
        assert!(!validator.verify_password("incorrect-password", &hash)?);
        Ok(())
    }

    #[test]
    fn hashing_salts_are_unique() -> anyhow::Result<()> {
        let validator = CredentialValidator::new();
        let first = validator.hash_password("mypassword")?;
        let second = validator.hash_password("mypassword")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn malformed_stored_hash_is_a_server_fault() {
        let validator = CredentialValidator::new();
        let result = validator.verify_password("mypassword", "not-a-phc-hash");
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }

    #[tokio::test]
    async fn authenticate_active_user() -> anyhow::Result<()> {
        let validator = CredentialValidator::new();
        let (directory, id) = seeded_directory(&validator);

        let user = validator
            .authenticate(&directory, "casey", "mypassword")
            .await?;
        assert_eq!(user.id, id);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let validator = CredentialValidator::new();
        let (directory, _) = seeded_directory(&validator);

        let absent = validator
            .authenticate(&directory, "nobody", "mypassword")
            .await;
        assert!(matches!(absent, Err(AuthError::InvalidCredentials)));

        let wrong = validator
            .authenticate(&directory, "casey", "incorrect-password")
            .await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn inactive_user_is_distinguished_from_bad_credentials() {
        let validator = CredentialValidator::new();
        let (directory, id) = seeded_directory(&validator);
        directory.set_active(id, false);

        let result = validator
            .authenticate(&directory, "casey", "mypassword")
            .await;
        assert!(matches!(result, Err(AuthError::InactiveUser)));
    }

    #[test]
    fn dummy_verification_never_succeeds() {
        let validator = CredentialValidator::new();
        assert!(!validator.verify_dummy_password("mypassword"));
    }
}
