//! The user directory seam.
//!
//! The authorization core never talks to storage directly. Login and refresh
//! resolve identities through the [`UserDirectory`] trait; the relational
//! backend implements it elsewhere. [`InMemoryDirectory`] is a complete
//! implementation for tests and embedded setups.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::BoxedError;
use crate::catalog::ADMIN_SCOPE;

/// An identity record as stored in the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Stable subject id embedded in issued tokens.
    pub id: Uuid,
    /// Login name; unique within the directory.
    pub username: String,
    /// PHC-format salted password hash.
    pub password_hash: String,
    /// Disabled accounts authenticate but may not log in.
    pub is_active: bool,
    /// Administrator flag; materialized as the `is_admin` scope at issuance.
    pub is_admin: bool,
    /// Raw granted scope strings (comma-joined in the backing store).
    pub scopes: Vec<String>,
}

impl DirectoryUser {
    /// Returns the scopes to embed in an access token, with the admin
    /// sentinel appended when the flag is set.
    #[must_use]
    pub fn granted_scopes(&self) -> Vec<String> {
        let mut scopes = self.scopes.clone();
        if self.is_admin && !scopes.iter().any(|scope| scope == ADMIN_SCOPE) {
            scopes.push(ADMIN_SCOPE.to_owned());
        }
        scopes
    }
}

/// A directory lookup failure (connectivity, timeout, backend fault).
///
/// Directory failures are server-side by definition and must never be
/// conflated with an authorization failure.
#[derive(Debug, thiserror::Error)]
#[error("user directory lookup failed: {message}")]
pub struct DirectoryError {
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl DirectoryError {
    /// Creates a new directory error.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Identity lookup used during login and refresh.
///
/// Implementations may block or suspend; the core awaits them before minting
/// tokens and holds no state across calls.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves a user by login name.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError>;

    /// Resolves a user by subject id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DirectoryUser>, DirectoryError>;
}

/// A thread-safe in-memory [`UserDirectory`].
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, DirectoryUser>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user record.
    pub fn insert(&self, user: DirectoryUser) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id, user);
    }

    /// Replaces a user's stored scopes; returns `false` for unknown ids.
    pub fn set_scopes(&self, id: Uuid, scopes: Vec<String>) -> bool {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        match users.get_mut(&id) {
            Some(user) => {
                user.scopes = scopes;
                true
            }
            None => false,
        }
    }

    /// Toggles a user's active flag; returns `false` for unknown ids.
    pub fn set_active(&self, id: Uuid, is_active: bool) -> bool {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        match users.get_mut(&id) {
            Some(user) => {
                user.is_active = is_active;
                true
            }
            None => false,
        }
    }

    /// Removes a user record; returns `false` for unknown ids.
    pub fn remove(&self, id: Uuid) -> bool {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.values().find(|user| user.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DirectoryUser>, DirectoryError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> DirectoryUser {
        DirectoryUser {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            password_hash: String::new(),
            is_active: true,
            is_admin: false,
            scopes: vec!["gallery_create".into()],
        }
    }

    #[test]
    fn admin_flag_appends_sentinel_once() {
        let mut admin = user("root");
        admin.is_admin = true;
        assert_eq!(admin.granted_scopes(), ["gallery_create", "is_admin"]);

        admin.scopes.push("is_admin".into());
        assert_eq!(admin.granted_scopes(), ["gallery_create", "is_admin"]);
    }

    #[test]
    fn regular_user_keeps_stored_scopes() {
        let plain = user("casey");
        assert_eq!(plain.granted_scopes(), ["gallery_create"]);
    }

    #[tokio::test]
    async fn lookup_by_username_and_id() -> anyhow::Result<()> {
        let directory = InMemoryDirectory::new();
        let record = user("casey");
        directory.insert(record.clone());

        let by_name = directory.find_by_username("casey").await?;
        assert_eq!(by_name.as_ref(), Some(&record));

        let by_id = directory.find_by_id(record.id).await?;
        assert_eq!(by_id.as_ref(), Some(&record));

        assert!(directory.find_by_username("nobody").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn mutations_are_visible_to_lookups() -> anyhow::Result<()> {
        let directory = InMemoryDirectory::new();
        let record = user("casey");
        let id = record.id;
        directory.insert(record);

        assert!(directory.set_scopes(id, vec!["7:view".into()]));
        assert!(directory.set_active(id, false));

        let updated = directory.find_by_id(id).await?.expect("present");
        assert_eq!(updated.scopes, ["7:view"]);
        assert!(!updated.is_active);

        assert!(directory.remove(id));
        assert!(!directory.remove(id));
        assert!(directory.find_by_id(id).await?.is_none());
        Ok(())
    }
}
