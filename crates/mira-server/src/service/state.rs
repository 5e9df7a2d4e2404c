//! Application state and dependency injection.

use std::sync::Arc;

use jiff::ToSpan as _;
use mira_auth::catalog::PermissionCatalog;
use mira_auth::credential::CredentialValidator;
use mira_auth::directory::UserDirectory;
use mira_auth::guard::AuthGuard;
use mira_auth::token::{SessionKeys, TokenCodec, TokenIssuer};

use crate::catalog::media_catalog;
use crate::service::{ConfigError, ServiceConfig};

/// Shared handle to the user directory implementation.
pub type SharedDirectory = Arc<dyn UserDirectory>;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    directory: SharedDirectory,
    catalog: Arc<PermissionCatalog>,

    credential_validator: CredentialValidator,
    token_issuer: TokenIssuer,
    auth_guard: AuthGuard,
}

impl ServiceState {
    /// Initializes application state from configuration and a directory
    /// backend.
    ///
    /// Builds the media permission catalog, derives the signing keys and
    /// wires the issuer and guard over them.
    pub fn from_config(
        config: &ServiceConfig,
        directory: SharedDirectory,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let catalog = Arc::new(media_catalog()?);
        let keys = SessionKeys::from_secret(config.token_secret.as_bytes());
        let codec = TokenCodec::new(keys);

        let token_issuer = TokenIssuer::new(codec.clone())
            .with_access_ttl(config.access_ttl_minutes.minutes())
            .with_refresh_ttl(config.refresh_ttl_minutes.minutes());
        let auth_guard = AuthGuard::new(codec, catalog.clone());

        Ok(Self {
            directory,
            catalog,
            credential_validator: CredentialValidator::new(),
            token_issuer,
            auth_guard,
        })
    }

    /// Returns the permission catalog shared by resolver and handlers.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(directory: SharedDirectory);
impl_di!(catalog: Arc<PermissionCatalog>);

impl_di!(credential_validator: CredentialValidator);
impl_di!(token_issuer: TokenIssuer);
impl_di!(auth_guard: AuthGuard);
