//! Scope string parsing and the authorization decision algorithm.
//!
//! Granted and required scopes arrive as raw strings (comma-joined in the
//! user directory, embedded in access-token claims, declared by handlers).
//! This module parses them into small tagged variants instead of doing ad hoc
//! string surgery, then resolves whether a caller's grants satisfy a
//! handler's requirements.

mod resolver;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

pub use self::resolver::{Decision, ScopeResolver};
use crate::catalog::{ADMIN_SCOPE, PLACEHOLDER, PermissionCatalog};

/// Ordered privilege levels for resource-bound grants.
///
/// Holding a higher level implies holding every lower level for the same
/// resource: a grant of `"7:admin"` satisfies `"7:edit"` and `"7:view"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PrivilegeLevel {
    /// Can view items but cannot edit or delete them.
    View,
    /// Can view, create and edit items but cannot delete them.
    Edit,
    /// Can view, edit and delete items.
    Admin,
}

impl PrivilegeLevel {
    /// Returns this level plus every lower level, in ascending order.
    pub fn implied(self) -> impl Iterator<Item = Self> {
        Self::iter().filter(move |level| *level <= self)
    }
}

/// A granted scope string, parsed into its structural variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantedScope {
    /// The `"is_admin"` sentinel; short-circuits every decision.
    Admin,
    /// A grant pre-bound to a concrete resource, `"{id}:{level}"` shape.
    BoundResource {
        resource_id: i64,
        level: PrivilegeLevel,
    },
    /// A permission-group name found in the catalog.
    Group(String),
    /// A raw dynamic permission name still containing the placeholder.
    Dynamic(String),
    /// A literal permission name, or any unrecognized string.
    ///
    /// Unknown strings deliberately pass through unchanged: they never crash
    /// resolution, they simply fail to match anything.
    Literal(String),
}

impl GrantedScope {
    /// Parses a raw granted scope string against the catalog.
    #[must_use]
    pub fn parse(raw: &str, catalog: &PermissionCatalog) -> Self {
        if raw == ADMIN_SCOPE {
            return Self::Admin;
        }
        if let Some(bound) = Self::parse_bound(raw) {
            return bound;
        }
        if catalog.group(raw).is_some() {
            return Self::Group(raw.to_owned());
        }
        if raw.contains(PLACEHOLDER) {
            return Self::Dynamic(raw.to_owned());
        }
        Self::Literal(raw.to_owned())
    }

    /// Parses the `"{id}:{level}"` shape, e.g. `"7:edit"`.
    fn parse_bound(raw: &str) -> Option<Self> {
        let (resource_id, level) = raw.split_once(':')?;
        let resource_id = resource_id.parse().ok()?;
        let level = level.parse().ok()?;
        Some(Self::BoundResource { resource_id, level })
    }
}

/// A required scope declared by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredScope {
    /// A fixed permission name.
    Literal(String),
    /// A template containing the resource-id placeholder.
    Dynamic(String),
}

impl RequiredScope {
    /// Parses a raw required scope string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.contains(PLACEHOLDER) {
            Self::Dynamic(raw.to_owned())
        } else {
            Self::Literal(raw.to_owned())
        }
    }

    /// Binds the scope to the request's resource id.
    ///
    /// Returns `None` for a dynamic requirement with no resource id: such a
    /// requirement can never be satisfied and must deny, never "match any".
    #[must_use]
    pub fn bind(&self, resource_id: Option<i64>) -> Option<String> {
        match self {
            Self::Literal(name) => Some(name.clone()),
            Self::Dynamic(template) => {
                resource_id.map(|id| template.replace(PLACEHOLDER, &id.to_string()))
            }
        }
    }

    /// Returns the raw scope string as declared.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Literal(name) | Self::Dynamic(name) => name,
        }
    }
}
