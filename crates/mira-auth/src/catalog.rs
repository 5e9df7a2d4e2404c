//! Immutable permission catalog.
//!
//! The catalog is the process-wide table of permission definitions and
//! permission groups. It is built once at startup, validated at construction
//! and never mutated afterwards, so it can be shared freely across request
//! tasks without synchronization.

use std::collections::HashMap;

/// Placeholder substring marking a permission as dynamic.
///
/// A dynamic permission is inert until the placeholder is bound to a concrete
/// resource id (e.g. `bucket_{resource_id}_item_read` with resource 7 becomes
/// `bucket_7_item_read`).
pub const PLACEHOLDER: &str = "{resource_id}";

/// Sentinel granted scope that short-circuits every authorization decision.
pub const ADMIN_SCOPE: &str = "is_admin";

/// A single permission definition.
///
/// The name may contain [`PLACEHOLDER`] at most once; the catalog constructor
/// rejects names with multiple occurrences as an authoring error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    name: String,
    description: String,
}

impl Permission {
    /// Creates a new permission definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Returns the permission name (possibly containing the placeholder).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns `true` if the name contains the resource-id placeholder.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.name.contains(PLACEHOLDER)
    }

    /// Substitutes the placeholder with a concrete resource id.
    ///
    /// Static permission names are returned unchanged, which also makes the
    /// operation idempotent: a bound name contains no placeholder, so binding
    /// it again is a no-op.
    #[must_use]
    pub fn bind(&self, resource_id: i64) -> String {
        self.name.replace(PLACEHOLDER, &resource_id.to_string())
    }
}

/// A named bundle of permissions, itself addressable as a granted scope.
///
/// Groups are never nested. Group grants are resource-agnostic at storage
/// time; dynamic members are bound to the request's resource id at use time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGroup {
    name: String,
    label: String,
    permissions: Vec<Permission>,
}

impl PermissionGroup {
    /// Creates a new permission group.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        permissions: Vec<Permission>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            permissions,
        }
    }

    /// Returns the group name used as a granted scope string.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the member permissions in declaration order.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}

/// Catalog-authoring failures, reported at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A dynamic permission name contains the placeholder more than once.
    #[error("permission `{name}` contains the resource-id placeholder more than once")]
    MultiplePlaceholders { name: String },

    /// Two permissions share the same name.
    #[error("duplicate permission name `{name}`")]
    DuplicatePermission { name: String },

    /// Two groups share the same name.
    #[error("duplicate permission group name `{name}`")]
    DuplicateGroup { name: String },

    /// A group name would shadow the admin sentinel or a permission name.
    #[error("scope name `{name}` is reserved or already taken by a permission")]
    NameCollision { name: String },
}

/// Immutable, process-wide table of permissions and permission groups.
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    permissions: Vec<Permission>,
    groups: Vec<PermissionGroup>,
    permission_index: HashMap<String, usize>,
    group_index: HashMap<String, usize>,
}

impl PermissionCatalog {
    /// Builds and validates a catalog from permission and group definitions.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] when a name contains the placeholder more
    /// than once, when names collide, or when a name shadows the
    /// [`ADMIN_SCOPE`] sentinel.
    pub fn new(
        permissions: Vec<Permission>,
        groups: Vec<PermissionGroup>,
    ) -> Result<Self, CatalogError> {
        let mut permission_index = HashMap::with_capacity(permissions.len());
        for (position, permission) in permissions.iter().enumerate() {
            Self::validate_name(permission.name())?;
            if permission_index
                .insert(permission.name().to_owned(), position)
                .is_some()
            {
                return Err(CatalogError::DuplicatePermission {
                    name: permission.name().to_owned(),
                });
            }
        }

        let mut group_index = HashMap::with_capacity(groups.len());
        for (position, group) in groups.iter().enumerate() {
            if group.name() == ADMIN_SCOPE || permission_index.contains_key(group.name()) {
                return Err(CatalogError::NameCollision {
                    name: group.name().to_owned(),
                });
            }
            if group_index.insert(group.name().to_owned(), position).is_some() {
                return Err(CatalogError::DuplicateGroup {
                    name: group.name().to_owned(),
                });
            }
            for member in group.permissions() {
                Self::validate_name(member.name())?;
            }
        }

        Ok(Self {
            permissions,
            groups,
            permission_index,
            group_index,
        })
    }

    /// Returns an empty catalog (no permissions, no groups).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            permissions: Vec::new(),
            groups: Vec::new(),
            permission_index: HashMap::new(),
            group_index: HashMap::new(),
        }
    }

    /// Looks up a permission definition by name.
    #[must_use]
    pub fn permission(&self, name: &str) -> Option<&Permission> {
        self.permission_index
            .get(name)
            .map(|position| &self.permissions[*position])
    }

    /// Looks up a permission group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&PermissionGroup> {
        self.group_index
            .get(name)
            .map(|position| &self.groups[*position])
    }

    /// Returns all permission definitions.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Returns all permission groups.
    #[must_use]
    pub fn groups(&self) -> &[PermissionGroup] {
        &self.groups
    }

    fn validate_name(name: &str) -> Result<(), CatalogError> {
        if name == ADMIN_SCOPE {
            return Err(CatalogError::NameCollision {
                name: name.to_owned(),
            });
        }
        if name.matches(PLACEHOLDER).count() > 1 {
            return Err(CatalogError::MultiplePlaceholders {
                name: name.to_owned(),
            });
        }
        Ok(())
    }
}
