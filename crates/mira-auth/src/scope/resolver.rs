//! The scope-resolution algorithm.

use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::{ADMIN_SCOPE, PermissionCatalog};
use crate::scope::{GrantedScope, RequiredScope};

/// Tracing target for authorization decisions.
const TRACING_TARGET: &str = "mira_auth::scope::resolver";

/// Outcome of a scope-resolution check.
///
/// The resolver never fails: a negative outcome carries the unmet scopes so
/// the boundary can name them in its challenge header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "decisions do nothing unless acted upon"]
pub enum Decision {
    /// Every bound required scope is covered by the expanded granted set.
    Authorized,
    /// One or more required scopes are not covered.
    Denied {
        /// The bound required scopes the caller is missing, in declaration
        /// order.
        missing: Vec<String>,
    },
}

impl Decision {
    /// Returns `true` when the caller is authorized.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Returns the unmet scopes (empty when authorized).
    #[must_use]
    pub fn missing(&self) -> &[String] {
        match self {
            Self::Authorized => &[],
            Self::Denied { missing } => missing,
        }
    }
}

/// Decides whether a caller's granted scopes satisfy a handler's required
/// scopes, optionally parameterized by a concrete resource id.
///
/// Resolution is a pure set-membership test over the immutable catalog:
/// stateless, idempotent and safe to re-evaluate on every request.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    catalog: Arc<PermissionCatalog>,
}

impl ScopeResolver {
    /// Creates a resolver over a shared permission catalog.
    pub fn new(catalog: Arc<PermissionCatalog>) -> Self {
        Self { catalog }
    }

    /// Returns the catalog this resolver consults.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Resolves an authorization decision.
    ///
    /// 1. `"is_admin"` among the grants authorizes immediately.
    /// 2. Required scopes are bound to the resource id; a dynamic requirement
    ///    with no resource id can never be satisfied.
    /// 3. Granted scopes are expanded: groups to their (bound) members,
    ///    resource-bound grants down the privilege hierarchy, everything else
    ///    passes through unchanged.
    /// 4. Authorized iff every bound requirement is in the expanded set.
    ///    An empty requirement list always authorizes.
    pub fn decide(
        &self,
        required: &[&str],
        resource_id: Option<i64>,
        granted: &[String],
    ) -> Decision {
        if granted.iter().any(|scope| scope == ADMIN_SCOPE) {
            tracing::debug!(
                target: TRACING_TARGET,
                "admin sentinel present, bypassing scope checks"
            );
            return Decision::Authorized;
        }

        if required.is_empty() {
            return Decision::Authorized;
        }

        let expanded = self.expand_granted(granted, resource_id);

        let mut missing = Vec::new();
        for raw in required {
            let requirement = RequiredScope::parse(raw);
            match requirement.bind(resource_id) {
                Some(bound) if expanded.contains(&bound) => {}
                Some(bound) => missing.push(bound),
                // Dynamic requirement with no resource id: unresolvable.
                None => missing.push(requirement.raw().to_owned()),
            }
        }

        if missing.is_empty() {
            Decision::Authorized
        } else {
            tracing::debug!(
                target: TRACING_TARGET,
                missing = ?missing,
                resource_id = ?resource_id,
                "scope requirements not met"
            );
            Decision::Denied { missing }
        }
    }

    /// Expands raw granted scopes into the flat set of satisfied scope
    /// strings for this request.
    fn expand_granted(&self, granted: &[String], resource_id: Option<i64>) -> HashSet<String> {
        let mut expanded = HashSet::new();

        for raw in granted {
            match GrantedScope::parse(raw, &self.catalog) {
                // Handled by the bypass above; inert during expansion.
                GrantedScope::Admin => {}
                GrantedScope::BoundResource {
                    resource_id: bound_id,
                    level,
                } => {
                    for implied in level.implied() {
                        expanded.insert(format!("{bound_id}:{implied}"));
                    }
                }
                GrantedScope::Group(name) => {
                    let Some(group) = self.catalog.group(&name) else {
                        continue;
                    };
                    for member in group.permissions() {
                        match (member.is_dynamic(), resource_id) {
                            (true, Some(id)) => {
                                expanded.insert(member.bind(id));
                            }
                            // An unbound dynamic member can never match.
                            (true, None) => {}
                            (false, _) => {
                                expanded.insert(member.name().to_owned());
                            }
                        }
                    }
                }
                GrantedScope::Dynamic(raw) | GrantedScope::Literal(raw) => {
                    expanded.insert(raw);
                }
            }
        }

        expanded
    }
}
