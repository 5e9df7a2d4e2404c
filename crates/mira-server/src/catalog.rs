//! The built-in media permission catalog.
//!
//! Items live in storage buckets or on the video host; each backend gets the
//! four CRUD item permissions parameterized by the source's resource id, plus
//! group bundles at the manage/update/read tiers. Gallery and link creation
//! are plain literal permissions.

use mira_auth::catalog::{CatalogError, Permission, PermissionCatalog, PermissionGroup};

fn bucket_permissions() -> Vec<Permission> {
    vec![
        Permission::new("bucket_{resource_id}_item_read", "Bucket Item View"),
        Permission::new("bucket_{resource_id}_item_create", "Bucket Item Create"),
        Permission::new("bucket_{resource_id}_item_update", "Bucket Item Update"),
        Permission::new("bucket_{resource_id}_item_delete", "Bucket Item Delete"),
    ]
}

fn vimeo_permissions() -> Vec<Permission> {
    vec![
        Permission::new("vimeo_{resource_id}_item_read", "Vimeo Item View"),
        Permission::new("vimeo_{resource_id}_item_create", "Vimeo Item Create"),
        Permission::new("vimeo_{resource_id}_item_update", "Vimeo Item Update"),
        Permission::new("vimeo_{resource_id}_item_delete", "Vimeo Item Delete"),
    ]
}

fn miscellaneous_permissions() -> Vec<Permission> {
    vec![
        Permission::new("item_link_create", "Create Item Link"),
        Permission::new("gallery_create", "Create Gallery"),
        Permission::new("gallery_link_create", "Create Gallery Link"),
    ]
}

/// Groups for one item backend: manage (full CRUD), update (no delete) and
/// read-only tiers over the same four permissions.
fn backend_groups(backend: &str, label: &str, permissions: &[Permission]) -> Vec<PermissionGroup> {
    let [read, create, update, delete] = permissions else {
        return Vec::new();
    };

    vec![
        PermissionGroup::new(format!("group_{backend}_item_manage"), format!("{label} Item Manage"), vec![
            read.clone(),
            create.clone(),
            update.clone(),
            delete.clone(),
        ]),
        PermissionGroup::new(format!("group_{backend}_item_update"), format!("{label} Item Update"), vec![
            read.clone(),
            create.clone(),
            update.clone(),
        ]),
        PermissionGroup::new(
            format!("group_{backend}_item_read"),
            format!("{label} Item Read Only"),
            vec![read.clone()],
        ),
    ]
}

/// Builds the complete media permission catalog.
///
/// # Errors
///
/// Returns a [`CatalogError`] if the definitions are inconsistent; with the
/// built-in definitions this only fires when an edit here breaks them.
pub fn media_catalog() -> Result<PermissionCatalog, CatalogError> {
    let bucket = bucket_permissions();
    let vimeo = vimeo_permissions();

    let mut groups = backend_groups("bucket", "Bucket", &bucket);
    groups.extend(backend_groups("vimeo", "Vimeo", &vimeo));

    let mut permissions = miscellaneous_permissions();
    permissions.extend(bucket);
    permissions.extend(vimeo);

    PermissionCatalog::new(permissions, groups)
}
