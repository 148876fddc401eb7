//! Users, roles, and permissions

use crate::api::envelope::decode_item;
use crate::api::error::ApiError;
use crate::api::query::QueryClient;
use crate::core::cache::Filters;
use crate::core::entity::Resource;
use crate::core::invalidation::Mutation;
use crate::entities::role::SyncPermissionsRequest;
use crate::entities::user::{AssignPermissionsRequest, AssignRolesRequest};
use crate::entities::{Permission, Role, User};

/// Grant roles to a user (by role name)
pub fn assign_roles(
    client: &mut QueryClient,
    user_id: u64,
    roles: Vec<String>,
) -> Result<User, ApiError> {
    let path = format!("{}/roles", Resource::User.item_path(user_id));
    let body = AssignRolesRequest { roles };
    let value = client.mutate(&Mutation::UserRoles { user_id }, |api| {
        api.post_json(&path, &body)
    })?;
    decode_item(value)
}

/// Grant direct permissions to a user (by permission name)
pub fn assign_permissions(
    client: &mut QueryClient,
    user_id: u64,
    permissions: Vec<String>,
) -> Result<User, ApiError> {
    let path = format!("{}/permissions", Resource::User.item_path(user_id));
    let body = AssignPermissionsRequest { permissions };
    let value = client.mutate(&Mutation::UserPermissions { user_id }, |api| {
        api.post_json(&path, &body)
    })?;
    decode_item(value)
}

/// Replace a role's permission set
pub fn sync_permissions(
    client: &mut QueryClient,
    role_id: u64,
    permissions: Vec<String>,
) -> Result<Role, ApiError> {
    let path = format!("{}/permissions", Resource::Role.item_path(role_id));
    let body = SyncPermissionsRequest { permissions };
    let value = client.mutate(&Mutation::RolePermissions { role_id }, |api| {
        api.post_json(&path, &body)
    })?;
    decode_item(value)
}

/// Every permission, for pickers
pub fn all_permissions(client: &mut QueryClient) -> Result<Vec<Permission>, ApiError> {
    Ok(client.list::<Permission>(1, &Filters::new())?.items)
}

/// Every role, for pickers
pub fn all_roles(client: &mut QueryClient) -> Result<Vec<Role>, ApiError> {
    Ok(client.list::<Role>(1, &Filters::new())?.items)
}
