//! User entity - platform accounts (staff, doctors, patients)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};
use crate::entities::role::{Permission, Role};

/// A platform account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,

    pub name: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Storage path of the avatar image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,

    /// Permissions granted directly (not through a role)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Role names joined for display
    pub fn role_names(&self) -> String {
        let names: Vec<&str> = self.roles.iter().map(|r| r.name.as_str()).collect();
        names.join(", ")
    }
}

impl Record for User {
    const RESOURCE: Resource = Resource::User;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

/// Create/update payload for a user
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    /// Role names to grant on creation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

/// `POST /users/{id}/roles`
#[derive(Debug, Clone, Serialize)]
pub struct AssignRolesRequest {
    pub roles: Vec<String>,
}

/// `POST /users/{id}/permissions`
#[derive(Debug, Clone, Serialize)]
pub struct AssignPermissionsRequest {
    pub permissions: Vec<String>,
}

/// List filters for the users screen
#[derive(Debug, Clone, Default)]
pub struct UserFilters {
    pub search: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

impl UserFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("role", self.role.as_deref())
            .with_opt("is_active", self.is_active.map(|b| b as u8))
    }
}
