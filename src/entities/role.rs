//! Role and permission entities

use serde::{Deserialize, Serialize};

use crate::core::entity::{Record, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: u64,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard_name: Option<String>,
}

impl Record for Permission {
    const RESOURCE: Resource = Resource::Permission;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions_count: Option<u64>,
}

impl Role {
    /// Permission count, preferring the server aggregate when present
    pub fn permission_total(&self) -> u64 {
        self.permissions_count
            .unwrap_or(self.permissions.len() as u64)
    }
}

impl Record for Role {
    const RESOURCE: Resource = Resource::Role;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// Create/update payload for a role
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

/// `POST /roles/{id}/permissions` - replaces the role's permission set
#[derive(Debug, Clone, Serialize)]
pub struct SyncPermissionsRequest {
    pub permissions: Vec<String>,
}
