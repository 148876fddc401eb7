//! Specialty entity - medical specialties doctors practice

use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: u64,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctors_count: Option<u64>,
}

impl Record for Specialty {
    const RESOURCE: Resource = Resource::Specialty;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SpecialtyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SpecialtyFilters {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl SpecialtyFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("is_active", self.is_active.map(|b| b as u8))
    }
}
