//! Company entity - the organisation that owns clinics

use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: u64,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinics_count: Option<u64>,
}

impl Record for Company {
    const RESOURCE: Resource = Resource::Company;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompanyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyFilters {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl CompanyFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("is_active", self.is_active.map(|b| b as u8))
    }
}
