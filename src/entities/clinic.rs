//! Clinic entity - a physical location where doctors see patients

use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};
use crate::entities::company::Company;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Storage path of the clinic photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctors_count: Option<u64>,
}

impl Record for Clinic {
    const RESOURCE: Resource = Resource::Clinic;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// Create/update payload for a clinic (the photo travels separately)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClinicRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ClinicFilters {
    pub search: Option<String>,
    pub company_id: Option<u64>,
    pub city: Option<String>,
    pub is_active: Option<bool>,
}

impl ClinicFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("company_id", self.company_id)
            .with_opt("city", self.city.as_deref())
            .with_opt("is_active", self.is_active.map(|b| b as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clinic_minimal_payload() {
        let clinic: Clinic =
            serde_json::from_str(r#"{"id": 3, "name": "City Medical Center"}"#).unwrap();
        assert_eq!(clinic.name, "City Medical Center");
        assert!(clinic.is_active);
        assert!(clinic.photo.is_none());
    }

    #[test]
    fn test_clinic_with_company() {
        let clinic: Clinic = serde_json::from_str(
            r#"{
                "id": 3,
                "name": "North Branch",
                "company_id": 1,
                "company": {"id": 1, "name": "Acme Health", "is_active": true},
                "is_active": "0"
            }"#,
        )
        .unwrap();
        assert_eq!(clinic.company.unwrap().name, "Acme Health");
        assert!(!clinic.is_active);
    }
}
