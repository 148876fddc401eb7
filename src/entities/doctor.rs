//! Doctor entity and its clinic assignments

use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};
use crate::entities::clinic::Clinic;
use crate::entities::specialty::Specialty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,

    /// Storage path of the scanned license
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_document: Option<String>,

    /// Storage path of the profile photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub is_active: bool,

    /// Clinic assignments, when the backend embeds them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clinics: Vec<DoctorClinic>,
}

impl Doctor {
    pub fn specialty_name(&self) -> Option<&str> {
        self.specialty.as_ref().map(|s| s.name.as_str())
    }
}

impl Record for Doctor {
    const RESOURCE: Resource = Resource::Doctor;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        match self.specialty_name() {
            Some(s) => format!("{} ({})", self.name, s),
            None => self.name.clone(),
        }
    }
}

/// Doctor ↔ clinic join row with the fees charged there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorClinic {
    pub id: u64,

    pub doctor_id: u64,

    pub clinic_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic: Option<Clinic>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub consultation_fee: Option<f64>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub follow_up_fee: Option<f64>,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub is_active: bool,
}

impl DoctorClinic {
    pub fn clinic_name(&self) -> String {
        self.clinic
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("clinic #{}", self.clinic_id))
    }
}

impl Record for DoctorClinic {
    const RESOURCE: Resource = Resource::DoctorClinic;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        match &self.doctor_name {
            Some(doctor) => format!("{} @ {}", doctor, self.clinic_name()),
            None => format!("doctor #{} @ {}", self.doctor_id, self.clinic_name()),
        }
    }
}

/// Create/update payload for a doctor (photo and license travel separately)
#[derive(Debug, Clone, Default, Serialize)]
pub struct DoctorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// `POST /healthcare/doctors/{id}/clinics`
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignClinicRequest {
    pub clinic_id: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_fee: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct DoctorFilters {
    pub search: Option<String>,
    pub specialty_id: Option<u64>,
    pub clinic_id: Option<u64>,
    pub is_active: Option<bool>,
}

impl DoctorFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("specialty_id", self.specialty_id)
            .with_opt("clinic_id", self.clinic_id)
            .with_opt("is_active", self.is_active.map(|b| b as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_clinic_fees_as_strings() {
        let dc: DoctorClinic = serde_json::from_str(
            r#"{
                "id": 1,
                "doctor_id": 4,
                "clinic_id": 2,
                "consultation_fee": "150.00",
                "follow_up_fee": null,
                "is_active": 1,
                "clinic": {"id": 2, "name": "Harbor Clinic"}
            }"#,
        )
        .unwrap();
        assert_eq!(dc.consultation_fee, Some(150.0));
        assert_eq!(dc.follow_up_fee, None);
        assert_eq!(dc.label(), "doctor #4 @ Harbor Clinic");
    }

    #[test]
    fn test_doctor_label_includes_specialty() {
        let doctor: Doctor = serde_json::from_str(
            r#"{"id": 4, "name": "Dr. Lee", "specialty": {"id": 1, "name": "Cardiology"}}"#,
        )
        .unwrap();
        assert_eq!(doctor.label(), "Dr. Lee (Cardiology)");
    }
}
