//! Patient entity, versioned medical profiles, and attached documents

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub is_active: bool,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Patient {
    const RESOURCE: Resource = Resource::Patient;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        match &self.phone {
            Some(phone) => format!("{} ({})", self.name, phone),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PatientFilters {
    pub search: Option<String>,
    pub gender: Option<String>,
    pub is_active: Option<bool>,
}

impl PatientFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("gender", self.gender.as_deref())
            .with_opt("is_active", self.is_active.map(|b| b as u8))
    }
}

// =========================================================================
// Profiles
// =========================================================================

/// Medical snapshot of a patient at one clinic
///
/// Profiles are versioned: an update on the server creates a new version
/// and flips `is_current` on the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: u64,

    pub patient_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<u64>,

    #[serde(default = "first_version")]
    pub version: u32,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub is_current: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chronic_conditions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_medications: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub height_cm: Option<f64>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight_kg: Option<f64>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

fn first_version() -> u32 {
    1
}

impl Record for PatientProfile {
    const RESOURCE: Resource = Resource::PatientProfile;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        let current = if self.is_current { " (current)" } else { "" };
        format!("patient #{} v{}{}", self.patient_id, self.version, current)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chronic_conditions: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_medications: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

// =========================================================================
// Documents
// =========================================================================

/// A file attached to a patient, optionally tied to a visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDocument {
    pub id: u64,

    pub patient_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    /// Storage path of the uploaded file
    pub file_path: String,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for PatientDocument {
    const RESOURCE: Resource = Resource::PatientDocument;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            self.file_path
                .rsplit('/')
                .next()
                .unwrap_or(&self.file_path)
                .to_string()
        })
    }
}

/// Metadata sent alongside a document upload
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientDocumentRequest {
    pub patient_id: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}
