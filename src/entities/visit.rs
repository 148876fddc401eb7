//! Visit entity - the clinical encounter following an appointment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};
use crate::entities::doctor::Doctor;
use crate::entities::patient::Patient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    InProgress,
    Completed,
    #[serde(other)]
    Unknown,
}

impl VisitStatus {
    /// Only an open visit offers the complete action
    pub fn can_complete(&self) -> bool {
        *self == VisitStatus::InProgress
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisitStatus::InProgress => write!(f, "in_progress"),
            VisitStatus::Completed => write!(f, "completed"),
            VisitStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Vital signs recorded during a visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub heart_rate: Option<f64>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<f64>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub respiratory_rate: Option<f64>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub oxygen_saturation: Option<f64>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
}

impl VitalSigns {
    pub fn is_empty(&self) -> bool {
        self == &VitalSigns::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<u64>,

    pub patient_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,

    pub doctor_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<u64>,

    pub status: VisitStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vital_signs: Option<VitalSigns>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Visit {
    pub fn patient_name(&self) -> String {
        self.patient
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("patient #{}", self.patient_id))
    }
}

impl Record for Visit {
    const RESOURCE: Resource = Resource::Visit;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        match &self.chief_complaint {
            Some(c) => format!("{}: {}", self.patient_name(), c),
            None => self.patient_name(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VisitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vital_signs: Option<VitalSigns>,
}

#[derive(Debug, Clone, Default)]
pub struct VisitFilters {
    pub search: Option<String>,
    pub status: Option<VisitStatus>,
    pub doctor_id: Option<u64>,
    pub patient_id: Option<u64>,
}

impl VisitFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("status", self.status)
            .with_opt("doctor_id", self.doctor_id)
            .with_opt("patient_id", self.patient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_offered_only_in_progress() {
        assert!(VisitStatus::InProgress.can_complete());
        assert!(!VisitStatus::Completed.can_complete());
        assert!(!VisitStatus::Unknown.can_complete());
    }

    #[test]
    fn test_vitals_accept_strings() {
        let visit: Visit = serde_json::from_str(
            r#"{"id": 7, "patient_id": 3, "doctor_id": 4, "status": "in_progress",
                "chief_complaint": "Headache",
                "vital_signs": {"blood_pressure": "120/80", "heart_rate": "72", "temperature": 36.8}}"#,
        )
        .unwrap();
        let vitals = visit.vital_signs.unwrap();
        assert_eq!(vitals.heart_rate, Some(72.0));
        assert_eq!(vitals.temperature, Some(36.8));
        assert!(!vitals.is_empty());
        assert_eq!(visit.status, VisitStatus::InProgress);
    }
}
