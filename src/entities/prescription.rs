//! Prescription entity - medication ordered during a visit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: u64,

    pub visit_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<u64>,

    pub medication_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Prescription {
    const RESOURCE: Resource = Resource::Prescription;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        let parts: Vec<&str> = [
            Some(self.medication_name.as_str()),
            self.dosage.as_deref(),
            self.frequency.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PrescriptionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PrescriptionFilters {
    pub search: Option<String>,
    pub visit_id: Option<u64>,
    pub patient_id: Option<u64>,
}

impl PrescriptionFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("visit_id", self.visit_id)
            .with_opt("patient_id", self.patient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_skips_missing_parts() {
        let rx: Prescription = serde_json::from_str(
            r#"{"id": 1, "visit_id": 7, "medication_name": "Amoxicillin", "dosage": "500mg"}"#,
        )
        .unwrap();
        assert_eq!(rx.label(), "Amoxicillin 500mg");
    }
}
