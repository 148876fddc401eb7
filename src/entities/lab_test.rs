//! Lab test entity - tests ordered during a visit and their result files

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabTestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for LabTestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabTestStatus::Pending => write!(f, "pending"),
            LabTestStatus::InProgress => write!(f, "in_progress"),
            LabTestStatus::Completed => write!(f, "completed"),
            LabTestStatus::Cancelled => write!(f, "cancelled"),
            LabTestStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: u64,

    pub visit_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<u64>,

    pub test_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,

    pub status: LabTestStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Storage path of the uploaded result document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub ordered_at: Option<DateTime<Utc>>,

    #[serde(
        default,
        deserialize_with = "crate::entities::de::opt_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Record for LabTest {
    const RESOURCE: Resource = Resource::LabTest;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        format!("{} [{}]", self.test_name, self.status)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabTestRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LabTestStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LabTestFilters {
    pub search: Option<String>,
    pub status: Option<LabTestStatus>,
    pub visit_id: Option<u64>,
}

impl LabTestFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("status", self.status)
            .with_opt("visit_id", self.visit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        let test: LabTest = serde_json::from_str(
            r#"{"id": 3, "visit_id": 7, "test_name": "CBC", "status": "in_progress"}"#,
        )
        .unwrap();
        assert_eq!(test.status, LabTestStatus::InProgress);
        assert_eq!(test.label(), "CBC [in_progress]");

        let test: LabTest = serde_json::from_str(
            r#"{"id": 3, "visit_id": 7, "test_name": "CBC", "status": "sent_out"}"#,
        )
        .unwrap();
        assert_eq!(test.status, LabTestStatus::Unknown);
    }

    #[test]
    fn test_filters_use_wire_status() {
        let filters = LabTestFilters {
            status: Some(LabTestStatus::InProgress),
            ..Default::default()
        }
        .to_filters();
        assert_eq!(filters.get("status"), Some("in_progress"));
    }
}
