//! Appointment entity and its status machine
//!
//! The status flow is `booked → confirmed → arrived → in_progress →
//! completed`, with `cancelled` and `no_show` reachable from any status
//! before completion. Transition legality is decided by the server; the
//! client offers every other status and only hides cancel on closed
//! appointments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};
use crate::entities::clinic::Clinic;
use crate::entities::doctor::Doctor;
use crate::entities::patient::Patient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
    Arrived,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    /// Status string this client does not know
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    pub const KNOWN: [AppointmentStatus; 7] = [
        AppointmentStatus::Booked,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Arrived,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    /// Whether the cancel action is offered
    pub fn can_cancel(&self) -> bool {
        !matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed | AppointmentStatus::Unknown
        )
    }

    /// Statuses offered in the status-change action: every known status
    /// other than the current one
    pub fn status_choices(&self) -> Vec<AppointmentStatus> {
        Self::KNOWN.iter().copied().filter(|s| s != self).collect()
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Arrived => write!(f, "arrived"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
            AppointmentStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u64,

    pub patient_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,

    pub doctor_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,

    pub clinic_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic: Option<Clinic>,

    #[serde(deserialize_with = "crate::entities::de::date")]
    pub appointment_date: NaiveDate,

    /// Backend time string (`HH:MM` or `HH:MM:SS`)
    pub start_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    pub status: AppointmentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

impl Appointment {
    pub fn patient_name(&self) -> String {
        self.patient
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("patient #{}", self.patient_id))
    }

    pub fn doctor_name(&self) -> String {
        self.doctor
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("doctor #{}", self.doctor_id))
    }
}

impl Record for Appointment {
    const RESOURCE: Resource = Resource::Appointment;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        format!(
            "{} {} {} with {}",
            self.appointment_date,
            self.start_time,
            self.patient_name(),
            self.doctor_name()
        )
    }
}

/// A bookable slot computed by the backend from the doctor's schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub start_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub available: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `PATCH /healthcare/appointments/{id}/status`
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentStatusRequest {
    pub status: AppointmentStatus,
}

/// `POST /healthcare/appointments/{id}/cancel`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CancelAppointmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilters {
    pub search: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub doctor_id: Option<u64>,
    pub clinic_id: Option<u64>,
    pub patient_id: Option<u64>,
    pub date: Option<NaiveDate>,
}

impl AppointmentFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("search", self.search.as_deref())
            .with_opt("status", self.status)
            .with_opt("doctor_id", self.doctor_id)
            .with_opt("clinic_id", self.clinic_id)
            .with_opt("patient_id", self.patient_id)
            .with_opt("date", self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_hidden_for_closed_appointments() {
        assert!(AppointmentStatus::Booked.can_cancel());
        assert!(AppointmentStatus::InProgress.can_cancel());
        assert!(!AppointmentStatus::Cancelled.can_cancel());
        assert!(!AppointmentStatus::Completed.can_cancel());
    }

    #[test]
    fn test_status_choices_leave_legality_to_server() {
        let choices = AppointmentStatus::Booked.status_choices();
        assert_eq!(choices.len(), 6);
        assert!(!choices.contains(&AppointmentStatus::Booked));
        assert!(choices.contains(&AppointmentStatus::Arrived));
        assert!(AppointmentStatus::Confirmed
            .status_choices()
            .contains(&AppointmentStatus::InProgress));
        assert_eq!(
            AppointmentStatus::Completed.status_choices().len(),
            AppointmentStatus::KNOWN.len() - 1
        );
        assert_eq!(
            AppointmentStatus::Unknown.status_choices(),
            AppointmentStatus::KNOWN.to_vec()
        );
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let a: Appointment = serde_json::from_str(
            r#"{"id": 1, "patient_id": 2, "doctor_id": 3, "clinic_id": 4,
                "appointment_date": "2025-03-01", "start_time": "09:30",
                "status": "rescheduled"}"#,
        )
        .unwrap();
        assert_eq!(a.status, AppointmentStatus::Unknown);
        assert_eq!(a.label(), "2025-03-01 09:30 patient #2 with doctor #3");
    }

    #[test]
    fn test_status_wire_format() {
        let req = AppointmentStatusRequest {
            status: AppointmentStatus::NoShow,
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"status":"no_show"}"#);
        assert_eq!(AppointmentStatus::InProgress.to_string(), "in_progress");
    }
}
