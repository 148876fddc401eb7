//! Status filter enums for list commands
//!
//! Each filter maps onto the entity status the server filters by; `All`
//! sends no status parameter.

use clap::ValueEnum;

use crate::entities::{AppointmentStatus, LabTestStatus, VisitStatus};

/// Active-flag filter shared by directory entities
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ActiveFilter {
    /// Active records only
    Active,
    /// Inactive records only
    Inactive,
    /// Both - default
    #[default]
    All,
}

impl ActiveFilter {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ActiveFilter::Active => Some(true),
            ActiveFilter::Inactive => Some(false),
            ActiveFilter::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum AppointmentStatusFilter {
    Booked,
    Confirmed,
    Arrived,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    /// All statuses - default
    #[default]
    All,
}

impl AppointmentStatusFilter {
    pub fn status(&self) -> Option<AppointmentStatus> {
        match self {
            AppointmentStatusFilter::Booked => Some(AppointmentStatus::Booked),
            AppointmentStatusFilter::Confirmed => Some(AppointmentStatus::Confirmed),
            AppointmentStatusFilter::Arrived => Some(AppointmentStatus::Arrived),
            AppointmentStatusFilter::InProgress => Some(AppointmentStatus::InProgress),
            AppointmentStatusFilter::Completed => Some(AppointmentStatus::Completed),
            AppointmentStatusFilter::Cancelled => Some(AppointmentStatus::Cancelled),
            AppointmentStatusFilter::NoShow => Some(AppointmentStatus::NoShow),
            AppointmentStatusFilter::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum VisitStatusFilter {
    InProgress,
    Completed,
    #[default]
    All,
}

impl VisitStatusFilter {
    pub fn status(&self) -> Option<VisitStatus> {
        match self {
            VisitStatusFilter::InProgress => Some(VisitStatus::InProgress),
            VisitStatusFilter::Completed => Some(VisitStatus::Completed),
            VisitStatusFilter::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum LabStatusFilter {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    #[default]
    All,
}

impl LabStatusFilter {
    pub fn status(&self) -> Option<LabTestStatus> {
        match self {
            LabStatusFilter::Pending => Some(LabTestStatus::Pending),
            LabStatusFilter::InProgress => Some(LabTestStatus::InProgress),
            LabStatusFilter::Completed => Some(LabTestStatus::Completed),
            LabStatusFilter::Cancelled => Some(LabTestStatus::Cancelled),
            LabStatusFilter::All => None,
        }
    }
}

impl std::fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveFilter::Active => write!(f, "active"),
            ActiveFilter::Inactive => write!(f, "inactive"),
            ActiveFilter::All => write!(f, "all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_filter() {
        assert_eq!(ActiveFilter::Active.as_flag(), Some(true));
        assert_eq!(ActiveFilter::Inactive.as_flag(), Some(false));
        assert_eq!(ActiveFilter::All.as_flag(), None);
    }

    #[test]
    fn test_appointment_filter_maps_to_wire_status() {
        assert_eq!(
            AppointmentStatusFilter::NoShow.status().map(|s| s.to_string()),
            Some("no_show".to_string())
        );
        assert_eq!(AppointmentStatusFilter::All.status(), None);
    }

    #[test]
    fn test_lab_and_visit_filters() {
        assert_eq!(LabStatusFilter::Pending.status(), Some(LabTestStatus::Pending));
        assert_eq!(VisitStatusFilter::All.status(), None);
        assert_eq!(
            VisitStatusFilter::InProgress.status(),
            Some(VisitStatus::InProgress)
        );
    }
}
