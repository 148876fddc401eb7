//! Dashboard totals, read from list pagination metadata

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::query::QueryClient;
use crate::core::cache::Filters;
use crate::core::entity::Resource;
use crate::entities::{AppointmentStatus, LabTestStatus};

/// Collections counted on the dashboard
pub const COUNTED: [Resource; 6] = [
    Resource::Patient,
    Resource::Doctor,
    Resource::Clinic,
    Resource::Appointment,
    Resource::Visit,
    Resource::LabTest,
];

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub totals: Vec<(String, u64)>,
    pub appointments_today: u64,
    pub booked_appointments: u64,
    pub pending_lab_tests: u64,
}

fn total(client: &mut QueryClient, resource: Resource, filters: &Filters) -> Result<u64, ApiError> {
    Ok(client
        .query_page::<Value>(resource, 1, filters)?
        .meta
        .total)
}

pub fn summary(client: &mut QueryClient, today: NaiveDate) -> Result<DashboardSummary, ApiError> {
    let mut totals = Vec::with_capacity(COUNTED.len());
    for resource in COUNTED {
        totals.push((
            resource.name_plural().to_string(),
            total(client, resource, &Filters::new())?,
        ));
    }

    let appointments_today = total(
        client,
        Resource::Appointment,
        &Filters::new().with("date", today),
    )?;
    let booked_appointments = total(
        client,
        Resource::Appointment,
        &Filters::new().with("status", AppointmentStatus::Booked),
    )?;
    let pending_lab_tests = total(
        client,
        Resource::LabTest,
        &Filters::new().with("status", LabTestStatus::Pending),
    )?;

    Ok(DashboardSummary {
        totals,
        appointments_today,
        booked_appointments,
        pending_lab_tests,
    })
}
