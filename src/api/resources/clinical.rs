//! Appointments, visits, prescriptions, and lab tests
//!
//! Status changes go through dedicated endpoints and invalidate like an
//! update of the record.

use crate::api::envelope::{decode_item, Page};
use crate::api::error::ApiError;
use crate::api::multipart::FileUpload;
use crate::api::query::QueryClient;
use crate::core::cache::Filters;
use crate::core::entity::{Relation, Resource};
use crate::core::invalidation::Mutation;
use crate::entities::appointment::{AppointmentStatusRequest, CancelAppointmentRequest};
use crate::entities::{
    Appointment, AppointmentStatus, LabTest, Prescription, Visit,
};

/// Field name of a lab result file
pub const LAB_RESULT_FIELD: &str = "result_file";

// =========================================================================
// Appointments
// =========================================================================

pub fn cancel_appointment(
    client: &mut QueryClient,
    id: u64,
    reason: Option<String>,
) -> Result<Appointment, ApiError> {
    let path = format!("{}/cancel", Resource::Appointment.item_path(id));
    let body = CancelAppointmentRequest {
        cancellation_reason: reason,
    };
    let value = client.mutate(&Mutation::transition(Resource::Appointment, id), |api| {
        api.post_json(&path, &body)
    })?;
    decode_item(value)
}

pub fn set_appointment_status(
    client: &mut QueryClient,
    id: u64,
    status: AppointmentStatus,
) -> Result<Appointment, ApiError> {
    let path = format!("{}/status", Resource::Appointment.item_path(id));
    let body = AppointmentStatusRequest { status };
    let value = client.mutate(&Mutation::transition(Resource::Appointment, id), |api| {
        api.patch_json(&path, &body)
    })?;
    decode_item(value)
}

pub fn patient_appointments(
    client: &mut QueryClient,
    patient_id: u64,
    page: u32,
) -> Result<Page<Appointment>, ApiError> {
    client.query_related(Relation::PatientAppointments, patient_id, page, &Filters::new())
}

// =========================================================================
// Visits
// =========================================================================

pub fn complete_visit(client: &mut QueryClient, id: u64) -> Result<Visit, ApiError> {
    let path = format!("{}/complete", Resource::Visit.item_path(id));
    let value = client.mutate(&Mutation::transition(Resource::Visit, id), |api| {
        api.post_json(&path, &serde_json::json!({}))
    })?;
    decode_item(value)
}

pub fn patient_visits(
    client: &mut QueryClient,
    patient_id: u64,
    page: u32,
) -> Result<Page<Visit>, ApiError> {
    client.query_related(Relation::PatientVisits, patient_id, page, &Filters::new())
}

// =========================================================================
// Prescriptions and lab tests
// =========================================================================

pub fn visit_prescriptions(
    client: &mut QueryClient,
    visit_id: u64,
) -> Result<Page<Prescription>, ApiError> {
    client.query_related(Relation::VisitPrescriptions, visit_id, 1, &Filters::new())
}

pub fn patient_prescriptions(
    client: &mut QueryClient,
    patient_id: u64,
    page: u32,
) -> Result<Page<Prescription>, ApiError> {
    client.query_related(Relation::PatientPrescriptions, patient_id, page, &Filters::new())
}

pub fn visit_lab_tests(client: &mut QueryClient, visit_id: u64) -> Result<Page<LabTest>, ApiError> {
    client.query_related(Relation::VisitLabTests, visit_id, 1, &Filters::new())
}

/// Attach the result document of a lab test
pub fn upload_lab_result(
    client: &mut QueryClient,
    id: u64,
    file: FileUpload,
) -> Result<LabTest, ApiError> {
    super::upload(client, id, "result", file)
}
