//! Doctor assignments and schedule slots
//!
//! Companies, specialties, clinics and doctors are plain CRUD and go through
//! the generic operations; what lives here is the doctor ↔ clinic join and
//! the slot lookup built on top of schedules.

use chrono::NaiveDate;

use crate::api::envelope::{decode_item, Page};
use crate::api::error::ApiError;
use crate::api::query::QueryClient;
use crate::core::cache::Filters;
use crate::core::entity::Relation;
use crate::core::invalidation::Mutation;
use crate::entities::doctor::AssignClinicRequest;
use crate::entities::{AvailableSlot, DoctorClinic};

/// Upload segments for file fields
pub const CLINIC_PHOTO: &str = "photo";
pub const COMPANY_LOGO: &str = "logo";
pub const DOCTOR_PHOTO: &str = "photo";
pub const DOCTOR_LICENSE: &str = "license";

/// Clinics a doctor is assigned to
pub fn doctor_clinics(
    client: &mut QueryClient,
    doctor_id: u64,
) -> Result<Page<DoctorClinic>, ApiError> {
    client.query_related(Relation::DoctorClinics, doctor_id, 1, &Filters::new())
}

pub fn assign_clinic(
    client: &mut QueryClient,
    doctor_id: u64,
    request: &AssignClinicRequest,
) -> Result<DoctorClinic, ApiError> {
    let path = Relation::DoctorClinics.path(doctor_id);
    let value = client.mutate(&Mutation::DoctorClinics { doctor_id }, |api| {
        api.post_json(&path, request)
    })?;
    decode_item(value)
}

/// Change fees or the active flag of an existing assignment
pub fn update_assignment(
    client: &mut QueryClient,
    doctor_id: u64,
    clinic_id: u64,
    request: &AssignClinicRequest,
) -> Result<DoctorClinic, ApiError> {
    let path = format!("{}/{}", Relation::DoctorClinics.path(doctor_id), clinic_id);
    let value = client.mutate(&Mutation::DoctorClinics { doctor_id }, |api| {
        api.put_json(&path, request)
    })?;
    decode_item(value)
}

pub fn unassign_clinic(
    client: &mut QueryClient,
    doctor_id: u64,
    clinic_id: u64,
) -> Result<(), ApiError> {
    let path = format!("{}/{}", Relation::DoctorClinics.path(doctor_id), clinic_id);
    client.mutate(&Mutation::DoctorClinics { doctor_id }, |api| api.delete(&path))?;
    Ok(())
}

/// Bookable slots computed by the server for one doctor, clinic and day
pub fn available_slots(
    client: &mut QueryClient,
    doctor_id: u64,
    clinic_id: u64,
    date: NaiveDate,
) -> Result<Vec<AvailableSlot>, ApiError> {
    let filters = Filters::new()
        .with("clinic_id", clinic_id)
        .with("date", date);
    Ok(client
        .query_related(Relation::AvailableSlots, doctor_id, 1, &filters)?
        .items)
}
