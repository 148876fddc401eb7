//! Patient profiles and documents

use crate::api::envelope::{decode_item, Page};
use crate::api::error::ApiError;
use crate::api::multipart::{FileUpload, FormBody};
use crate::api::query::QueryClient;
use crate::core::cache::Filters;
use crate::core::entity::Resource;
use crate::core::invalidation::Mutation;
use crate::entities::patient::PatientDocumentRequest;
use crate::entities::{PatientDocument, PatientProfile};

/// Profile versions of a patient, newest first as the server orders them
pub fn profiles(
    client: &mut QueryClient,
    patient_id: u64,
    page: u32,
) -> Result<Page<PatientProfile>, ApiError> {
    let filters = Filters::new().with("patient_id", patient_id);
    client.list(page, &filters)
}

/// The profile flagged current, if any
pub fn current_profile(
    client: &mut QueryClient,
    patient_id: u64,
) -> Result<Option<PatientProfile>, ApiError> {
    let page = profiles(client, patient_id, 1)?;
    Ok(page.items.into_iter().find(|p| p.is_current))
}

pub fn documents(
    client: &mut QueryClient,
    patient_id: u64,
    page: u32,
) -> Result<Page<PatientDocument>, ApiError> {
    let filters = Filters::new().with("patient_id", patient_id);
    client.list(page, &filters)
}

/// Attach a file to a patient (and optionally a visit)
pub fn upload_document(
    client: &mut QueryClient,
    request: &PatientDocumentRequest,
    file: FileUpload,
) -> Result<PatientDocument, ApiError> {
    let form = FormBody::from_payload(request)?.file(file);
    let mutation = Mutation::create(Resource::PatientDocument);
    let value = client.mutate(&mutation, |api| {
        api.post_multipart(Resource::PatientDocument.path(), form)
    })?;
    decode_item(value)
}
