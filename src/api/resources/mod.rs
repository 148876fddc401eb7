//! Typed resource endpoints
//!
//! The generic operations here cover plain CRUD for any [`Record`]; the
//! submodules add the endpoints specific to one entity family. Every write
//! goes through [`QueryClient::mutate`] with the mutation describing what it
//! touched.

pub mod accounts;
pub mod clinical;
pub mod dashboard;
pub mod directory;
pub mod patients;

use serde::Serialize;

use crate::api::envelope::decode_item;
use crate::api::error::{ApiError, StepError};
use crate::api::multipart::{FileUpload, FormBody};
use crate::api::query::QueryClient;
use crate::core::entity::{Record, Resource};
use crate::core::invalidation::Mutation;

/// Create a record; a file, when given, travels in the same submission
pub fn create<T: Record, B: Serialize>(
    client: &mut QueryClient,
    body: &B,
    file: Option<FileUpload>,
) -> Result<T, ApiError> {
    let resource = T::RESOURCE;
    let form = match file {
        Some(file) => Some(FormBody::from_payload(body)?.file(file)),
        None => None,
    };
    let value = client.mutate(&Mutation::create(resource), |api| match form {
        Some(form) => api.post_multipart(resource.path(), form),
        None => api.post_json(resource.path(), body),
    })?;
    let record: T = decode_item(value)?;
    tracing::info!(resource = %resource, id = record.id(), "created");
    Ok(record)
}

pub fn update<T: Record, B: Serialize>(
    client: &mut QueryClient,
    id: u64,
    body: &B,
) -> Result<T, ApiError> {
    let resource = T::RESOURCE;
    let value = client.mutate(&Mutation::update(resource, id), |api| {
        api.put_json(&resource.item_path(id), body)
    })?;
    decode_item(value)
}

pub fn delete(client: &mut QueryClient, resource: Resource, id: u64) -> Result<(), ApiError> {
    client.mutate(&Mutation::delete(resource, id), |api| {
        api.delete(&resource.item_path(id))
    })?;
    tracing::info!(resource = %resource, id, "deleted");
    Ok(())
}

/// Upload a file to `<item>/<segment>`
pub fn upload<T: Record>(
    client: &mut QueryClient,
    id: u64,
    segment: &str,
    file: FileUpload,
) -> Result<T, ApiError> {
    let resource = T::RESOURCE;
    let path = format!("{}/{}", resource.item_path(id), segment);
    let value = client.mutate(&Mutation::upload(resource, id), |api| {
        api.post_multipart(&path, FormBody::new().file(file))
    })?;
    decode_item(value)
}

/// Update fields, then upload a file if one was given
///
/// The upload only runs after the field update succeeded. The error says
/// which of the two calls failed.
pub fn update_with_file<T: Record, B: Serialize>(
    client: &mut QueryClient,
    id: u64,
    body: &B,
    file: Option<(&str, FileUpload)>,
) -> Result<T, StepError> {
    let updated: T = update(client, id, body).map_err(StepError::FieldUpdate)?;
    match file {
        Some((segment, file)) => {
            upload(client, id, segment, file).map_err(|source| StepError::FileUpload { source })
        }
        None => Ok(updated),
    }
}
