//! Invalidation graph - which cached views a mutation makes stale
//!
//! A mutation on one entity can change what several screens show: the
//! entity's own list and detail, plus every denormalized view that embeds
//! it (a visit's prescriptions, a patient's appointments, ...). Each
//! mutation declares that full set here and the query client marks it stale
//! after the server confirms the write.

use crate::core::cache::QueryKey;
use crate::core::entity::{Relation, Resource};

/// Kind of write performed on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
    /// File attached through a dedicated upload endpoint
    Upload,
    /// Status change through a dedicated endpoint (cancel, complete, ...)
    Transition,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
            Action::Upload => write!(f, "upload"),
            Action::Transition => write!(f, "transition"),
        }
    }
}

/// A server write and the records it touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Plain write on one entity
    Entity {
        resource: Resource,
        action: Action,
        id: Option<u64>,
    },
    /// Doctor ↔ clinic assignment added, removed, or its fees changed
    DoctorClinics { doctor_id: u64 },
    /// Roles granted to a user
    UserRoles { user_id: u64 },
    /// Direct permissions granted to a user
    UserPermissions { user_id: u64 },
    /// Permission set of a role replaced
    RolePermissions { role_id: u64 },
}

impl Mutation {
    pub fn create(resource: Resource) -> Self {
        Mutation::Entity {
            resource,
            action: Action::Create,
            id: None,
        }
    }

    pub fn update(resource: Resource, id: u64) -> Self {
        Mutation::Entity {
            resource,
            action: Action::Update,
            id: Some(id),
        }
    }

    pub fn delete(resource: Resource, id: u64) -> Self {
        Mutation::Entity {
            resource,
            action: Action::Delete,
            id: Some(id),
        }
    }

    pub fn upload(resource: Resource, id: u64) -> Self {
        Mutation::Entity {
            resource,
            action: Action::Upload,
            id: Some(id),
        }
    }

    pub fn transition(resource: Resource, id: u64) -> Self {
        Mutation::Entity {
            resource,
            action: Action::Transition,
            id: Some(id),
        }
    }

    /// Key prefixes to mark stale once the server confirms this mutation
    pub fn invalidates(&self) -> Vec<QueryKey> {
        match self {
            Mutation::Entity { resource, id, .. } => {
                // Assignment rows share the doctor cascade
                if *resource == Resource::DoctorClinic {
                    return doctor_clinic_cascade(None);
                }

                let mut keys = vec![QueryKey::all(*resource)];
                if let Some(id) = id {
                    keys.push(QueryKey::detail(*resource, *id));
                }
                keys.extend(
                    related_views(*resource)
                        .iter()
                        .map(|r| QueryKey::all_related(*r)),
                );
                if *resource == Resource::DoctorSchedule {
                    keys.push(QueryKey::all_related(Relation::AvailableSlots));
                }
                keys
            }
            Mutation::DoctorClinics { doctor_id } => doctor_clinic_cascade(Some(*doctor_id)),
            Mutation::UserRoles { user_id } | Mutation::UserPermissions { user_id } => vec![
                QueryKey::all(Resource::User),
                QueryKey::detail(Resource::User, *user_id),
            ],
            Mutation::RolePermissions { role_id } => vec![
                QueryKey::all(Resource::Role),
                QueryKey::detail(Resource::Role, *role_id),
            ],
        }
    }
}

/// Denormalized views that embed records of `resource`
fn related_views(resource: Resource) -> &'static [Relation] {
    match resource {
        Resource::Appointment => &[Relation::PatientAppointments],
        Resource::Visit => &[Relation::PatientVisits],
        Resource::Prescription => &[
            Relation::VisitPrescriptions,
            Relation::PatientPrescriptions,
        ],
        Resource::LabTest => &[Relation::VisitLabTests],
        _ => &[],
    }
}

fn doctor_clinic_cascade(doctor_id: Option<u64>) -> Vec<QueryKey> {
    let mut keys = vec![QueryKey::all(Resource::Doctor)];
    match doctor_id {
        Some(id) => keys.push(QueryKey::detail(Resource::Doctor, id)),
        None => keys.push(QueryKey::named(Resource::Doctor.detail_key())),
    }
    keys.push(QueryKey::all_related(Relation::DoctorClinics));
    keys.push(QueryKey::all(Resource::DoctorClinic));
    keys.push(QueryKey::all(Resource::Clinic));
    keys
}
