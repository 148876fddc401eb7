//! Resource catalogue - the entity collections exposed by the platform API

use serde::{de::DeserializeOwned, Serialize};

/// Which envelope family an endpoint answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    /// Account endpoints (`/users`, `/roles`): Laravel resource collections
    Accounts,
    /// Healthcare endpoints (`/healthcare/*`): `{success, data, meta}`
    Healthcare,
}

/// An entity collection on the backend
///
/// Each resource owns two cache key names: the collection key used for
/// paginated list queries and the detail key used for single-record reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    User,
    Role,
    Permission,
    Company,
    Specialty,
    Clinic,
    Doctor,
    DoctorClinic,
    DoctorSchedule,
    Patient,
    PatientProfile,
    PatientDocument,
    Appointment,
    Visit,
    Prescription,
    LabTest,
}

impl Resource {
    pub const ALL: [Resource; 16] = [
        Resource::User,
        Resource::Role,
        Resource::Permission,
        Resource::Company,
        Resource::Specialty,
        Resource::Clinic,
        Resource::Doctor,
        Resource::DoctorClinic,
        Resource::DoctorSchedule,
        Resource::Patient,
        Resource::PatientProfile,
        Resource::PatientDocument,
        Resource::Appointment,
        Resource::Visit,
        Resource::Prescription,
        Resource::LabTest,
    ];

    /// Cache key name for list queries
    pub fn list_key(&self) -> &'static str {
        match self {
            Resource::User => "users",
            Resource::Role => "roles",
            Resource::Permission => "permissions",
            Resource::Company => "companies",
            Resource::Specialty => "specialties",
            Resource::Clinic => "clinics",
            Resource::Doctor => "doctors",
            Resource::DoctorClinic => "all-doctor-clinics",
            Resource::DoctorSchedule => "doctor-schedules",
            Resource::Patient => "patients",
            Resource::PatientProfile => "patient-profiles",
            Resource::PatientDocument => "patient-documents",
            Resource::Appointment => "appointments",
            Resource::Visit => "visits",
            Resource::Prescription => "prescriptions",
            Resource::LabTest => "lab-tests",
        }
    }

    /// Cache key name for detail queries
    pub fn detail_key(&self) -> &'static str {
        match self {
            Resource::User => "user",
            Resource::Role => "role",
            Resource::Permission => "permission",
            Resource::Company => "company",
            Resource::Specialty => "specialty",
            Resource::Clinic => "clinic",
            Resource::Doctor => "doctor",
            Resource::DoctorClinic => "doctor-clinic",
            Resource::DoctorSchedule => "doctor-schedule",
            Resource::Patient => "patient",
            Resource::PatientProfile => "patient-profile",
            Resource::PatientDocument => "patient-document",
            Resource::Appointment => "appointment",
            Resource::Visit => "visit",
            Resource::Prescription => "prescription",
            Resource::LabTest => "lab-test",
        }
    }

    /// Collection path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Resource::User => "/users",
            Resource::Role => "/roles",
            Resource::Permission => "/permissions",
            Resource::Company => "/healthcare/companies",
            Resource::Specialty => "/healthcare/specialties",
            Resource::Clinic => "/healthcare/clinics",
            Resource::Doctor => "/healthcare/doctors",
            Resource::DoctorClinic => "/healthcare/doctor-clinics",
            Resource::DoctorSchedule => "/healthcare/doctor-schedules",
            Resource::Patient => "/healthcare/patients",
            Resource::PatientProfile => "/healthcare/patient-profiles",
            Resource::PatientDocument => "/healthcare/patient-documents",
            Resource::Appointment => "/healthcare/appointments",
            Resource::Visit => "/healthcare/visits",
            Resource::Prescription => "/healthcare/prescriptions",
            Resource::LabTest => "/healthcare/lab-tests",
        }
    }

    /// Path of a single record
    pub fn item_path(&self, id: u64) -> String {
        format!("{}/{}", self.path(), id)
    }

    pub fn family(&self) -> ApiFamily {
        match self {
            Resource::User | Resource::Role | Resource::Permission => ApiFamily::Accounts,
            _ => ApiFamily::Healthcare,
        }
    }

    /// Singular human name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Resource::User => "user",
            Resource::Role => "role",
            Resource::Permission => "permission",
            Resource::Company => "company",
            Resource::Specialty => "specialty",
            Resource::Clinic => "clinic",
            Resource::Doctor => "doctor",
            Resource::DoctorClinic => "clinic assignment",
            Resource::DoctorSchedule => "schedule",
            Resource::Patient => "patient",
            Resource::PatientProfile => "patient profile",
            Resource::PatientDocument => "document",
            Resource::Appointment => "appointment",
            Resource::Visit => "visit",
            Resource::Prescription => "prescription",
            Resource::LabTest => "lab test",
        }
    }

    /// Plural human name for messages
    pub fn name_plural(&self) -> &'static str {
        match self {
            Resource::Company => "companies",
            Resource::Specialty => "specialties",
            Resource::DoctorClinic => "clinic assignments",
            Resource::DoctorSchedule => "schedules",
            Resource::PatientProfile => "patient profiles",
            Resource::PatientDocument => "documents",
            Resource::LabTest => "lab tests",
            other => other.list_key(),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.list_key())
    }
}

impl std::str::FromStr for Resource {
    type Err = String;

    /// Accepts either the list or the detail key name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.list_key() == s || r.detail_key() == s)
            .ok_or_else(|| format!("Unknown resource: {}", s))
    }
}

/// Queries scoped under a parent record
///
/// These hold denormalized views of a child collection (e.g. the
/// prescriptions of one visit) and are cached independently of the
/// child's own list key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    PatientAppointments,
    PatientVisits,
    PatientPrescriptions,
    VisitPrescriptions,
    VisitLabTests,
    DoctorClinics,
    AvailableSlots,
}

impl Relation {
    pub fn key(&self) -> &'static str {
        match self {
            Relation::PatientAppointments => "patient-appointments",
            Relation::PatientVisits => "patient-visits",
            Relation::PatientPrescriptions => "patient-prescriptions",
            Relation::VisitPrescriptions => "visit-prescriptions",
            Relation::VisitLabTests => "visit-lab-tests",
            Relation::DoctorClinics => "doctor-clinics",
            Relation::AvailableSlots => "available-slots",
        }
    }

    /// Endpoint path for the given parent record
    pub fn path(&self, parent_id: u64) -> String {
        match self {
            Relation::PatientAppointments => {
                format!("{}/appointments", Resource::Patient.item_path(parent_id))
            }
            Relation::PatientVisits => format!("{}/visits", Resource::Patient.item_path(parent_id)),
            Relation::PatientPrescriptions => {
                format!("{}/prescriptions", Resource::Patient.item_path(parent_id))
            }
            Relation::VisitPrescriptions => {
                format!("{}/prescriptions", Resource::Visit.item_path(parent_id))
            }
            Relation::VisitLabTests => format!("{}/lab-tests", Resource::Visit.item_path(parent_id)),
            Relation::DoctorClinics => format!("{}/clinics", Resource::Doctor.item_path(parent_id)),
            Relation::AvailableSlots => {
                format!("{}/available-slots", Resource::Doctor.item_path(parent_id))
            }
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Common trait for all records mirrored from the backend
pub trait Record: Serialize + DeserializeOwned {
    /// The collection this record belongs to
    const RESOURCE: Resource;

    /// Server-assigned identifier
    fn id(&self) -> u64;

    /// Short human label (name, title, or a composed description)
    fn label(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_keys_are_unique() {
        let mut keys: Vec<&str> = Resource::ALL
            .iter()
            .flat_map(|r| [r.list_key(), r.detail_key()])
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn test_resource_from_str() {
        assert_eq!("clinics".parse::<Resource>().unwrap(), Resource::Clinic);
        assert_eq!("lab-test".parse::<Resource>().unwrap(), Resource::LabTest);
        assert!("wards".parse::<Resource>().is_err());
    }

    #[test]
    fn test_families() {
        assert_eq!(Resource::User.family(), ApiFamily::Accounts);
        assert_eq!(Resource::Role.family(), ApiFamily::Accounts);
        assert_eq!(Resource::Visit.family(), ApiFamily::Healthcare);
    }

    #[test]
    fn test_relation_paths() {
        assert_eq!(
            Relation::VisitPrescriptions.path(7),
            "/healthcare/visits/7/prescriptions"
        );
        assert_eq!(
            Relation::PatientAppointments.path(3),
            "/healthcare/patients/3/appointments"
        );
        assert_eq!(Relation::DoctorClinics.path(2), "/healthcare/doctors/2/clinics");
    }
}
