//! Entity type definitions
//!
//! Records mirror what the backend returns; the client never derives state
//! from them. Every request body is a typed `*Request` whose unset fields
//! are left out of the payload.

pub mod appointment;
pub mod clinic;
pub mod company;
pub mod doctor;
pub mod lab_test;
pub mod patient;
pub mod prescription;
pub mod role;
pub mod schedule;
pub mod specialty;
pub mod user;
pub mod visit;

pub use appointment::{Appointment, AppointmentStatus, AvailableSlot};
pub use clinic::Clinic;
pub use company::Company;
pub use doctor::{Doctor, DoctorClinic};
pub use lab_test::{LabTest, LabTestStatus};
pub use patient::{Patient, PatientDocument, PatientProfile};
pub use prescription::Prescription;
pub use role::{Permission, Role};
pub use schedule::{DayOfWeek, DoctorSchedule};
pub use specialty::Specialty;
pub use user::User;
pub use visit::{Visit, VisitStatus};

/// Lenient deserializers for loosely typed backend fields
///
/// Laravel serializes decimal columns as strings (`"150.00"`) and boolean
/// columns as `0`/`1` unless cast; both shapes are accepted.
pub(crate) mod de {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberLike {
        Float(f64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    pub fn default_true() -> bool {
        true
    }

    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberLike>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberLike::Float(n)) => Ok(Some(n)),
            Some(NumberLike::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberLike::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }

    pub fn bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_bool(deserializer)?.unwrap_or(false))
    }

    pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<BoolLike>::deserialize(deserializer)? {
            None => Ok(None),
            Some(BoolLike::Bool(b)) => Ok(Some(b)),
            Some(BoolLike::Int(n)) => Ok(Some(n != 0)),
            Some(BoolLike::Text(s)) => match s.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(Some(true)),
                "0" | "false" | "no" | "" => Ok(Some(false)),
                other => Err(serde::de::Error::custom(format!(
                    "invalid boolean: {}",
                    other
                ))),
            },
        }
    }

    /// Accepts `YYYY-MM-DD` or a full timestamp, keeping the date part
    pub fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_date(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s)))
    }

    pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_date(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
        }
    }

    /// Accepts RFC 3339 or `YYYY-MM-DD HH:MM:SS` (read as UTC)
    pub fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .map(|naive| Some(naive.and_utc()))
            .map_err(serde::de::Error::custom)
    }

    fn parse_date(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        let head = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::de::opt_f64")]
        fee: Option<f64>,
        #[serde(default, deserialize_with = "super::de::bool")]
        active: bool,
    }

    #[test]
    fn test_decimal_strings() {
        let p: Probe = serde_json::from_str(r#"{"fee": "150.00", "active": 1}"#).unwrap();
        assert_eq!(p.fee, Some(150.0));
        assert!(p.active);

        let p: Probe = serde_json::from_str(r#"{"fee": 75.5, "active": "0"}"#).unwrap();
        assert_eq!(p.fee, Some(75.5));
        assert!(!p.active);
    }

    #[test]
    fn test_missing_and_null() {
        let p: Probe = serde_json::from_str(r#"{"fee": null}"#).unwrap();
        assert_eq!(p.fee, None);
        assert!(!p.active);
    }

    #[derive(Deserialize)]
    struct Dates {
        #[serde(default, deserialize_with = "super::de::opt_date")]
        born: Option<chrono::NaiveDate>,
        #[serde(default, deserialize_with = "super::de::opt_datetime")]
        at: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[test]
    fn test_dates_in_either_shape() {
        let d: Dates = serde_json::from_str(
            r#"{"born": "1990-04-12T00:00:00.000000Z", "at": "2024-01-15 10:30:00"}"#,
        )
        .unwrap();
        assert_eq!(d.born, chrono::NaiveDate::from_ymd_opt(1990, 4, 12));
        assert_eq!(d.at.unwrap().to_rfc3339(), "2024-01-15T10:30:00+00:00");

        let d: Dates = serde_json::from_str(r#"{"born": null}"#).unwrap();
        assert!(d.born.is_none());
        assert!(d.at.is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"fee": "lots"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"active": "maybe"}"#).is_err());
    }
}
