//! Doctor schedule entity - weekly recurring hours per doctor-clinic pair

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::cache::Filters;
use crate::core::entity::{Record, Resource};
use crate::entities::doctor::DoctorClinic;

/// Day of the week, numbered from Sunday = 0 as the backend stores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(n as usize).copied()
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if let Ok(n) = s.parse::<u8>() {
            return Self::from_number(n).ok_or_else(|| format!("Day number out of range: {}", n));
        }
        Self::ALL
            .into_iter()
            .find(|d| {
                let name = d.to_string();
                name == s || (s.len() >= 3 && name.starts_with(&s))
            })
            .ok_or_else(|| format!("Unknown day: {}", s))
    }
}

impl Serialize for DayOfWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::from_number(n)
                .ok_or_else(|| serde::de::Error::custom(format!("day out of range: {}", n))),
            Raw::Name(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub id: u64,

    pub doctor_clinic_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_clinic: Option<DoctorClinic>,

    pub day_of_week: DayOfWeek,

    /// Backend time string (`HH:MM` or `HH:MM:SS`)
    pub start_time: String,

    pub end_time: String,

    /// Minutes per bookable slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_duration: Option<u32>,

    #[serde(
        default = "crate::entities::de::default_true",
        deserialize_with = "crate::entities::de::bool"
    )]
    pub is_active: bool,
}

impl Record for DoctorSchedule {
    const RESOURCE: Resource = Resource::DoctorSchedule;

    fn id(&self) -> u64 {
        self.id
    }

    fn label(&self) -> String {
        format!("{} {}-{}", self.day_of_week, self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_clinic_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_duration: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleFilters {
    pub doctor_id: Option<u64>,
    pub clinic_id: Option<u64>,
    pub doctor_clinic_id: Option<u64>,
    pub day_of_week: Option<DayOfWeek>,
}

impl ScheduleFilters {
    pub fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("doctor_id", self.doctor_id)
            .with_opt("clinic_id", self.clinic_id)
            .with_opt("doctor_clinic_id", self.doctor_clinic_id)
            .with_opt("day_of_week", self.day_of_week.map(|d| d.number()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parsing() {
        assert_eq!("monday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!("Wed".parse::<DayOfWeek>().unwrap(), DayOfWeek::Wednesday);
        assert_eq!("0".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert!("7".parse::<DayOfWeek>().is_err());
        assert!("mo".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn test_schedule_day_as_number_or_name() {
        let by_number: DoctorSchedule = serde_json::from_str(
            r#"{"id": 1, "doctor_clinic_id": 2, "day_of_week": 1,
                "start_time": "09:00", "end_time": "13:00", "slot_duration": 15}"#,
        )
        .unwrap();
        let by_name: DoctorSchedule = serde_json::from_str(
            r#"{"id": 1, "doctor_clinic_id": 2, "day_of_week": "monday",
                "start_time": "09:00", "end_time": "13:00", "slot_duration": 15}"#,
        )
        .unwrap();
        assert_eq!(by_number, by_name);
        assert_eq!(by_number.label(), "monday 09:00-13:00");
    }

    #[test]
    fn test_request_sends_day_number() {
        let req = ScheduleRequest {
            day_of_week: Some(DayOfWeek::Friday),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"day_of_week":5}"#);
    }
}
