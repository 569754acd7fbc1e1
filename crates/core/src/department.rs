//! Hospital departments.
//!
//! Three departments are known to the booking rules. Doctor files may carry other department
//! names; those are kept verbatim, matched case-insensitively like the known ones, and booked
//! with the default slot length.

use crate::constants::{DEFAULT_SLOT_MINUTES, PEDIATRICS_SLOT_MINUTES, SURGERY_SLOT_MINUTES};
use crate::error::HospitalError;
use chrono::Duration;
use hospital_types::NonEmptyText;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Department {
    General,
    Pediatrics,
    Surgery,
    /// Any department name not known to the booking rules.
    Other(NonEmptyText),
}

impl Department {
    /// Returns the canonical name of the department.
    ///
    /// Known departments are upper-case; other names are returned as stored.
    pub fn as_str(&self) -> &str {
        match self {
            Department::General => "GENERAL",
            Department::Pediatrics => "PEDIATRICS",
            Department::Surgery => "SURGERY",
            Department::Other(name) => name.as_str(),
        }
    }

    /// Case-insensitive department equality.
    pub fn matches(&self, other: &Department) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }

    /// Length of one appointment slot in this department.
    pub fn appointment_duration(&self) -> Duration {
        let minutes = match self {
            Department::Pediatrics => PEDIATRICS_SLOT_MINUTES,
            Department::Surgery => SURGERY_SLOT_MINUTES,
            Department::General | Department::Other(_) => DEFAULT_SLOT_MINUTES,
        };
        Duration::minutes(minutes)
    }

    /// Whether this is one of the departments known to the booking rules.
    pub fn is_known(&self) -> bool {
        !matches!(self, Department::Other(_))
    }
}

impl FromStr for Department {
    type Err = HospitalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = NonEmptyText::new(s)?;
        let department = match name.as_str().to_ascii_uppercase().as_str() {
            "GENERAL" => Department::General,
            "PEDIATRICS" => Department::Pediatrics,
            "SURGERY" => Department::Surgery,
            _ => Department::Other(name),
        };
        Ok(department)
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Department {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Department {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_departments_case_insensitively() {
        assert_eq!("general".parse::<Department>().unwrap(), Department::General);
        assert_eq!(
            "Pediatrics".parse::<Department>().unwrap(),
            Department::Pediatrics
        );
        assert_eq!(" SURGERY ".parse::<Department>().unwrap(), Department::Surgery);
    }

    #[test]
    fn keeps_unknown_department_names_verbatim() {
        let department: Department = "Cardiology".parse().unwrap();
        assert!(!department.is_known());
        assert_eq!(department.as_str(), "Cardiology");
        assert!(department.matches(&"CARDIOLOGY".parse().unwrap()));
        assert!(!department.matches(&Department::General));
    }

    #[test]
    fn rejects_blank_department() {
        let err = "  ".parse::<Department>().expect_err("blank should fail");
        assert!(matches!(err, HospitalError::Text(_)));
    }

    #[test]
    fn slot_lengths_follow_department() {
        assert_eq!(Department::Pediatrics.appointment_duration(), Duration::minutes(45));
        assert_eq!(Department::Surgery.appointment_duration(), Duration::minutes(60));
        assert_eq!(Department::General.appointment_duration(), Duration::minutes(30));
        let other: Department = "Radiology".parse().unwrap();
        assert_eq!(other.appointment_duration(), Duration::minutes(30));
    }

    #[test]
    fn serialises_canonical_names() {
        let parsed: Vec<Department> =
            serde_json::from_str(r#"["surgery", "Oncology"]"#).expect("should parse");
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"["SURGERY","Oncology"]"#
        );
    }
}
