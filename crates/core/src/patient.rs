//! Patient records.
//!
//! A patient owns a denormalised list of appointment references. These copies are not linked
//! to the doctor-side schedule; cancelling a slot does not touch them and booking does not
//! create them.

use crate::constants::SCHEDULED_STATUS;
use crate::department::Department;
use chrono::{NaiveDate, NaiveTime};
use hospital_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// One entry of the patients file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: NonEmptyText,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// Free-form; stored exactly as supplied by the admin input file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    #[serde(default)]
    pub appointments: Vec<PatientAppointment>,

    /// Fields not modelled here, kept so a load/save cycle is lossless.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A patient's copy of an appointment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientAppointment {
    pub appointment_id: NonEmptyText,

    pub department: Department,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<NonEmptyText>,

    pub date: NaiveDate,

    #[serde(with = "crate::time_format")]
    pub time: NaiveTime,

    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Patient {
    /// Position of the first appointment with the given ID.
    pub fn appointment_position(&self, appointment_id: &str) -> Option<usize> {
        self.appointments
            .iter()
            .position(|a| a.appointment_id == appointment_id)
    }

    /// Display name, falling back to an empty string for records without one.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl PatientAppointment {
    /// A scheduled appointment whose date lies strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == SCHEDULED_STATUS && self.date < today
    }
}

/// First patient with the given ID.
pub fn find_patient<'a>(patients: &'a [Patient], patient_id: &str) -> Option<&'a Patient> {
    patients.iter().find(|p| p.patient_id == patient_id)
}
