//! Doctor records and their per-day schedules.

use crate::constants::MAX_APPOINTMENTS_PER_DAY;
use crate::department::Department;
use chrono::{NaiveDate, NaiveTime};
use hospital_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// One entry of the doctors file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub doctor_id: NonEmptyText,

    pub department: Department,

    #[serde(default)]
    pub schedule: Vec<ScheduleDay>,

    /// Fields not modelled here, kept so a load/save cycle is lossless.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A doctor's bookings on one calendar date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,

    #[serde(default)]
    pub appointments: Vec<Slot>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single booked appointment within a day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub appointment_id: NonEmptyText,

    pub patient_id: NonEmptyText,

    #[serde(with = "crate::time_format")]
    pub time: NaiveTime,

    /// Anything else recorded on the slot, e.g. notes carried over by a reschedule.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Doctor {
    /// The schedule entry for `date`, if the doctor has one.
    pub fn day(&self, date: NaiveDate) -> Option<&ScheduleDay> {
        self.schedule.iter().find(|d| d.date == date)
    }

    pub fn day_position(&self, date: NaiveDate) -> Option<usize> {
        self.schedule.iter().position(|d| d.date == date)
    }

    /// Whether any day of this doctor's schedule holds the appointment.
    pub fn holds_appointment(&self, appointment_id: &str) -> bool {
        self.schedule
            .iter()
            .any(|d| d.slot_position(appointment_id).is_some())
    }
}

impl ScheduleDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            appointments: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Whether the day has reached [`MAX_APPOINTMENTS_PER_DAY`].
    pub fn is_full(&self) -> bool {
        self.appointments.len() >= MAX_APPOINTMENTS_PER_DAY
    }

    pub fn slot_position(&self, appointment_id: &str) -> Option<usize> {
        self.appointments
            .iter()
            .position(|s| s.appointment_id == appointment_id)
    }
}

/// First doctor with the given ID.
pub fn find_doctor<'a>(doctors: &'a [Doctor], doctor_id: &str) -> Option<&'a Doctor> {
    doctors.iter().find(|d| d.doctor_id == doctor_id)
}
