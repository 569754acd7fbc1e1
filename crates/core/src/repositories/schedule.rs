//! Read-only schedule reports over the doctor collection.

use crate::department::Department;
use crate::doctor::{find_doctor, Doctor, ScheduleDay, Slot};
use crate::error::{HospitalError, HospitalResult};
use crate::store::load_collection;
use chrono::NaiveDate;
use hospital_types::NonEmptyText;
use std::path::Path;
use std::str::FromStr;

/// What the `display` report covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayTarget {
    All,
    /// One of the known departments.
    Department(Department),
    Doctor(NonEmptyText),
}

impl FromStr for DisplayTarget {
    type Err = HospitalError;

    /// Accepts `ALL`, `GENERAL`, `PEDIATRICS`, `SURGERY` or `DOCTOR <id>`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || {
            HospitalError::InvalidInput(format!(
                "invalid display target '{s}', use ALL, GENERAL, PEDIATRICS, SURGERY or 'DOCTOR <id>'"
            ))
        };

        if s.eq_ignore_ascii_case("ALL") {
            return Ok(DisplayTarget::All);
        }

        let mut words = s.split_whitespace();
        if let (Some(first), Some(id), None) = (words.next(), words.next(), words.next()) {
            if first.eq_ignore_ascii_case("DOCTOR") {
                return Ok(DisplayTarget::Doctor(NonEmptyText::new(id)?));
            }
        }

        match s.parse::<Department>() {
            Ok(department) if department.is_known() => Ok(DisplayTarget::Department(department)),
            _ => Err(invalid()),
        }
    }
}

/// Result of the `display` report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayReport {
    /// Appointment counts for every matching doctor that has an entry on the date.
    Counts(Vec<(NonEmptyText, usize)>),
    /// The slots of one doctor on the date; empty if the doctor has no entry for it.
    Slots {
        doctor_id: NonEmptyText,
        slots: Vec<Slot>,
    },
}

/// A doctor's full schedule, as returned by `view_schedule`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DoctorSchedule {
    pub doctor_id: NonEmptyText,
    pub department: Department,
    pub schedule: Vec<ScheduleDay>,
}

/// Service for schedule reports.
#[derive(Clone, Debug, Default)]
pub struct ScheduleService;

impl ScheduleService {
    pub fn new() -> Self {
        Self
    }

    /// Reports bookings on `date` for the doctors selected by `target`.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError` if the doctors file cannot be loaded, or
    /// [`HospitalError::DoctorNotFound`] for a `DOCTOR <id>` target that does not exist.
    pub fn display(
        &self,
        doctors_file: &Path,
        target: &DisplayTarget,
        date: NaiveDate,
    ) -> HospitalResult<DisplayReport> {
        let doctors: Vec<Doctor> = load_collection(doctors_file)?;

        let report = match target {
            DisplayTarget::Doctor(doctor_id) => {
                let doctor = find_doctor(&doctors, doctor_id.as_str())
                    .ok_or_else(|| HospitalError::DoctorNotFound(doctor_id.to_string()))?;
                DisplayReport::Slots {
                    doctor_id: doctor.doctor_id.clone(),
                    slots: doctor
                        .day(date)
                        .map(|d| d.appointments.clone())
                        .unwrap_or_default(),
                }
            }
            DisplayTarget::All | DisplayTarget::Department(_) => {
                let counts = doctors
                    .iter()
                    .filter(|d| match target {
                        DisplayTarget::Department(department) => d.department.matches(department),
                        _ => true,
                    })
                    .filter_map(|d| {
                        d.day(date)
                            .map(|day| (d.doctor_id.clone(), day.appointments.len()))
                    })
                    .collect();
                DisplayReport::Counts(counts)
            }
        };

        Ok(report)
    }

    /// Full schedules of every doctor whose ID or department equals `target`,
    /// compared case-insensitively.
    pub fn view_schedule(
        &self,
        doctors_file: &Path,
        target: &str,
    ) -> HospitalResult<Vec<DoctorSchedule>> {
        let doctors: Vec<Doctor> = load_collection(doctors_file)?;
        let target = target.trim();

        let schedules: Vec<DoctorSchedule> = doctors
            .into_iter()
            .filter(|d| {
                d.doctor_id.eq_ignore_case(target)
                    || d.department.as_str().eq_ignore_ascii_case(target)
            })
            .map(|d| DoctorSchedule {
                doctor_id: d.doctor_id,
                department: d.department,
                schedule: d.schedule,
            })
            .collect();

        tracing::debug!("{} schedules match {}", schedules.len(), target);
        Ok(schedules)
    }
}
