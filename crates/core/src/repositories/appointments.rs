//! Appointment booking, cancellation, rescheduling and patient-side reports.

use crate::allocator::{allocate, new_appointment_id, Booking};
use crate::config::CoreConfig;
use crate::department::Department;
use crate::doctor::{Doctor, Slot};
use crate::error::{HospitalError, HospitalResult};
use crate::patient::{find_patient, Patient, PatientAppointment};
use crate::repositories::admin::AdminAccess;
use crate::store::{ensure_readable, load_collection, save_collection};
use chrono::{NaiveDate, NaiveTime};
use hospital_types::NonEmptyText;
use std::path::Path;
use std::sync::Arc;

/// A slot removed by [`AppointmentService::cancel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CancelledAppointment {
    pub doctor_id: NonEmptyText,
    pub date: NaiveDate,
    pub slot: Slot,
}

/// Where [`AppointmentService::reschedule`] placed an appointment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rescheduled {
    pub appointment_id: NonEmptyText,
    pub doctor_id: NonEmptyText,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// One line of the overdue report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverdueAppointment {
    pub patient_id: NonEmptyText,
    pub patient_name: String,
    pub appointment_id: NonEmptyText,
    pub date: NaiveDate,
}

/// Service for appointment operations across the patient and doctor collections.
#[derive(Clone, Debug)]
pub struct AppointmentService {
    cfg: Arc<CoreConfig>,
}

impl AppointmentService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Books the next free slot in `department` for `patient_id`.
    ///
    /// The patient must exist in `patients_file`; the booking is written to `doctors_file`
    /// only. See [`crate::allocator`] for how the doctor, date and time are chosen.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError` if:
    /// - either file is missing or malformed,
    /// - the patient does not exist ([`HospitalError::PatientNotFound`]),
    /// - allocation fails (no doctor in the department, or the day is full).
    pub fn book(
        &self,
        patients_file: &Path,
        doctors_file: &Path,
        patient_id: &str,
        department: &Department,
    ) -> HospitalResult<Booking> {
        ensure_readable(doctors_file)?;

        let patients: Vec<Patient> = load_collection(patients_file)?;
        let patient = find_patient(&patients, patient_id)
            .ok_or_else(|| HospitalError::PatientNotFound(patient_id.to_string()))?;

        let mut doctors: Vec<Doctor> = load_collection(doctors_file)?;
        let booking = allocate(
            &mut doctors,
            department,
            &patient.patient_id,
            self.cfg.today(),
            new_appointment_id,
        )?;
        save_collection(doctors_file, &doctors)?;

        tracing::info!(
            "booked {} for patient {} with doctor {} on {} at {}",
            booking.appointment_id,
            patient_id,
            booking.doctor_id,
            booking.date,
            booking.time.format("%H:%M")
        );
        Ok(booking)
    }

    /// Removes the first slot with `appointment_id`, scanning doctors, then days, then slots
    /// in file order.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::AppointmentNotFound`] if no doctor holds the appointment.
    pub fn cancel(
        &self,
        doctors_file: &Path,
        appointment_id: &str,
    ) -> HospitalResult<CancelledAppointment> {
        let mut doctors: Vec<Doctor> = load_collection(doctors_file)?;
        let cancelled = remove_slot(&mut doctors, appointment_id)
            .ok_or_else(|| HospitalError::AppointmentNotFound(appointment_id.to_string()))?;
        save_collection(doctors_file, &doctors)?;

        tracing::info!(
            "cancelled {} with doctor {} on {}",
            appointment_id,
            cancelled.doctor_id,
            cancelled.date
        );
        Ok(cancelled)
    }

    /// Moves a patient's appointment into a doctor day of `department`.
    ///
    /// The appointment is removed from the patient's list and appended, with its recorded
    /// time, to the first day with free capacity of the first matching doctor that has one.
    /// No new day is created and no slot time is computed.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError` if:
    /// - the patient or appointment does not exist,
    /// - no doctor works in the department ([`HospitalError::NoDoctorInDepartment`]),
    /// - no matching doctor has an existing day below capacity
    ///   ([`HospitalError::NoDayWithCapacity`]).
    ///
    /// Nothing is written on error.
    pub fn reschedule(
        &self,
        patients_file: &Path,
        doctors_file: &Path,
        patient_id: &str,
        appointment_id: &str,
        department: &Department,
    ) -> HospitalResult<Rescheduled> {
        let mut patients: Vec<Patient> = load_collection(patients_file)?;
        let mut doctors: Vec<Doctor> = load_collection(doctors_file)?;

        let patient_index = patients
            .iter()
            .position(|p| p.patient_id == patient_id)
            .ok_or_else(|| HospitalError::PatientNotFound(patient_id.to_string()))?;
        let appointment_index = patients[patient_index]
            .appointment_position(appointment_id)
            .ok_or_else(|| HospitalError::AppointmentNotFound(appointment_id.to_string()))?;

        let (doctor_index, day_index) = day_with_capacity(&doctors, department)?;

        let patient = &mut patients[patient_index];
        let appointment = patient.appointments.remove(appointment_index);
        let doctor = &mut doctors[doctor_index];
        let day = &mut doctor.schedule[day_index];
        day.appointments.push(Slot {
            appointment_id: appointment.appointment_id.clone(),
            patient_id: patient.patient_id.clone(),
            time: appointment.time,
            extra: carried_fields(&appointment),
        });

        let rescheduled = Rescheduled {
            appointment_id: appointment.appointment_id,
            doctor_id: doctor.doctor_id.clone(),
            date: day.date,
            time: appointment.time,
        };

        // Doctors first: a failed second write must never lose the appointment.
        save_collection(doctors_file, &doctors)?;
        save_collection(patients_file, &patients)?;

        tracing::info!(
            "rescheduled {} to doctor {} on {}",
            rescheduled.appointment_id,
            rescheduled.doctor_id,
            rescheduled.date
        );
        Ok(rescheduled)
    }

    /// The appointments recorded on the patient's own record.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::PatientNotFound`] if the patient does not exist.
    pub fn search(
        &self,
        patients_file: &Path,
        patient_id: &str,
    ) -> HospitalResult<Vec<PatientAppointment>> {
        let patients: Vec<Patient> = load_collection(patients_file)?;
        let patient = find_patient(&patients, patient_id)
            .ok_or_else(|| HospitalError::PatientNotFound(patient_id.to_string()))?;
        Ok(patient.appointments.clone())
    }

    /// Every `Scheduled` appointment dated before today, in patient then appointment order.
    pub fn overdue(
        &self,
        _access: &AdminAccess,
        patients_file: &Path,
    ) -> HospitalResult<Vec<OverdueAppointment>> {
        let today = self.cfg.today();
        let patients: Vec<Patient> = load_collection(patients_file)?;

        let overdue: Vec<OverdueAppointment> = patients
            .iter()
            .flat_map(|patient| {
                patient
                    .appointments
                    .iter()
                    .filter(move |a| a.is_overdue(today))
                    .map(move |a| OverdueAppointment {
                        patient_id: patient.patient_id.clone(),
                        patient_name: patient.display_name().to_string(),
                        appointment_id: a.appointment_id.clone(),
                        date: a.date,
                    })
            })
            .collect();

        tracing::debug!("{} overdue appointments before {}", overdue.len(), today);
        Ok(overdue)
    }
}

/// The patient-side fields a slot does not model, so a moved appointment keeps them.
fn carried_fields(appointment: &PatientAppointment) -> serde_json::Map<String, serde_json::Value> {
    let mut extra = appointment.extra.clone();
    extra.insert("status".into(), appointment.status.clone().into());
    if let Some(notes) = &appointment.notes {
        extra.insert("notes".into(), notes.clone().into());
    }
    extra
}

fn remove_slot(doctors: &mut [Doctor], appointment_id: &str) -> Option<CancelledAppointment> {
    for doctor in doctors.iter_mut() {
        for day in doctor.schedule.iter_mut() {
            if let Some(index) = day.slot_position(appointment_id) {
                let slot = day.appointments.remove(index);
                return Some(CancelledAppointment {
                    doctor_id: doctor.doctor_id.clone(),
                    date: day.date,
                    slot,
                });
            }
        }
    }
    None
}

fn day_with_capacity(
    doctors: &[Doctor],
    department: &Department,
) -> HospitalResult<(usize, usize)> {
    let mut any_doctor = false;
    for (doctor_index, doctor) in doctors.iter().enumerate() {
        if !doctor.department.matches(department) {
            continue;
        }
        any_doctor = true;
        if let Some(day_index) = doctor.schedule.iter().position(|d| !d.is_full()) {
            return Ok((doctor_index, day_index));
        }
    }

    if any_doctor {
        Err(HospitalError::NoDayWithCapacity(department.clone()))
    } else {
        Err(HospitalError::NoDoctorInDepartment(department.clone()))
    }
}
