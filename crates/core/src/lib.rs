//! # Hospital Core
//!
//! Core business logic for the hospital appointment system.
//!
//! This crate contains pure data operations over two JSON collections:
//! - Patients and their appointment history (`patients.json`)
//! - Doctors and their per-day booking schedules (`doctors.json`)
//! - Slot allocation for new bookings
//! - Admin maintenance of both collections
//!
//! **No CLI concerns**: argument parsing, logging setup and output formatting belong in
//! `hospital-cli`.

pub mod allocator;
pub mod config;
pub mod constants;
pub mod department;
pub mod doctor;
pub mod error;
pub mod patient;
pub mod repositories;
pub mod store;
pub mod time_format;

pub use allocator::Booking;
pub use config::CoreConfig;
pub use department::Department;
pub use doctor::{Doctor, ScheduleDay, Slot};
pub use error::{HospitalError, HospitalResult};
pub use patient::{Patient, PatientAppointment};
pub use repositories::admin::{AdminAccess, AdminService, RecordKind};
pub use repositories::appointments::{
    AppointmentService, CancelledAppointment, OverdueAppointment, Rescheduled,
};
pub use repositories::schedule::{DisplayReport, DisplayTarget, DoctorSchedule, ScheduleService};

pub use hospital_types::NonEmptyText;
