use crate::department::Department;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HospitalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] hospital_types::TextError),

    #[error("file not found or not readable: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}", path = path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize records: {0}")]
    Serialization(serde_json::Error),
    #[error("{path} does not match the expected schema at {at}: {source}", path = path.display())]
    Deserialization {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("patient ID not found: {0}")]
    PatientNotFound(String),
    #[error("appointment ID not found: {0}")]
    AppointmentNotFound(String),
    #[error("doctor ID not found: {0}")]
    DoctorNotFound(String),
    #[error("ID not found: {0}")]
    RecordNotFound(String),
    #[error("duplicate ID: {0}")]
    DuplicateId(String),

    #[error("no available doctors in department {0}")]
    NoDoctorInDepartment(Department),
    #[error("no available slots in department {department} on {date}")]
    NoAvailableSlots {
        department: Department,
        date: NaiveDate,
    },
    #[error("no doctor in department {0} has a day with free slots")]
    NoDayWithCapacity(Department),
    #[error("failed to allocate a unique appointment ID after {0} attempts")]
    AppointmentIdExhausted(usize),

    #[error("unauthorized access: this command is available only to administrators")]
    Unauthorized,
}

pub type HospitalResult<T> = std::result::Result<T, HospitalError>;
