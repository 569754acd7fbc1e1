//! Administrative record maintenance.
//!
//! Adding, replacing and removing whole doctor or patient records. Every operation here needs
//! an [`AdminAccess`], which can only be obtained from an explicit admin flag, so the check
//! happens before any file is touched.

use crate::doctor::Doctor;
use crate::error::{HospitalError, HospitalResult};
use crate::patient::Patient;
use crate::store::{decode_value, ensure_readable, load_collection, load_document, save_collection};
use hospital_types::NonEmptyText;
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

/// Proof that the caller asked for administrator access.
#[derive(Clone, Copy, Debug)]
pub struct AdminAccess {
    _private: (),
}

impl AdminAccess {
    /// Grants access when `admin_flag` is set.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::Unauthorized`] when the flag is absent.
    pub fn from_flag(admin_flag: bool) -> HospitalResult<Self> {
        if !admin_flag {
            tracing::warn!("administrator command attempted without --admin");
            return Err(HospitalError::Unauthorized);
        }
        Ok(Self { _private: () })
    }
}

/// Which collection a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Doctor,
    Patient,
}

impl FromStr for RecordKind {
    type Err = HospitalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DOCTOR" => Ok(RecordKind::Doctor),
            "PATIENT" => Ok(RecordKind::Patient),
            _ => Err(HospitalError::InvalidInput(format!(
                "invalid record type '{s}', use DOCTOR or PATIENT"
            ))),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Doctor => f.write_str("Doctor"),
            RecordKind::Patient => f.write_str("Patient"),
        }
    }
}

/// Service for whole-record administration of both collections.
#[derive(Clone, Debug, Default)]
pub struct AdminService;

impl AdminService {
    pub fn new() -> Self {
        Self
    }

    /// Appends every record in `input_file` (a JSON array) to the collection of `kind`.
    ///
    /// # Returns
    ///
    /// The number of records added.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError` if:
    /// - either data file or the input file is missing or malformed,
    /// - an input record reuses an ID already in the collection or earlier in the input
    ///   ([`HospitalError::DuplicateId`]); nothing is written in that case.
    pub fn add(
        &self,
        _access: &AdminAccess,
        patients_file: &Path,
        doctors_file: &Path,
        kind: RecordKind,
        input_file: &Path,
    ) -> HospitalResult<usize> {
        ensure_readable(patients_file)?;
        ensure_readable(doctors_file)?;

        let added = match kind {
            RecordKind::Doctor => {
                let new: Vec<Doctor> = load_collection(input_file)?;
                let added = new.len();
                let mut doctors: Vec<Doctor> = load_collection(doctors_file)?;
                append_unique(&mut doctors, new, |d| &d.doctor_id)?;
                save_collection(doctors_file, &doctors)?;
                added
            }
            RecordKind::Patient => {
                let new: Vec<Patient> = load_collection(input_file)?;
                let added = new.len();
                let mut patients: Vec<Patient> = load_collection(patients_file)?;
                append_unique(&mut patients, new, |p| &p.patient_id)?;
                save_collection(patients_file, &patients)?;
                added
            }
        };

        tracing::info!("added {} records from {}", added, input_file.display());
        Ok(added)
    }

    /// Replaces the record with ID `id` by the single JSON object in `input_file`.
    ///
    /// Doctors are searched first, then patients; the first match is replaced and the
    /// replacement is parsed as a record of that collection.
    ///
    /// # Returns
    ///
    /// The collection the replaced record belonged to.
    ///
    /// # Errors
    ///
    /// Returns `HospitalError` if:
    /// - no doctor or patient has the ID ([`HospitalError::RecordNotFound`]),
    /// - the replacement does not parse as a record of the matched collection,
    /// - the replacement's ID belongs to a different existing record ([`HospitalError::DuplicateId`]).
    pub fn modify(
        &self,
        _access: &AdminAccess,
        patients_file: &Path,
        doctors_file: &Path,
        id: &str,
        input_file: &Path,
    ) -> HospitalResult<RecordKind> {
        ensure_readable(patients_file)?;
        ensure_readable(doctors_file)?;
        let replacement: serde_json::Value = load_document(input_file)?;

        let mut doctors: Vec<Doctor> = load_collection(doctors_file)?;
        if let Some(index) = doctors.iter().position(|d| d.doctor_id == id) {
            let doctor: Doctor = decode_value(input_file, replacement)?;
            replace_at(&mut doctors, index, doctor, |d| &d.doctor_id)?;
            save_collection(doctors_file, &doctors)?;
            tracing::info!("modified doctor {}", id);
            return Ok(RecordKind::Doctor);
        }

        let mut patients: Vec<Patient> = load_collection(patients_file)?;
        if let Some(index) = patients.iter().position(|p| p.patient_id == id) {
            let patient: Patient = decode_value(input_file, replacement)?;
            replace_at(&mut patients, index, patient, |p| &p.patient_id)?;
            save_collection(patients_file, &patients)?;
            tracing::info!("modified patient {}", id);
            return Ok(RecordKind::Patient);
        }

        Err(HospitalError::RecordNotFound(id.to_string()))
    }

    /// Removes the record with ID `id`, searching doctors first, then patients.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::RecordNotFound`] if neither collection holds the ID.
    pub fn delete(
        &self,
        _access: &AdminAccess,
        patients_file: &Path,
        doctors_file: &Path,
        id: &str,
    ) -> HospitalResult<RecordKind> {
        ensure_readable(patients_file)?;
        ensure_readable(doctors_file)?;

        let mut doctors: Vec<Doctor> = load_collection(doctors_file)?;
        if let Some(index) = doctors.iter().position(|d| d.doctor_id == id) {
            doctors.remove(index);
            save_collection(doctors_file, &doctors)?;
            tracing::info!("deleted doctor {}", id);
            return Ok(RecordKind::Doctor);
        }

        let mut patients: Vec<Patient> = load_collection(patients_file)?;
        if let Some(index) = patients.iter().position(|p| p.patient_id == id) {
            patients.remove(index);
            save_collection(patients_file, &patients)?;
            tracing::info!("deleted patient {}", id);
            return Ok(RecordKind::Patient);
        }

        Err(HospitalError::RecordNotFound(id.to_string()))
    }
}

fn append_unique<T>(
    existing: &mut Vec<T>,
    new: Vec<T>,
    id_of: impl Fn(&T) -> &NonEmptyText,
) -> HospitalResult<()> {
    let mut seen: HashSet<String> = existing.iter().map(|r| id_of(r).to_string()).collect();
    for record in &new {
        let id = id_of(record).as_str();
        if !seen.insert(id.to_string()) {
            return Err(HospitalError::DuplicateId(id.to_string()));
        }
    }

    existing.extend(new);
    Ok(())
}

fn replace_at<T>(
    records: &mut [T],
    index: usize,
    replacement: T,
    id_of: impl Fn(&T) -> &NonEmptyText,
) -> HospitalResult<()> {
    let new_id = id_of(&replacement);
    let collides = records
        .iter()
        .enumerate()
        .any(|(i, r)| i != index && id_of(r) == new_id);
    if collides {
        return Err(HospitalError::DuplicateId(new_id.to_string()));
    }

    records[index] = replacement;
    Ok(())
}
