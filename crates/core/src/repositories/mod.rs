//! Services over the patient and doctor collections.
//!
//! Every operation follows the same shape: load the collections it needs, validate and
//! compute everything in memory, then write each mutated collection back exactly once.
//! A failed operation never writes.

pub mod admin;
pub mod appointments;
pub mod schedule;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::config::CoreConfig;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// 2024-03-06, a Wednesday; bookings made "today" land on Thursday 2024-03-07.
    pub(crate) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
    }

    pub(crate) fn test_cfg() -> Arc<CoreConfig> {
        Arc::new(CoreConfig::new(today(), false, None).expect("CoreConfig::new should succeed"))
    }

    pub(crate) fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap())
            .expect("should write fixture");
        path
    }

    pub(crate) fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).expect("should read file"))
            .expect("should be valid JSON")
    }

    pub(crate) fn sample_patients() -> Value {
        json!([
            {
                "patient_id": "P001",
                "name": "Test 1",
                "age": 35,
                "gender": "male",
                "date_of_birth": "15/01/1998",
                "appointments": []
            },
            {
                "patient_id": "P002",
                "name": "Test 2",
                "age": 57,
                "gender": "female",
                "date_of_birth": "15/05/1968",
                "appointments": [
                    {
                        "appointment_id": "A-OLD",
                        "department": "GENERAL",
                        "doctor_id": "D001",
                        "date": "2024-02-01",
                        "time": "10:00",
                        "status": "Scheduled"
                    },
                    {
                        "appointment_id": "A-DONE",
                        "department": "SURGERY",
                        "date": "2024-02-02",
                        "time": "11:00",
                        "status": "Completed"
                    },
                    {
                        "appointment_id": "A-NEXT",
                        "department": "GENERAL",
                        "date": "2024-03-20",
                        "time": "14:00",
                        "status": "Scheduled",
                        "notes": "follow-up"
                    }
                ]
            }
        ])
    }

    pub(crate) fn sample_doctors() -> Value {
        json!([
            {"doctor_id": "D001", "department": "GENERAL", "schedule": []},
            {"doctor_id": "D002", "department": "PEDIATRICS", "schedule": []}
        ])
    }

    /// Writes the sample collections into `dir`, returning (patients, doctors) paths.
    pub(crate) fn sample_files(dir: &Path) -> (PathBuf, PathBuf) {
        (
            write_json(dir, "patients.json", &sample_patients()),
            write_json(dir, "doctors.json", &sample_doctors()),
        )
    }
}
