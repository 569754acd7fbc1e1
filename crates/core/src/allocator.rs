//! Booking allocation.
//!
//! Decides which doctor, date and time a new appointment receives:
//!
//! 1. The target date is the next working day after "today" (weekends are skipped).
//! 2. The first doctor of the requested department takes the booking.
//! 3. That doctor's entry for the target date is used, or a new empty entry is appended.
//! 4. A day holding [`MAX_APPOINTMENTS_PER_DAY`] appointments is full.
//! 5. The offered time is 09:00 for an empty day, otherwise the last entry's recorded time
//!    plus the department's slot length.
//!
//! Step 5 walks the day in list order and never sorts, so gaps left by cancellations are not
//! refilled and an entry appended with an early time pulls the next offer back to just after
//! it. Existing data depends on this, so the rule is kept as is.
//!
//! Allocation is pure: it works on an in-memory collection and leaves persistence to the
//! caller. Nothing is mutated unless allocation succeeds.

use crate::constants::{APPOINTMENT_ID_ATTEMPTS, DAY_START_HOUR, MAX_APPOINTMENTS_PER_DAY};
use crate::department::Department;
use crate::doctor::{Doctor, ScheduleDay, Slot};
use crate::error::{HospitalError, HospitalResult};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use hospital_types::NonEmptyText;

/// Outcome of a successful allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Booking {
    pub appointment_id: NonEmptyText,
    pub doctor_id: NonEmptyText,
    pub department: Department,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// The first Monday-to-Friday date strictly after `today`.
pub fn next_working_day(today: NaiveDate) -> NaiveDate {
    let tomorrow = today + Duration::days(1);
    match tomorrow.weekday() {
        Weekday::Sat => tomorrow + Duration::days(2),
        Weekday::Sun => tomorrow + Duration::days(1),
        _ => tomorrow,
    }
}

/// Time of the first appointment of a day.
pub fn day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(DAY_START_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Time offered to the next booking on `day`.
///
/// Each existing entry moves the running clock to its own time plus `duration`, so only the
/// last entry in list order decides the result. Returns `None` when that would run past
/// midnight.
pub fn next_available_time(day: &ScheduleDay, duration: Duration) -> Option<NaiveTime> {
    let Some(last) = day.appointments.last() else {
        return Some(day_start());
    };

    let (time, wrapped_secs) = last.time.overflowing_add_signed(duration);
    (wrapped_secs == 0).then_some(time)
}

/// Generates a fresh random appointment ID.
pub fn new_appointment_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Allocates a slot for `patient_id` in `department` and records it in `doctors`.
///
/// The caller is responsible for checking that the patient exists and for persisting the
/// mutated collection.
///
/// # Arguments
///
/// * `doctors` - The full doctor collection, in file order.
/// * `department` - Requested department; matched case-insensitively.
/// * `patient_id` - Patient receiving the appointment.
/// * `today` - The current date; bookings go to the next working day.
/// * `id_source` - Produces candidate appointment IDs. IDs already present anywhere in the
///   collection are discarded, up to [`APPOINTMENT_ID_ATTEMPTS`] draws.
///
/// # Errors
///
/// Returns `HospitalError` if:
/// - no doctor works in the department ([`HospitalError::NoDoctorInDepartment`]),
/// - the chosen doctor's day is full or would run past midnight ([`HospitalError::NoAvailableSlots`]),
/// - no unused appointment ID could be drawn ([`HospitalError::AppointmentIdExhausted`]).
pub fn allocate(
    doctors: &mut [Doctor],
    department: &Department,
    patient_id: &NonEmptyText,
    today: NaiveDate,
    mut id_source: impl FnMut() -> String,
) -> HospitalResult<Booking> {
    let date = next_working_day(today);
    let duration = department.appointment_duration();

    let doctor_index = doctors
        .iter()
        .position(|d| d.department.matches(department))
        .ok_or_else(|| HospitalError::NoDoctorInDepartment(department.clone()))?;

    let day_index = doctors[doctor_index].day_position(date);
    let time = match day_index {
        Some(index) => {
            let day = &doctors[doctor_index].schedule[index];
            if day.appointments.len() >= MAX_APPOINTMENTS_PER_DAY {
                tracing::debug!(
                    "doctor {} is full on {}",
                    doctors[doctor_index].doctor_id,
                    date
                );
                return Err(HospitalError::NoAvailableSlots {
                    department: department.clone(),
                    date,
                });
            }
            next_available_time(day, duration).ok_or_else(|| HospitalError::NoAvailableSlots {
                department: department.clone(),
                date,
            })?
        }
        None => day_start(),
    };

    let appointment_id = unused_appointment_id(doctors, &mut id_source)?;

    let doctor = &mut doctors[doctor_index];
    let day_index = match day_index {
        Some(index) => index,
        None => {
            tracing::debug!("adding {} to schedule of doctor {}", date, doctor.doctor_id);
            doctor.schedule.push(ScheduleDay::new(date));
            doctor.schedule.len() - 1
        }
    };

    doctor.schedule[day_index].appointments.push(Slot {
        appointment_id: appointment_id.clone(),
        patient_id: patient_id.clone(),
        time,
        extra: serde_json::Map::new(),
    });

    Ok(Booking {
        appointment_id,
        doctor_id: doctor.doctor_id.clone(),
        department: doctor.department.clone(),
        date,
        time,
    })
}

fn unused_appointment_id(
    doctors: &[Doctor],
    id_source: &mut impl FnMut() -> String,
) -> HospitalResult<NonEmptyText> {
    for _attempt in 0..APPOINTMENT_ID_ATTEMPTS {
        let candidate = NonEmptyText::new(id_source())?;
        if doctors
            .iter()
            .any(|d| d.holds_appointment(candidate.as_str()))
        {
            tracing::warn!("generated appointment ID {} already in use", candidate);
            continue;
        }
        return Ok(candidate);
    }

    Err(HospitalError::AppointmentIdExhausted(
        APPOINTMENT_ID_ATTEMPTS,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_format;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        time_format::parse(s).unwrap()
    }

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).unwrap()
    }

    fn doctor(id: &str, department: Department) -> Doctor {
        Doctor {
            doctor_id: text(id),
            department,
            schedule: vec![],
            extra: Default::default(),
        }
    }

    fn day_with_times(on: NaiveDate, times: &[&str]) -> ScheduleDay {
        ScheduleDay {
            date: on,
            appointments: times
                .iter()
                .enumerate()
                .map(|(i, t)| Slot {
                    appointment_id: text(&format!("existing-{i}")),
                    patient_id: text("P999"),
                    time: time(t),
                    extra: Default::default(),
                })
                .collect(),
            extra: Default::default(),
        }
    }

    fn counter_ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("APT-{n}")
        }
    }

    fn wednesday() -> NaiveDate {
        date(2024, 3, 6)
    }

    #[test]
    fn test_next_working_day_skips_weekends() {
        // Thursday -> Friday
        assert_eq!(next_working_day(date(2024, 3, 7)), date(2024, 3, 8));
        // Friday -> Monday
        assert_eq!(next_working_day(date(2024, 3, 8)), date(2024, 3, 11));
        // Saturday -> Monday
        assert_eq!(next_working_day(date(2024, 3, 9)), date(2024, 3, 11));
        // Sunday -> Monday
        assert_eq!(next_working_day(date(2024, 3, 10)), date(2024, 3, 11));
    }

    #[test]
    fn test_next_working_day_never_lands_on_weekend() {
        let mut day = date(2024, 1, 1);
        for _ in 0..400 {
            let next = next_working_day(day);
            assert!(!matches!(next.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(next > day);
            assert!(next - day <= Duration::days(3));
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_first_booking_starts_at_nine_and_second_follows() {
        let mut doctors = vec![doctor("D001", Department::General)];
        let patient = text("P001");
        let mut ids = counter_ids();

        let first = allocate(&mut doctors, &Department::General, &patient, wednesday(), &mut ids)
            .expect("first booking should succeed");
        assert_eq!(first.time, time("09:00"));
        assert_eq!(first.date, date(2024, 3, 7));
        assert_eq!(first.doctor_id, "D001");
        assert_eq!(first.appointment_id, "APT-1");

        let second = allocate(&mut doctors, &Department::General, &patient, wednesday(), &mut ids)
            .expect("second booking should succeed");
        assert_eq!(second.time, time("09:30"));

        let day = doctors[0].day(date(2024, 3, 7)).expect("day should exist");
        assert_eq!(day.appointments.len(), 2);
        assert_eq!(doctors[0].schedule.len(), 1, "same day must be reused");
    }

    #[test]
    fn test_slot_length_depends_on_department() {
        for (department, expected) in [
            (Department::Pediatrics, "10:45"),
            (Department::Surgery, "11:00"),
            (Department::General, "10:30"),
            ("Dermatology".parse().unwrap(), "10:30"),
        ] {
            let mut doc = doctor("D001", department.clone());
            doc.schedule
                .push(day_with_times(date(2024, 3, 7), &["09:00", "10:00"]));
            let mut doctors = vec![doc];

            let booking = allocate(
                &mut doctors,
                &department,
                &text("P001"),
                wednesday(),
                counter_ids(),
            )
            .expect("booking should succeed");
            assert_eq!(booking.time, time(expected), "department {department}");
        }
    }

    #[test]
    fn test_department_match_is_case_insensitive_and_first_wins() {
        let mut doctors = vec![
            doctor("D001", Department::General),
            doctor("D002", "Pediatrics".parse().unwrap()),
            doctor("D003", Department::Pediatrics),
        ];

        let booking = allocate(
            &mut doctors,
            &"pediatrics".parse().unwrap(),
            &text("P001"),
            wednesday(),
            counter_ids(),
        )
        .expect("booking should succeed");

        assert_eq!(booking.doctor_id, "D002");
        assert!(doctors[2].schedule.is_empty());
    }

    #[test]
    fn test_booking_fills_day_up_to_capacity() {
        let mut doctors = vec![doctor("D001", Department::General)];
        let mut ids = counter_ids();
        let target = date(2024, 3, 7);

        for n in 0..MAX_APPOINTMENTS_PER_DAY {
            let before = doctors[0].day(target).map_or(0, |d| d.appointments.len());
            assert_eq!(before, n);
            allocate(&mut doctors, &Department::General, &text("P001"), wednesday(), &mut ids)
                .expect("booking under capacity should succeed");
            let after = doctors[0].day(target).map_or(0, |d| d.appointments.len());
            assert_eq!(after, n + 1);
            assert!(after <= MAX_APPOINTMENTS_PER_DAY);
        }

        let last = doctors[0].day(target).unwrap().appointments.last().unwrap();
        assert_eq!(last.time, time("13:30"));
    }

    #[test]
    fn test_full_day_is_rejected_without_changes() {
        let times: Vec<String> = (0..MAX_APPOINTMENTS_PER_DAY)
            .map(|i| format!("{:02}:00", 9 + i))
            .collect();
        let times: Vec<&str> = times.iter().map(String::as_str).collect();
        let mut doc = doctor("D001", Department::Surgery);
        doc.schedule.push(day_with_times(date(2024, 3, 7), &times));
        let mut doctors = vec![doc];
        let snapshot = doctors.clone();

        let err = allocate(
            &mut doctors,
            &Department::Surgery,
            &text("P001"),
            wednesday(),
            counter_ids(),
        )
        .expect_err("full day should be rejected");

        assert!(matches!(
            err,
            HospitalError::NoAvailableSlots { ref department, date: d }
                if *department == Department::Surgery && d == date(2024, 3, 7)
        ));
        assert_eq!(doctors, snapshot);
    }

    #[test]
    fn test_missing_department_is_rejected_without_changes() {
        let mut doctors = vec![doctor("D001", Department::General)];
        let snapshot = doctors.clone();

        let err = allocate(
            &mut doctors,
            &Department::Surgery,
            &text("P001"),
            wednesday(),
            counter_ids(),
        )
        .expect_err("no surgeon should be found");

        assert!(matches!(err, HospitalError::NoDoctorInDepartment(Department::Surgery)));
        assert_eq!(doctors, snapshot);
    }

    #[test]
    fn test_gaps_in_schedule_are_not_refilled() {
        let mut doc = doctor("D001", Department::General);
        doc.schedule
            .push(day_with_times(date(2024, 3, 7), &["09:00", "11:00"]));
        let mut doctors = vec![doc];

        let booking = allocate(
            &mut doctors,
            &Department::General,
            &text("P001"),
            wednesday(),
            counter_ids(),
        )
        .unwrap();

        // 09:30-11:00 is free but the allocator appends after the last entry.
        assert_eq!(booking.time, time("11:30"));
    }

    #[test]
    fn test_list_order_not_time_order_decides_next_slot() {
        let mut doc = doctor("D001", Department::General);
        doc.schedule
            .push(day_with_times(date(2024, 3, 7), &["11:00", "09:00"]));
        let mut doctors = vec![doc];

        let booking = allocate(
            &mut doctors,
            &Department::General,
            &text("P001"),
            wednesday(),
            counter_ids(),
        )
        .unwrap();

        assert_eq!(booking.time, time("09:30"));
    }

    #[test]
    fn test_other_dates_are_ignored() {
        let mut doc = doctor("D001", Department::General);
        doc.schedule
            .push(day_with_times(date(2024, 3, 6), &["09:00", "09:30", "10:00"]));
        let mut doctors = vec![doc];

        let booking = allocate(
            &mut doctors,
            &Department::General,
            &text("P001"),
            wednesday(),
            counter_ids(),
        )
        .unwrap();

        assert_eq!(booking.time, time("09:00"));
        assert_eq!(doctors[0].schedule.len(), 2);
        assert_eq!(doctors[0].schedule[1].date, date(2024, 3, 7));
    }

    #[test]
    fn test_slot_past_midnight_counts_as_full() {
        let mut doc = doctor("D001", Department::Surgery);
        doc.schedule.push(day_with_times(date(2024, 3, 7), &["23:30"]));
        let mut doctors = vec![doc];

        let err = allocate(
            &mut doctors,
            &Department::Surgery,
            &text("P001"),
            wednesday(),
            counter_ids(),
        )
        .expect_err("slot would wrap past midnight");
        assert!(matches!(err, HospitalError::NoAvailableSlots { .. }));
    }

    #[test]
    fn test_colliding_generated_ids_are_redrawn() {
        let mut doc = doctor("D001", Department::General);
        doc.schedule.push(day_with_times(date(2024, 3, 1), &["09:00"]));
        let mut doctors = vec![doc];

        let mut draws = vec!["fresh".to_string(), "existing-0".to_string()];
        let booking = allocate(
            &mut doctors,
            &Department::General,
            &text("P001"),
            wednesday(),
            || draws.pop().unwrap(),
        )
        .unwrap();
        assert_eq!(booking.appointment_id, "fresh");
    }

    #[test]
    fn test_id_exhaustion_leaves_collection_untouched() {
        let mut doc = doctor("D001", Department::General);
        doc.schedule.push(day_with_times(date(2024, 3, 1), &["09:00"]));
        let mut doctors = vec![doc];
        let snapshot = doctors.clone();

        let err = allocate(
            &mut doctors,
            &Department::General,
            &text("P001"),
            wednesday(),
            || "existing-0".to_string(),
        )
        .expect_err("every draw collides");

        assert!(matches!(err, HospitalError::AppointmentIdExhausted(APPOINTMENT_ID_ATTEMPTS)));
        assert_eq!(doctors, snapshot);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = new_appointment_id();
        let b = new_appointment_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
