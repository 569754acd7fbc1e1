//! Constants used throughout the hospital core crate.

/// Maximum number of appointments a doctor can hold on a single day.
pub const MAX_APPOINTMENTS_PER_DAY: usize = 10;

/// Hour at which the first appointment of a day starts.
pub const DAY_START_HOUR: u32 = 9;

/// Slot length for pediatrics appointments, in minutes.
pub const PEDIATRICS_SLOT_MINUTES: i64 = 45;

/// Slot length for surgery appointments, in minutes.
pub const SURGERY_SLOT_MINUTES: i64 = 60;

/// Slot length for general and any other department, in minutes.
pub const DEFAULT_SLOT_MINUTES: i64 = 30;

/// Status marking an appointment that has not yet taken place.
pub const SCHEDULED_STATUS: &str = "Scheduled";

/// Default flat log file used when logging is enabled without an explicit path.
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// Number of times a freshly generated appointment ID is redrawn on collision.
pub const APPOINTMENT_ID_ATTEMPTS: usize = 5;
