use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hospital_core::config::today_from_env_value;
use hospital_core::constants::DEFAULT_LOG_FILE;
use hospital_core::{
    AdminAccess, AdminService, AppointmentService, CoreConfig, Department, DisplayReport,
    DisplayTarget, NonEmptyText, RecordKind, ScheduleService,
};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Target for operator-facing output. Recorded in the log file only, since the console
/// already shows it on stdout or stderr.
const OUTCOME_TARGET: &str = "bookhosp::outcome";

#[derive(Parser, Debug)]
#[command(name = "bookhosp")]
#[command(about = "Hospital appointment administration CLI")]
struct Cli {
    /// Print debug-level tracing to stderr
    #[arg(long, global = true)]
    verbose: bool,
    /// Append log records to FILE (default: $BOOKHOSP_LOG_FILE or log.txt)
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        num_args = 0..=1,
        require_equals = true
    )]
    log: Option<Option<PathBuf>>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Book the next available slot in a department
    Book {
        patients_file: PathBuf,
        doctors_file: PathBuf,
        patient_id: NonEmptyText,
        /// GENERAL, PEDIATRICS, SURGERY or any other department name
        department: String,
    },
    /// Move a patient's appointment into another department
    Reschedule {
        patients_file: PathBuf,
        doctors_file: PathBuf,
        patient_id: NonEmptyText,
        appointment_id: NonEmptyText,
        department: String,
    },
    /// Remove an appointment from a doctor's schedule
    Cancel {
        doctors_file: PathBuf,
        appointment_id: NonEmptyText,
    },
    /// List scheduled appointments dated before today
    Overdue {
        patients_file: PathBuf,
        #[arg(long)]
        admin: bool,
    },
    /// Show a patient's appointments
    Search {
        patients_file: PathBuf,
        patient_id: NonEmptyText,
    },
    /// Show bookings on a date
    Display {
        doctors_file: PathBuf,
        /// ALL, GENERAL, PEDIATRICS, SURGERY or "DOCTOR <id>"
        target: String,
        /// Date (YYYY-MM-DD)
        date: String,
    },
    /// Show full schedules by doctor ID or department
    ViewSchedule {
        doctors_file: PathBuf,
        target: String,
    },
    /// Add doctor or patient records from a JSON file
    Add {
        patients_file: PathBuf,
        doctors_file: PathBuf,
        /// DOCTOR or PATIENT
        kind: String,
        input_file: PathBuf,
        #[arg(long)]
        admin: bool,
    },
    /// Replace the record with the given ID
    Modify {
        patients_file: PathBuf,
        doctors_file: PathBuf,
        id: NonEmptyText,
        input_file: PathBuf,
        #[arg(long)]
        admin: bool,
    },
    /// Delete the record with the given ID
    Delete {
        patients_file: PathBuf,
        doctors_file: PathBuf,
        id: NonEmptyText,
        #[arg(long)]
        admin: bool,
    },
}

/// Entry point for `bookhosp`.
///
/// # Environment Variables
/// - `BOOKHOSP_TODAY`: date used as "today" (YYYY-MM-DD, default: local date)
/// - `BOOKHOSP_LOG_FILE`: log file used by `--log` when no FILE is given
/// - `RUST_LOG`: extra tracing directives
fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let today = today_from_env_value(std::env::var("BOOKHOSP_TODAY").ok())?;
    let log_file = resolve_log_file(cli.log, std::env::var("BOOKHOSP_LOG_FILE").ok());
    let cfg = Arc::new(CoreConfig::new(today, cli.verbose, log_file)?);

    init_tracing(&cfg)?;

    let Some(command) = cli.command else {
        println!("Use 'bookhosp --help' for commands");
        return Ok(ExitCode::SUCCESS);
    };

    Ok(execute(command, cfg))
}

/// `--log` alone selects `env_value`, then `log.txt`; `--log=FILE` wins over both.
fn resolve_log_file(flag: Option<Option<PathBuf>>, env_value: Option<String>) -> Option<PathBuf> {
    flag.map(|explicit| {
        explicit.unwrap_or_else(|| {
            env_value
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
        })
    })
}

/// Console layer on stderr plus, when `cfg` names a log file, an append-mode file layer
/// that also receives every operator-facing outcome.
fn subscriber(
    cfg: &CoreConfig,
) -> anyhow::Result<impl tracing::Subscriber + Send + Sync + 'static> {
    let level = if cfg.verbose() { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("bookhosp={level}").parse()?)
        .add_directive(format!("hospital_core={level}").parse()?);

    let file_layer = match cfg.log_file() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter_fn(|meta| meta.target() != OUTCOME_TARGET));

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer))
}

fn init_tracing(cfg: &CoreConfig) -> anyhow::Result<()> {
    subscriber(cfg)?.init();
    Ok(())
}

/// Runs `command`, reporting any failure as `Error: <cause>`.
fn execute(command: Commands, cfg: Arc<CoreConfig>) -> ExitCode {
    match run(command, cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(target: OUTCOME_TARGET, "{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Prints one block of command output and records it in the log file.
fn report(text: impl std::fmt::Display) {
    let text = text.to_string();
    tracing::info!(target: OUTCOME_TARGET, "{text}");
    println!("{text}");
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

fn run(command: Commands, cfg: Arc<CoreConfig>) -> anyhow::Result<()> {
    match command {
        Commands::Book {
            patients_file,
            doctors_file,
            patient_id,
            department,
        } => {
            let department: Department = department.parse()?;
            let service = AppointmentService::new(cfg);
            let booking = service.book(
                &patients_file,
                &doctors_file,
                patient_id.as_str(),
                &department,
            )?;
            report(format_args!(
                "Appointment booked: {} with doctor {} on {} at {}",
                booking.appointment_id,
                booking.doctor_id,
                booking.date,
                booking.time.format("%H:%M")
            ));
        }
        Commands::Reschedule {
            patients_file,
            doctors_file,
            patient_id,
            appointment_id,
            department,
        } => {
            let department: Department = department.parse()?;
            let service = AppointmentService::new(cfg);
            let moved = service.reschedule(
                &patients_file,
                &doctors_file,
                patient_id.as_str(),
                appointment_id.as_str(),
                &department,
            )?;
            report(format_args!(
                "Appointment {} rescheduled to {}: doctor {} on {} at {}",
                moved.appointment_id,
                department,
                moved.doctor_id,
                moved.date,
                moved.time.format("%H:%M")
            ));
        }
        Commands::Cancel {
            doctors_file,
            appointment_id,
        } => {
            let service = AppointmentService::new(cfg);
            let cancelled = service.cancel(&doctors_file, appointment_id.as_str())?;
            report(format_args!(
                "Appointment {} cancelled (doctor {}, {} {})",
                cancelled.slot.appointment_id,
                cancelled.doctor_id,
                cancelled.date,
                cancelled.slot.time.format("%H:%M")
            ));
        }
        Commands::Overdue {
            patients_file,
            admin,
        } => {
            let access = AdminAccess::from_flag(admin)?;
            let service = AppointmentService::new(cfg);
            let overdue = service.overdue(&access, &patients_file)?;
            if overdue.is_empty() {
                report("No overdue appointments found.");
            }
            for item in overdue {
                report(format_args!(
                    "Overdue: {} - {} - appointment {} on {}",
                    item.patient_id, item.patient_name, item.appointment_id, item.date
                ));
            }
        }
        Commands::Search {
            patients_file,
            patient_id,
        } => {
            let service = AppointmentService::new(cfg);
            let appointments = service.search(&patients_file, patient_id.as_str())?;
            if appointments.is_empty() {
                report(format_args!("No appointments found for patient {patient_id}."));
            } else {
                report(serde_json::to_string_pretty(&appointments)?);
            }
        }
        Commands::Display {
            doctors_file,
            target,
            date,
        } => {
            let target: DisplayTarget = target.parse()?;
            let date = parse_date(&date)?;
            match ScheduleService::new().display(&doctors_file, &target, date)? {
                DisplayReport::Counts(counts) if counts.is_empty() => {
                    report(format_args!("No appointments scheduled on {date}."));
                }
                DisplayReport::Counts(counts) => {
                    for (doctor_id, count) in counts {
                        report(format_args!(
                            "Doctor {doctor_id}: {count} appointments on {date}"
                        ));
                    }
                }
                DisplayReport::Slots { doctor_id, slots } => {
                    report(format_args!(
                        "Doctor {doctor_id} on {date}:\n{}",
                        serde_json::to_string_pretty(&slots)?
                    ));
                }
            }
        }
        Commands::ViewSchedule {
            doctors_file,
            target,
        } => {
            let schedules = ScheduleService::new().view_schedule(&doctors_file, &target)?;
            if schedules.is_empty() {
                report(format_args!("No schedules found for {target}."));
            } else {
                report(serde_json::to_string_pretty(&schedules)?);
            }
        }
        Commands::Add {
            patients_file,
            doctors_file,
            kind,
            input_file,
            admin,
        } => {
            let access = AdminAccess::from_flag(admin)?;
            let kind: RecordKind = kind.parse()?;
            let added =
                AdminService::new().add(&access, &patients_file, &doctors_file, kind, &input_file)?;
            report(format_args!("Added {added} {kind} record(s)."));
        }
        Commands::Modify {
            patients_file,
            doctors_file,
            id,
            input_file,
            admin,
        } => {
            let access = AdminAccess::from_flag(admin)?;
            let kind = AdminService::new().modify(
                &access,
                &patients_file,
                &doctors_file,
                id.as_str(),
                &input_file,
            )?;
            report(format_args!("Modified {kind} {id}."));
        }
        Commands::Delete {
            patients_file,
            doctors_file,
            id,
            admin,
        } => {
            let access = AdminAccess::from_flag(admin)?;
            let kind =
                AdminService::new().delete(&access, &patients_file, &doctors_file, id.as_str())?;
            report(format_args!("Deleted {kind} {id}."));
        }
    }

    Ok(())
}
