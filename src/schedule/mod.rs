//! Medication list, reminder schedule and adherence

pub mod adherence;
pub mod medication;
pub mod reminders;

pub use adherence::{adherence, AdherenceSummary};
pub use medication::{Frequency, MedicationEntry, DEFAULT_COURSE_DAYS};
pub use reminders::{parse_timezone, schedule, schedule_at, ReminderEvent, ReminderStatus};
