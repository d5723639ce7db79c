//! Today's medication reminders
//!
//! Events come out in input medication order, then ascending hour within a
//! medication. There is deliberately no chronological sort across
//! medications.

use chrono::{DateTime, Datelike, FixedOffset, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::medication::MedicationEntry;
use crate::errors::{CareError, Result};

/// Reminder state. The scheduler only emits `Due` and `Past`; `Taken` and
/// `Missed` are recorded later by the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Due,
    Past,
    Taken,
    Missed,
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReminderStatus::Due => "due",
            ReminderStatus::Past => "past",
            ReminderStatus::Taken => "taken",
            ReminderStatus::Missed => "missed",
        };
        f.write_str(s)
    }
}

/// One dose occurrence at a fixed local clock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub when: DateTime<FixedOffset>,
    pub med: String,
    pub dose: String,
    pub status: ReminderStatus,
}

/// Resolve an IANA timezone name such as `America/Chicago`
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| CareError::UnknownTimezone(name.to_string()))
}

/// Build today's reminders in `timezone`, judged against the current time.
pub fn schedule(medications: &[MedicationEntry], timezone: &str) -> Result<Vec<ReminderEvent>> {
    let tz = parse_timezone(timezone)?;
    let now = Utc::now().with_timezone(&tz);
    Ok(schedule_at(medications, &now))
}

/// Build reminders for the local day of `now`.
///
/// A reminder is `Due` when its timestamp is at or after `now`, otherwise
/// `Past`.
pub fn schedule_at<T: TimeZone>(
    medications: &[MedicationEntry],
    now: &DateTime<T>,
) -> Vec<ReminderEvent> {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut events = Vec::new();

    for med in medications {
        for &hour in med.frequency().hours() {
            let Some(at) = tz
                .with_ymd_and_hms(today.year(), today.month(), today.day(), hour, 0, 0)
                .earliest()
            else {
                warn!(med = %med.name, hour, "reminder hour does not exist locally, skipped");
                continue;
            };

            let status = if at >= *now {
                ReminderStatus::Due
            } else {
                ReminderStatus::Past
            };

            events.push(ReminderEvent {
                when: at.with_timezone(&at.offset().fix()),
                med: med.name.clone(),
                dose: med.dose.clone(),
                status,
            });
        }
    }

    events
}
