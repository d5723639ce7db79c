//! Adherence summary over recorded dose events

use serde::{Deserialize, Serialize};

use super::reminders::{ReminderEvent, ReminderStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceSummary {
    pub scheduled: usize,
    pub taken: usize,
    /// Percentage rounded to one decimal; `None` when nothing was scheduled.
    pub adherence_pct: Option<f64>,
}

/// Every event counts as scheduled; only `Taken` counts as taken.
pub fn adherence(events: &[ReminderEvent]) -> AdherenceSummary {
    let scheduled = events.len();
    let taken = events
        .iter()
        .filter(|e| e.status == ReminderStatus::Taken)
        .count();
    let adherence_pct = if scheduled == 0 {
        None
    } else {
        Some(round1(100.0 * taken as f64 / scheduled as f64))
    };

    AdherenceSummary {
        scheduled,
        taken,
        adherence_pct,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn event(status: ReminderStatus) -> ReminderEvent {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        ReminderEvent {
            when: offset.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
            med: "Lisinopril".to_string(),
            dose: "10mg".to_string(),
            status,
        }
    }

    #[test]
    fn test_empty_has_no_percentage() {
        let summary = adherence(&[]);
        assert_eq!(summary.scheduled, 0);
        assert_eq!(summary.taken, 0);
        assert_eq!(summary.adherence_pct, None);
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        let events = vec![
            event(ReminderStatus::Taken),
            event(ReminderStatus::Missed),
            event(ReminderStatus::Past),
        ];
        let summary = adherence(&events);
        assert_eq!(summary.scheduled, 3);
        assert_eq!(summary.taken, 1);
        assert_eq!(summary.adherence_pct, Some(33.3));
    }

    #[test]
    fn test_all_taken() {
        let events = vec![event(ReminderStatus::Taken); 4];
        assert_eq!(adherence(&events).adherence_pct, Some(100.0));
    }

    #[test]
    fn test_empty_serializes_null() {
        let json = serde_json::to_value(adherence(&[])).unwrap();
        assert!(json["adherence_pct"].is_null());
    }
}
