//! Medication entries and frequency codes

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default course length for manually entered medications
pub const DEFAULT_COURSE_DAYS: i64 = 14;

/// Dosing frequency with its fixed reminder hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    OnceDaily,
    TwiceDaily,
    ThreeTimesDaily,
    FourTimesDaily,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::OnceDaily,
        Frequency::TwiceDaily,
        Frequency::ThreeTimesDaily,
        Frequency::FourTimesDaily,
    ];

    /// Display code stored on medication entries
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::OnceDaily => "qd (daily)",
            Frequency::TwiceDaily => "bid (2x/day)",
            Frequency::ThreeTimesDaily => "tid (3x/day)",
            Frequency::FourTimesDaily => "qid (4x/day)",
        }
    }

    /// Local clock hours for reminders, ascending
    pub fn hours(&self) -> &'static [u32] {
        match self {
            Frequency::OnceDaily => &[9],
            Frequency::TwiceDaily => &[9, 21],
            Frequency::ThreeTimesDaily => &[9, 15, 21],
            Frequency::FourTimesDaily => &[8, 12, 16, 20],
        }
    }

    /// Exact lookup of a display code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    /// Lenient lookup for typed input: accepts the display code or its
    /// leading abbreviation (`qd`, `bid`, `tid`, `qid`, `daily`).
    pub fn parse_loose(input: &str) -> Option<Self> {
        let key = input.trim().to_lowercase();
        if let Some(f) = Self::from_code(&key) {
            return Some(f);
        }
        match key.split_whitespace().next()? {
            "qd" | "daily" => Some(Frequency::OnceDaily),
            "bid" => Some(Frequency::TwiceDaily),
            "tid" => Some(Frequency::ThreeTimesDaily),
            "qid" => Some(Frequency::FourTimesDaily),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A medication on the patient's list.
///
/// Doses are free text and never validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub name: String,
    #[serde(default)]
    pub dose: String,
    /// Frequency code; absent or unrecognised codes schedule once daily.
    #[serde(default)]
    pub freq: Option<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub stop: Option<NaiveDate>,
}

impl MedicationEntry {
    pub fn new(name: impl Into<String>, dose: impl Into<String>, freq: Frequency) -> Self {
        Self {
            name: name.into(),
            dose: dose.into(),
            freq: Some(freq.code().to_string()),
            start: None,
            stop: None,
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, stop: Option<NaiveDate>) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    /// Course starting on `start` and running [`DEFAULT_COURSE_DAYS`]
    pub fn with_course_from(self, start: NaiveDate) -> Self {
        self.with_dates(Some(start), Some(start + Duration::days(DEFAULT_COURSE_DAYS)))
    }

    /// Resolved frequency, falling back to once daily
    pub fn frequency(&self) -> Frequency {
        self.freq
            .as_deref()
            .and_then(Frequency::from_code)
            .unwrap_or(Frequency::OnceDaily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for f in Frequency::ALL {
            assert_eq!(Frequency::from_code(f.code()), Some(f));
        }
    }

    #[test]
    fn test_hours_table() {
        assert_eq!(Frequency::OnceDaily.hours(), &[9]);
        assert_eq!(Frequency::TwiceDaily.hours(), &[9, 21]);
        assert_eq!(Frequency::ThreeTimesDaily.hours(), &[9, 15, 21]);
        assert_eq!(Frequency::FourTimesDaily.hours(), &[8, 12, 16, 20]);
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(Frequency::parse_loose("BID"), Some(Frequency::TwiceDaily));
        assert_eq!(Frequency::parse_loose("daily"), Some(Frequency::OnceDaily));
        assert_eq!(Frequency::parse_loose(" qid (4x/day) "), Some(Frequency::FourTimesDaily));
        assert_eq!(Frequency::parse_loose("weekly"), None);
    }

    #[test]
    fn test_entry_frequency_fallback() {
        let mut med = MedicationEntry::new("Metoprolol", "25 mg", Frequency::TwiceDaily);
        assert_eq!(med.frequency(), Frequency::TwiceDaily);
        med.freq = Some("q8h".to_string());
        assert_eq!(med.frequency(), Frequency::OnceDaily);
        med.freq = None;
        assert_eq!(med.frequency(), Frequency::OnceDaily);
    }

    #[test]
    fn test_course_dates() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let med = MedicationEntry::new("Apixaban", "5 mg", Frequency::TwiceDaily)
            .with_course_from(start);
        assert_eq!(med.start, Some(start));
        assert_eq!(med.stop, NaiveDate::from_ymd_opt(2026, 3, 6));
    }

    #[test]
    fn test_entry_deserializes_with_defaults() {
        let med: MedicationEntry = serde_json::from_str(r#"{"name": "Aspirin"}"#).unwrap();
        assert_eq!(med.dose, "");
        assert!(med.freq.is_none());
        assert!(med.start.is_none());
    }
}
