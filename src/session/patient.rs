//! Patient profile and caregivers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "X")]
    Unspecified,
}

impl Sex {
    /// Model indicator: 1 for male, 0 otherwise
    pub fn male_indicator(&self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female | Sex::Unspecified => 0.0,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unspecified => "X",
        };
        f.write_str(s)
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" => Ok(Sex::Male),
            "F" | "FEMALE" => Ok(Sex::Female),
            "X" | "" => Ok(Sex::Unspecified),
            other => Err(format!("unknown sex '{}'", other)),
        }
    }
}

/// Contact for demo notifications only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caregiver {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub dob: NaiveDate,
    pub sex: Sex,
    /// IANA timezone name used for reminders and report dates.
    pub timezone: String,
    #[serde(default)]
    pub caregivers: Vec<Caregiver>,
    #[serde(default)]
    pub consent_hospital_alerts: bool,
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self {
            name: "Demo Patient".to_string(),
            dob: NaiveDate::from_ymd_opt(1960, 1, 1).unwrap_or_default(),
            sex: Sex::Male,
            timezone: "America/Chicago".to_string(),
            caregivers: Vec::new(),
            consent_hospital_alerts: true,
        }
    }
}

impl PatientProfile {
    /// Add a caregiver. Blank names are ignored and reported as `false`.
    pub fn add_caregiver(&mut self, name: &str, phone: &str, email: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.caregivers.push(Caregiver {
            name: name.to_string(),
            phone: phone.trim().to_string(),
            email: email.trim().to_string(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let p = PatientProfile::default();
        assert_eq!(p.name, "Demo Patient");
        assert_eq!(p.sex, Sex::Male);
        assert_eq!(p.dob.to_string(), "1960-01-01");
        assert!(p.consent_hospital_alerts);
    }

    #[test]
    fn test_add_caregiver_rejects_blank() {
        let mut p = PatientProfile::default();
        assert!(!p.add_caregiver("  ", "555", ""));
        assert!(p.add_caregiver("Ana", "555-0100", "ana@example.org"));
        assert_eq!(p.caregivers.len(), 1);
        assert_eq!(p.caregivers[0].name, "Ana");
    }

    #[test]
    fn test_sex_parsing_and_indicator() {
        assert_eq!("m".parse::<Sex>(), Ok(Sex::Male));
        assert_eq!("female".parse::<Sex>(), Ok(Sex::Female));
        assert!("q".parse::<Sex>().is_err());
        assert_eq!(Sex::Male.male_indicator(), 1.0);
        assert_eq!(Sex::Female.male_indicator(), 0.0);
    }

    #[test]
    fn test_sex_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), "\"F\"");
    }
}
