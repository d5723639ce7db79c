//! Daily report export

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::monitor::{Alert, VitalsSummary};
use crate::session::SessionContext;

/// Readings summarised in the report
pub const REPORT_VITALS_WINDOW: usize = 200;
/// Alerts listed in the report
pub const REPORT_ALERT_LIMIT: usize = 10;

pub const SUGGESTIONS: [&str; 3] = [
    "Remember your evening dose if scheduled.",
    "Aim for 10–15 minutes of light walking today (if approved by your clinician).",
    "If you feel chest pain or severe breathlessness, seek urgent care.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub patient: String,
    /// Latest assessed risk, `null` before the first assessment
    pub risk: Option<f64>,
    pub vitals_summary: VitalsSummary,
    pub meds_count: usize,
    pub alerts_24h: Vec<Alert>,
    pub suggestions: Vec<String>,
}

impl DailyReport {
    /// Snapshot the session, dated in the patient's timezone
    pub fn from_session(session: &SessionContext) -> crate::errors::Result<Self> {
        Ok(Self::from_session_on(session, session.local_today()?))
    }

    pub fn from_session_on(session: &SessionContext, date: NaiveDate) -> Self {
        Self {
            date,
            patient: session.patient.name.clone(),
            risk: session.latest_risk().map(|r| r.risk),
            vitals_summary: session.vitals.summary(REPORT_VITALS_WINDOW),
            meds_count: session.medications.len(),
            alerts_24h: session.alerts.recent(REPORT_ALERT_LIMIT).to_vec(),
            suggestions: SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("daily_report_{}.json", self.date)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize daily report")
    }

    /// Write `daily_report_<date>.json` into `dir`, creating it if needed
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

        let path = dir.join(self.file_name());
        fs::write(&path, self.to_json()?)
            .with_context(|| format!("Failed to write report {}", path.display()))?;

        info!(path = %path.display(), "daily report written");
        Ok(path)
    }
}
