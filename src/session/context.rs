//! Per-session monitoring state
//!
//! Everything the workflow accumulates (discharge record, medication list,
//! vitals, alerts, risk history) lives on one [`SessionContext`] that is
//! passed explicitly to every operation. A session is created with
//! [`SessionContext::new`] and ends when it idles past its time-to-live;
//! nothing is persisted.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::patient::PatientProfile;
use crate::document::{DischargeParser, ParsedDischarge};
use crate::errors::{CareError, Result};
use crate::monitor::{
    run_stream, Alert, AlertLog, AlertRules, StreamConfig, StreamOutcome, VitalSample, VitalsTable,
};
use crate::risk::{
    Explanation, FeatureMap, FeatureVector, ReadmissionEstimator, RiskBand, TrainingConfig,
    TrainingSummary,
};
use crate::schedule::{
    adherence, parse_timezone, schedule, schedule_at, AdherenceSummary, MedicationEntry,
    ReminderEvent, ReminderStatus,
};

/// Age used for every risk assessment; the profile's birth date is display-only
pub const DEFAULT_AGE: f64 = 65.0;
/// Readings considered when building risk features
pub const RISK_VITALS_WINDOW: usize = 120;
/// Placeholder vitals used before any wearable data arrives
pub const DEFAULT_HR_REST: f64 = 80.0;
pub const DEFAULT_SPO2_MIN: f64 = 94.0;
pub const DEFAULT_STEPS_SUM: f64 = 2000.0;
/// Sleep efficiency is not measured yet
pub const DEFAULT_SLEEP_EFF: f64 = 0.85;

/// One point on the risk timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub ts: DateTime<Utc>,
    pub risk: f64,
    pub band: RiskBand,
}

/// Result of scoring the current session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub band: RiskBand,
    pub features: FeatureVector,
    pub explanation: Explanation,
}

pub struct SessionContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    ttl: Duration,
    estimator: ReadmissionEstimator,
    pub patient: PatientProfile,
    pub discharge: ParsedDischarge,
    pub medications: Vec<MedicationEntry>,
    pub vitals: VitalsTable,
    pub alerts: AlertLog,
    pub risk_history: Vec<RiskRecord>,
    pub today_schedule: Vec<ReminderEvent>,
}

impl SessionContext {
    /// Open a fresh session. The estimator starts untrained.
    pub fn new(patient: PatientProfile, ttl: Duration) -> Self {
        Self::new_at(patient, ttl, Utc::now())
    }

    pub fn new_at(patient: PatientProfile, ttl: Duration, now: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, patient = %patient.name, "session opened");
        Self {
            id,
            created_at: now,
            last_active: now,
            ttl,
            estimator: ReadmissionEstimator::new(),
            patient,
            discharge: ParsedDischarge::empty(),
            medications: Vec::new(),
            vitals: VitalsTable::new(),
            alerts: AlertLog::new(),
            risk_history: Vec::new(),
            today_schedule: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Record activity, pushing expiry out by one TTL
    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    pub fn touch_at(&mut self, now: DateTime<Utc>) {
        if now > self.last_active {
            self.last_active = now;
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.last_active > self.ttl
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Fail with [`CareError::SessionExpired`] once the TTL has lapsed,
    /// otherwise refresh the activity timestamp.
    pub fn ensure_active_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_expired_at(now) {
            return Err(CareError::SessionExpired {
                id: self.id.to_string(),
                idle_minutes: (now - self.last_active).num_minutes(),
            });
        }
        self.touch_at(now);
        Ok(())
    }

    pub fn ensure_active(&mut self) -> Result<()> {
        self.ensure_active_at(Utc::now())
    }

    // ---- risk model ----

    pub fn estimator(&self) -> &ReadmissionEstimator {
        &self.estimator
    }

    pub fn train_model(&mut self, config: &TrainingConfig) -> Result<TrainingSummary> {
        self.touch();
        self.estimator.train_with(config)
    }

    /// Adopt an estimator trained elsewhere
    pub fn set_estimator(&mut self, estimator: ReadmissionEstimator) {
        self.estimator = estimator;
    }

    /// Feature vector for this patient, filling caller-side defaults for
    /// anything the session has not observed yet.
    pub fn risk_features(&self) -> FeatureMap {
        let summary = self.vitals.summary(RISK_VITALS_WINDOW);
        let (hr_rest, spo2_min, steps_sum) = if self.vitals.is_empty() {
            (DEFAULT_HR_REST, DEFAULT_SPO2_MIN, DEFAULT_STEPS_SUM)
        } else {
            (
                summary.hr_rest.unwrap_or(DEFAULT_HR_REST),
                summary.spo2_min.unwrap_or(DEFAULT_SPO2_MIN),
                summary.steps_sum as f64,
            )
        };

        let dx_chf = serde_json::to_string(&self.discharge)
            .map(|s| s.to_lowercase().contains("heart failure"))
            .unwrap_or(false);

        let values = [
            DEFAULT_AGE,
            self.patient.sex.male_indicator(),
            if dx_chf { 1.0 } else { 0.0 },
            f64::from(self.discharge.length_of_stay_days),
            f64::from(self.discharge.prior_admissions_1y),
            self.medications.len() as f64,
            hr_rest,
            spo2_min,
            steps_sum,
            DEFAULT_SLEEP_EFF,
        ];
        FeatureVector::from_array(values).to_map()
    }

    /// Score the session and append the result to the risk history
    pub fn assess_risk(&mut self) -> Result<RiskAssessment> {
        self.assess_risk_at(Utc::now())
    }

    pub fn assess_risk_at(&mut self, now: DateTime<Utc>) -> Result<RiskAssessment> {
        let features = FeatureVector::from_map(&self.risk_features())?;
        let (probability, explanation) = self.estimator.predict_vector(&features)?;
        let band = RiskBand::from_probability(probability);

        self.risk_history.push(RiskRecord {
            ts: now,
            risk: probability,
            band,
        });
        self.touch_at(now);
        debug!(probability, band = %band, "session risk assessed");

        Ok(RiskAssessment {
            probability,
            band,
            features,
            explanation,
        })
    }

    pub fn latest_risk(&self) -> Option<&RiskRecord> {
        self.risk_history.last()
    }

    // ---- documents and medications ----

    pub fn ingest_document(
        &mut self,
        parser: &DischargeParser,
        bytes: &[u8],
        is_pdf: bool,
    ) -> &ParsedDischarge {
        self.touch();
        self.discharge = parser.parse(bytes, is_pdf);
        &self.discharge
    }

    pub fn add_medication(&mut self, entry: MedicationEntry) {
        self.touch();
        self.medications.push(entry);
    }

    /// Append medications found in the parsed discharge; returns how many
    pub fn import_discharge_medications(&mut self) -> usize {
        self.touch();
        let found = self.discharge.medications.clone();
        let n = found.len();
        self.medications.extend(found);
        n
    }

    // ---- reminders ----

    /// Current calendar date in the patient's timezone
    pub fn local_today(&self) -> Result<NaiveDate> {
        let tz = parse_timezone(&self.patient.timezone)?;
        Ok(Utc::now().with_timezone(&tz).date_naive())
    }

    /// Rebuild today's schedule in the patient's timezone
    pub fn build_schedule(&mut self) -> Result<&[ReminderEvent]> {
        self.today_schedule = schedule(&self.medications, &self.patient.timezone)?;
        self.touch();
        Ok(&self.today_schedule)
    }

    pub fn build_schedule_at<T: TimeZone>(&mut self, now: &DateTime<T>) -> &[ReminderEvent] {
        self.today_schedule = schedule_at(&self.medications, now);
        &self.today_schedule
    }

    /// Record what happened to a scheduled dose
    pub fn mark_dose(&mut self, index: usize, status: ReminderStatus) -> Result<()> {
        let len = self.today_schedule.len();
        let event = self.today_schedule.get_mut(index).ok_or_else(|| {
            CareError::Generic(format!("no reminder #{} (schedule has {})", index + 1, len))
        })?;
        event.status = status;
        self.touch();
        Ok(())
    }

    pub fn adherence_summary(&self) -> AdherenceSummary {
        adherence(&self.today_schedule)
    }

    // ---- wearable ----

    pub fn run_stream<F>(
        &mut self,
        config: &StreamConfig,
        rules: &AlertRules,
        on_sample: F,
    ) -> StreamOutcome
    where
        F: FnMut(&VitalSample, &[Alert]),
    {
        let outcome = run_stream(config, rules, &mut self.vitals, &mut self.alerts, on_sample);
        self.touch();
        outcome
    }
}
