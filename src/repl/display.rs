//! Display manager for the REPL terminal UI
//!
//! Formatted tables for risk, reminders and alerts, plus the progress bar
//! shown while the wearable stream runs.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::document::ParsedDischarge;
use crate::monitor::{Alert, Severity, VitalSample};
use crate::report::DailyReport;
use crate::risk::{RiskBand, TrainingSummary};
use crate::schedule::{AdherenceSummary, ReminderEvent, ReminderStatus};
use crate::session::{RiskAssessment, SessionContext};

/// Rows shown in the explanation table
pub const TOP_CONTRIBUTORS: usize = 5;

pub struct DisplayManager {
    show_progress: bool,
    show_samples: bool,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager {
            show_progress: true,
            show_samples: false,
        }
    }

    pub fn with_flags(show_progress: bool, show_samples: bool) -> Self {
        DisplayManager {
            show_progress,
            show_samples,
        }
    }

    pub fn show_banner(&self, version: &str, patient: &str) {
        let rule = "=".repeat(64);
        println!("\n{}", rule.cyan());
        println!("{}", format!("  aftercare {} - Post-discharge Monitor", version).bold().cyan());
        println!("{}", format!("  Patient: {} | Demo only, not medical advice", patient).dimmed());
        println!("{}\n", rule.cyan());
        println!(
            "Type {} for commands, {} to quit\n",
            "/help".green(),
            "/exit".green()
        );
    }

    fn header(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "=".repeat(60).cyan());
    }

    pub fn show_training(&self, summary: &TrainingSummary) {
        self.header("Risk Model");
        println!("  Seed:          {}", summary.seed.to_string().green());
        println!(
            "  Cohort:        {} ({} train / {} test)",
            summary.samples, summary.train_size, summary.test_size
        );
        println!("  Positive rate: {:.1}%", summary.positive_rate * 100.0);
        match summary.auc {
            Some(auc) => println!("  Held-out AUC:  {}", format!("{:.3}", auc).green()),
            None => println!("  Held-out AUC:  {}", "undefined (single class)".yellow()),
        }
        let converged = if summary.converged { "yes".green() } else { "no".yellow() };
        println!("  Iterations:    {} (converged: {})", summary.iterations, converged);
        println!();
    }

    pub fn show_assessment(&self, assessment: &RiskAssessment) {
        self.header("Readmission Risk (30 days)");
        println!(
            "  Probability: {}   Band: {}",
            format!("{:.1}%", assessment.probability * 100.0).bold(),
            band_label(assessment.band)
        );
        println!("  Base value:  {:+.3}", assessment.explanation.base_value);
        println!("\n  {:<14} {:>10} {:>14}", "Feature", "Value", "Contribution");
        for row in assessment.explanation.top(TOP_CONTRIBUTORS) {
            let contribution = format!("{:+.3}", row.contribution);
            let contribution = if row.contribution > 0.0 {
                contribution.red()
            } else {
                contribution.green()
            };
            println!("  {:<14} {:>10.2} {:>14}", row.feature, row.value, contribution);
        }
        println!();
    }

    pub fn show_discharge(&self, parsed: &ParsedDischarge) {
        self.header("Discharge Summary");
        if !parsed.raw_text_present {
            println!("{}", "  No text could be extracted from the document.".yellow());
        }
        let diagnoses = if parsed.diagnoses.is_empty() {
            "none found".dimmed().to_string()
        } else {
            parsed.diagnoses.join(", ")
        };
        println!("  Diagnoses:   {}", diagnoses);
        println!("  Stay (days): {}", parsed.length_of_stay_days);
        println!("  Prior admits (1y): {}", parsed.prior_admissions_1y);
        println!("  Medications found: {}", parsed.medications.len());
        for med in &parsed.medications {
            println!(
                "    - {} {} {}",
                med.name.green(),
                med.dose,
                med.freq.as_deref().unwrap_or("").dimmed()
            );
        }
        println!();
    }

    pub fn show_medications(&self, session: &SessionContext) {
        if session.medications.is_empty() {
            println!("{}", "No medications yet. Use /med or /import.".yellow());
            return;
        }
        self.header(&format!("Medications ({})", session.medications.len()));
        for (i, med) in session.medications.iter().enumerate() {
            println!(
                "  {}. {} {} ({})",
                (i + 1).to_string().cyan(),
                med.name,
                med.dose,
                med.frequency()
            );
        }
        println!();
    }

    pub fn show_schedule(&self, events: &[ReminderEvent]) {
        if events.is_empty() {
            println!("{}", "No reminders today.".yellow());
            return;
        }
        self.header("Today's Reminders");
        for (i, event) in events.iter().enumerate() {
            let status = match event.status {
                ReminderStatus::Due => "due".cyan(),
                ReminderStatus::Past => "past".dimmed(),
                ReminderStatus::Taken => "taken".green(),
                ReminderStatus::Missed => "missed".red(),
            };
            println!(
                "  {}. {} {} {} [{}]",
                (i + 1).to_string().cyan(),
                event.when.format("%H:%M"),
                event.med,
                event.dose,
                status
            );
        }
        println!();
    }

    pub fn show_adherence(&self, summary: &AdherenceSummary) {
        let pct = match summary.adherence_pct {
            Some(pct) => format!("{:.1}%", pct).green(),
            None => "n/a".dimmed(),
        };
        println!(
            "Adherence today: {} ({} of {} doses taken)",
            pct, summary.taken, summary.scheduled
        );
    }

    pub fn show_alerts(&self, alerts: &[&Alert]) {
        if alerts.is_empty() {
            println!(
                "{}",
                "No alerts yet. Run /stream with a low SpO₂ baseline to generate some.".yellow()
            );
            return;
        }
        self.header(&format!("Alerts ({})", alerts.len()));
        for alert in alerts {
            let severity = match alert.severity {
                Severity::Critical => "CRITICAL".red().bold(),
            };
            println!(
                "  {} {} {}",
                alert.ts.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                severity,
                alert.message
            );
        }
        println!();
    }

    /// Bar sized to the stream; hidden in quiet mode
    pub fn stream_bar(&self, samples: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(samples as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} Streaming [{bar:40.green/blue}] {pos}/{len} | {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }

    pub fn stream_tick(&self, pb: &ProgressBar, sample: &VitalSample, alerts: &[Alert]) {
        pb.set_message(format!("HR {:.0} SpO₂ {:.1}", sample.hr, sample.spo2));
        if self.show_samples {
            pb.println(format!(
                "  {} hr={:.1} spo2={:.1} steps={}",
                sample.ts.format("%H:%M:%S"),
                sample.hr,
                sample.spo2,
                sample.steps
            ));
        }
        for alert in alerts {
            pb.println(format!("  {} {}", "⚠".red(), alert.message.red()));
        }
        pb.inc(1);
    }

    pub fn show_report(&self, report: &DailyReport) {
        self.header(&format!("Daily Report {}", report.date));
        println!("  Patient:     {}", report.patient);
        match report.risk {
            Some(risk) => println!("  Latest risk: {:.1}%", risk * 100.0),
            None => println!("  Latest risk: {}", "not assessed".dimmed()),
        }
        let v = &report.vitals_summary;
        println!(
            "  Vitals:      HR median {} | SpO₂ min {} | steps {}",
            v.hr_rest.map_or("n/a".to_string(), |x| format!("{:.0}", x)),
            v.spo2_min.map_or("n/a".to_string(), |x| format!("{:.1}", x)),
            v.steps_sum
        );
        println!("  Medications: {}", report.meds_count);
        println!("  Alerts:      {}", report.alerts_24h.len());
        for tip in &report.suggestions {
            println!("  - {}", tip);
        }
        println!();
    }

    pub fn show_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    pub fn show_info(&self, info: &str) {
        println!("{} {}", "ℹ".cyan(), info);
    }

    pub fn clear_screen(&self) {
        print!("\x1B[2J\x1B[1;1H");
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn band_label(band: RiskBand) -> ColoredString {
    match band {
        RiskBand::High => band.as_str().red().bold(),
        RiskBand::Medium => band.as_str().yellow().bold(),
        RiskBand::Low => band.as_str().green().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_label_text() {
        colored::control::set_override(false);
        assert_eq!(band_label(RiskBand::High).to_string(), "High");
        assert_eq!(band_label(RiskBand::Low).to_string(), "Low");
    }

    #[test]
    fn test_quiet_stream_bar_is_hidden() {
        let display = DisplayManager::with_flags(false, false);
        assert!(display.stream_bar(10).is_hidden());
    }

    #[test]
    fn test_stream_bar_length() {
        let display = DisplayManager::new();
        assert_eq!(display.stream_bar(12).length(), Some(12));
    }
}
