//! Built-in `/` commands for the REPL
//!
//! Domain failures are printed and the shell carries on; only terminal I/O
//! errors propagate out of [`CommandHandler::execute`].

use anyhow::Result;
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::document::DischargeParser;
use crate::monitor::Activity;
use crate::repl::display::DisplayManager;
use crate::report::DailyReport;
use crate::schedule::{Frequency, MedicationEntry, ReminderStatus};
use crate::session::SessionContext;

/// Newest alerts listed by `/alerts`
pub const ALERT_LIST_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Exit,
    Status,
    Clear,
    Reset,
    Patient,
    Caregiver {
        name: String,
        phone: String,
        email: String,
    },
    Train {
        seed: Option<u64>,
        samples: Option<usize>,
    },
    Risk,
    Parse {
        path: PathBuf,
    },
    Import,
    Med {
        name: String,
        dose: String,
        freq: Frequency,
    },
    Meds,
    Schedule,
    /// `index` is 1-based, as displayed
    Mark {
        index: usize,
        status: ReminderStatus,
    },
    Adherence,
    Stream {
        samples: Option<usize>,
        activity: Activity,
        baseline_hr: Option<f64>,
        baseline_spo2: Option<f64>,
    },
    Alerts,
    Report {
        dir: Option<PathBuf>,
    },
    Usage {
        usage: &'static str,
    },
    Unknown {
        input: String,
    },
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

/// Parse one line of shell input
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    let parts: Vec<&str> = body.split_whitespace().collect();
    let Some(head) = parts.first() else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };
    let args = &parts[1..];

    match head.to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "exit" | "quit" | "q" => Command::Exit,
        "status" => Command::Status,
        "clear" | "cls" => Command::Clear,
        "reset" => Command::Reset,
        "patient" => Command::Patient,
        "caregiver" => parse_caregiver(args),
        "train" => {
            let seed = args.first().and_then(|s| s.parse().ok());
            let samples = args.get(1).and_then(|s| s.parse().ok());
            Command::Train { seed, samples }
        }
        "risk" => Command::Risk,
        "parse" | "upload" => match args.first() {
            Some(_) => Command::Parse {
                path: PathBuf::from(args.join(" ")),
            },
            None => Command::Usage {
                usage: "/parse <file>",
            },
        },
        "import" => Command::Import,
        "med" => parse_med(args),
        "meds" => Command::Meds,
        "schedule" | "today" => Command::Schedule,
        "take" | "miss" => {
            let status = if head.eq_ignore_ascii_case("take") {
                ReminderStatus::Taken
            } else {
                ReminderStatus::Missed
            };
            match args.first().and_then(|s| s.parse::<usize>().ok()) {
                Some(index) if index > 0 => Command::Mark { index, status },
                _ => Command::Usage {
                    usage: "/take <n> or /miss <n>, numbered as in /schedule",
                },
            }
        }
        "adherence" => Command::Adherence,
        "stream" => parse_stream(args),
        "alerts" => Command::Alerts,
        "report" => Command::Report {
            dir: args.first().map(PathBuf::from),
        },
        _ => Command::Unknown {
            input: input.to_string(),
        },
    }
}

/// `/caregiver <name...> [phone] [email]`
///
/// Words containing `@` are the email, words made of digits and phone
/// punctuation are the phone; everything else is the name.
fn parse_caregiver(args: &[&str]) -> Command {
    let mut name = Vec::new();
    let mut phone = String::new();
    let mut email = String::new();

    for arg in args {
        if arg.contains('@') {
            email = arg.to_string();
        } else if is_phone_like(arg) {
            phone = arg.to_string();
        } else {
            name.push(*arg);
        }
    }

    if name.is_empty() {
        return Command::Usage {
            usage: "/caregiver <name> [phone] [email]",
        };
    }
    Command::Caregiver {
        name: name.join(" "),
        phone,
        email,
    }
}

fn is_phone_like(arg: &str) -> bool {
    arg.chars().any(|c| c.is_ascii_digit())
        && arg
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.'))
}

/// `/med <name...> [dose...] <qd|bid|tid|qid|daily>`
///
/// The name runs up to the first word starting with a digit; the dose is
/// kept verbatim.
fn parse_med(args: &[&str]) -> Command {
    let usage = Command::Usage {
        usage: "/med <name> <dose> <qd|bid|tid|qid>",
    };
    let Some((last, rest)) = args.split_last() else {
        return usage;
    };
    let Some(freq) = Frequency::parse_loose(last) else {
        return usage;
    };
    if rest.is_empty() {
        return usage;
    }

    let dose_at = rest
        .iter()
        .skip(1)
        .position(|t| t.starts_with(|c: char| c.is_ascii_digit()))
        .map_or(1, |i| i + 1);
    Command::Med {
        name: rest[..dose_at].join(" "),
        dose: rest[dose_at..].join(" "),
        freq,
    }
}

/// `/stream [samples] [rest|light|walk] [hr=<bpm>] [spo2=<pct>]`
fn parse_stream(args: &[&str]) -> Command {
    let usage = Command::Usage {
        usage: "/stream [samples] [rest|light|walk] [hr=<bpm>] [spo2=<pct>]",
    };
    let mut samples = None;
    let mut activity = Activity::Rest;
    let mut baseline_hr = None;
    let mut baseline_spo2 = None;

    for arg in args {
        if let Ok(n) = arg.parse::<usize>() {
            samples = Some(n);
        } else if let Ok(a) = arg.parse::<Activity>() {
            activity = a;
        } else if let Some(v) = arg.strip_prefix("hr=") {
            match v.parse() {
                Ok(v) => baseline_hr = Some(v),
                Err(_) => return usage,
            }
        } else if let Some(v) = arg.strip_prefix("spo2=") {
            match v.parse() {
                Ok(v) => baseline_spo2 = Some(v),
                Err(_) => return usage,
            }
        } else {
            return usage;
        }
    }

    Command::Stream {
        samples,
        activity,
        baseline_hr,
        baseline_spo2,
    }
}

pub struct CommandHandler {
    config: Config,
    parser: DischargeParser,
}

impl CommandHandler {
    pub fn new(config: Config) -> Self {
        CommandHandler {
            config,
            parser: DischargeParser::new(),
        }
    }

    /// Use a different document parser, e.g. one with a PDF backend
    pub fn with_parser(mut self, parser: DischargeParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fresh session for the configured patient
    pub fn new_session(&self) -> SessionContext {
        SessionContext::new(self.config.patient_profile(), self.config.session_ttl())
    }

    /// Execute a command
    ///
    /// Returns true if REPL should continue, false if should exit
    pub fn execute(
        &mut self,
        command: Command,
        session: &mut SessionContext,
        display: &DisplayManager,
    ) -> Result<bool> {
        match command {
            Command::Help => self.show_help(),
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                return Ok(false);
            }
            Command::Status => self.show_status(session),
            Command::Clear => display.clear_screen(),
            Command::Reset => {
                *session = self.new_session();
                println!("{}", "Session reset. All session data cleared.".yellow());
            }
            Command::Patient => self.show_patient(session),
            Command::Caregiver { name, phone, email } => {
                if session.patient.add_caregiver(&name, &phone, &email) {
                    display.show_success(&format!("Caregiver {} added", name));
                } else {
                    display.show_warning("Caregiver name is required");
                }
            }
            Command::Train { seed, samples } => {
                let mut training = self.config.training();
                if let Some(seed) = seed {
                    training.seed = seed;
                }
                if let Some(samples) = samples {
                    training.samples = samples;
                }
                match session.train_model(&training) {
                    Ok(summary) => display.show_training(&summary),
                    Err(e) => display.show_error(&e.to_string()),
                }
            }
            Command::Risk => {
                if !session.estimator().is_trained() {
                    display.show_info("Training risk model on the synthetic cohort...");
                    if let Err(e) = session.train_model(&self.config.training()) {
                        display.show_error(&e.to_string());
                        return Ok(true);
                    }
                }
                match session.assess_risk() {
                    Ok(assessment) => display.show_assessment(&assessment),
                    Err(e) => display.show_error(&e.to_string()),
                }
            }
            Command::Parse { path } => self.parse_document(&path, session, display),
            Command::Import => {
                let n = session.import_discharge_medications();
                if n == 0 {
                    display.show_warning("No medications found in the discharge summary");
                } else {
                    display.show_success(&format!("Imported {} medication(s)", n));
                }
            }
            Command::Med { name, dose, freq } => match session.local_today() {
                Ok(today) => {
                    let entry = MedicationEntry::new(name, dose, freq).with_course_from(today);
                    display.show_success(&format!(
                        "Added {} {} ({})",
                        entry.name,
                        entry.dose,
                        entry.frequency()
                    ));
                    session.add_medication(entry);
                }
                Err(e) => display.show_error(&e.to_string()),
            },
            Command::Meds => display.show_medications(session),
            Command::Schedule => match session.build_schedule() {
                Ok(events) => display.show_schedule(events),
                Err(e) => display.show_error(&e.to_string()),
            },
            Command::Mark { index, status } => match session.mark_dose(index - 1, status) {
                Ok(()) => {
                    display.show_success(&format!("Reminder #{} marked {}", index, status));
                    display.show_adherence(&session.adherence_summary());
                }
                Err(e) => display.show_error(&e.to_string()),
            },
            Command::Adherence => display.show_adherence(&session.adherence_summary()),
            Command::Stream {
                samples,
                activity,
                baseline_hr,
                baseline_spo2,
            } => {
                let mut stream = self.config.stream_config(activity);
                if let Some(n) = samples {
                    stream.samples = n;
                }
                if let Some(hr) = baseline_hr {
                    stream.baseline_hr = hr;
                }
                if let Some(spo2) = baseline_spo2 {
                    stream.baseline_spo2 = spo2;
                }
                let pb = display.stream_bar(stream.samples);
                let rules = self.config.alert_rules();
                let outcome = session.run_stream(&stream, &rules, |sample, alerts| {
                    display.stream_tick(&pb, sample, alerts)
                });
                pb.finish_and_clear();
                display.show_success(&format!(
                    "Streamed {} samples, {} alert(s)",
                    outcome.samples, outcome.alerts_raised
                ));
            }
            Command::Alerts => {
                let alerts = session.alerts.newest_first();
                let shown = &alerts[..alerts.len().min(ALERT_LIST_LIMIT)];
                display.show_alerts(shown);
            }
            Command::Report { dir } => {
                let report = match DailyReport::from_session(session) {
                    Ok(report) => report,
                    Err(e) => {
                        display.show_error(&e.to_string());
                        return Ok(true);
                    }
                };
                display.show_report(&report);
                let dir = dir.unwrap_or_else(|| self.config.report_dir());
                match report.write_json(&dir) {
                    Ok(path) => display.show_success(&format!("Saved {}", path.display())),
                    Err(e) => display.show_error(&format!("{:#}", e)),
                }
            }
            Command::Usage { usage } => {
                println!("Usage: {}", usage.cyan());
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
            }
        }
        Ok(true)
    }

    fn parse_document(&self, path: &Path, session: &mut SessionContext, display: &DisplayManager) {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                display.show_error(&format!("Cannot read {}: {}", path.display(), e));
                return;
            }
        };
        let is_pdf = is_pdf_path(path);
        let parsed = session.ingest_document(&self.parser, &bytes, is_pdf);
        display.show_discharge(parsed);
        if !parsed.medications.is_empty() {
            display.show_info("Use /import to add these to the medication list");
        }
    }

    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = [
            ("/help, /h", "Show this help message"),
            ("/status", "Show session status"),
            ("/patient", "Show patient profile"),
            ("/caregiver <name> ..", "Add a caregiver, e.g. /caregiver Ana Smith 555-0100"),
            ("/train [seed] [n]", "Train the risk model"),
            ("/risk", "Assess readmission risk with explanation"),
            ("/parse <file>", "Parse a discharge summary (.txt or .pdf)"),
            ("/import", "Add medications found in the discharge"),
            ("/med <name> <dose> <freq>", "Add a medication, e.g. /med Metoprolol 25 mg bid"),
            ("/meds", "List medications"),
            ("/schedule", "Build today's reminders"),
            ("/take <n>, /miss <n>", "Mark a reminder taken or missed"),
            ("/adherence", "Show today's adherence"),
            ("/stream [n] [activity]", "Run the simulated wearable"),
            ("/alerts", "Show alerts, newest first"),
            ("/report [dir]", "Show and save the daily report"),
            ("/reset", "Start a fresh session"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Exit REPL"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<24} {}", cmd.green(), desc);
        }
        println!(
            "\n  Demo only. Press {} or {} to exit.\n",
            "Ctrl-D".cyan(),
            "/exit".cyan()
        );
    }

    fn show_status(&self, session: &SessionContext) {
        println!("\n{}", "Session Status:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let idle = chrono::Utc::now() - session.last_active();
        let risk = match session.latest_risk() {
            Some(r) => format!("{:.1}% ({})", r.risk * 100.0, r.band),
            None => "not assessed".to_string(),
        };
        println!("  Session:        {}", session.id().to_string().dimmed());
        println!("  Started:        {}", session.created_at().format("%Y-%m-%d %H:%M UTC"));
        println!(
            "  Idle / TTL:     {}m / {}m",
            idle.num_minutes(),
            session.ttl().num_minutes()
        );
        let trained = if session.estimator().is_trained() {
            "Yes".green()
        } else {
            "No".red()
        };
        println!("  Model trained:  {}", trained);
        println!("  Latest risk:    {}", risk);
        println!("  Medications:    {}", session.medications.len().to_string().green());
        println!("  Vitals:         {}", session.vitals.len().to_string().green());
        println!("  Alerts:         {}", session.alerts.len().to_string().green());
        println!();
    }

    fn show_patient(&self, session: &SessionContext) {
        let p = &session.patient;
        println!("\n{}", "Patient:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());
        println!("  Name:     {}", p.name);
        println!("  DOB:      {}", p.dob);
        println!("  Sex:      {}", p.sex);
        println!("  Timezone: {}", p.timezone);
        println!(
            "  Consent to hospital alerts: {}",
            if p.consent_hospital_alerts { "yes" } else { "no" }
        );
        for c in &p.caregivers {
            println!("  Caregiver: {} {} {}", c.name, c.phone, c.email);
        }
        println!();
    }
}

/// PDF by file extension, case-insensitive
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> CommandHandler {
        let mut config = Config::default();
        config.model.samples = 200;
        config.stream.interval_ms = 0;
        CommandHandler::new(config)
    }

    #[test]
    fn test_is_command() {
        assert!(is_command("/help"));
        assert!(is_command(" /risk"));
        assert!(!is_command("help"));
    }

    #[test]
    fn test_parse_basic() {
        assert_eq!(parse("/h"), Command::Help);
        assert_eq!(parse("/quit"), Command::Exit);
        assert_eq!(parse("/today"), Command::Schedule);
        assert!(matches!(parse("/nope"), Command::Unknown { .. }));
        assert!(matches!(parse("plain text"), Command::Unknown { .. }));
        assert!(matches!(parse("/"), Command::Unknown { .. }));
    }

    #[test]
    fn test_parse_train_args() {
        assert_eq!(
            parse("/train 7 300"),
            Command::Train {
                seed: Some(7),
                samples: Some(300)
            }
        );
        assert_eq!(
            parse("/train"),
            Command::Train {
                seed: None,
                samples: None
            }
        );
    }

    #[test]
    fn test_parse_mark() {
        assert_eq!(
            parse("/take 2"),
            Command::Mark {
                index: 2,
                status: ReminderStatus::Taken
            }
        );
        assert!(matches!(parse("/miss 0"), Command::Usage { .. }));
        assert!(matches!(parse("/take"), Command::Usage { .. }));
    }

    #[test]
    fn test_parse_stream() {
        assert_eq!(
            parse("/stream 12 walk spo2=85"),
            Command::Stream {
                samples: Some(12),
                activity: Activity::Walk,
                baseline_hr: None,
                baseline_spo2: Some(85.0),
            }
        );
        assert!(matches!(parse("/stream fast"), Command::Usage { .. }));
    }

    #[test]
    fn test_parse_med_keeps_dose() {
        assert_eq!(
            parse("/med Insulin glargine 10 units bid"),
            Command::Med {
                name: "Insulin glargine".to_string(),
                dose: "10 units".to_string(),
                freq: Frequency::TwiceDaily,
            }
        );
        assert_eq!(
            parse("/med Aspirin daily"),
            Command::Med {
                name: "Aspirin".to_string(),
                dose: String::new(),
                freq: Frequency::OnceDaily,
            }
        );
        assert!(matches!(parse("/med Aspirin 81mg weekly"), Command::Usage { .. }));
        assert!(matches!(parse("/med bid"), Command::Usage { .. }));
        assert!(matches!(parse("/med"), Command::Usage { .. }));
    }

    #[test]
    fn test_parse_caregiver_full_name() {
        assert_eq!(
            parse("/caregiver Ana Smith 555-0100 ana@example.org"),
            Command::Caregiver {
                name: "Ana Smith".to_string(),
                phone: "555-0100".to_string(),
                email: "ana@example.org".to_string(),
            }
        );
        assert_eq!(
            parse("/caregiver Ana Smith"),
            Command::Caregiver {
                name: "Ana Smith".to_string(),
                phone: String::new(),
                email: String::new(),
            }
        );
        assert!(matches!(parse("/caregiver 555-0100"), Command::Usage { .. }));
    }

    #[test]
    fn test_parse_paths_keep_spaces() {
        assert_eq!(
            parse("/parse my docs/summary.txt"),
            Command::Parse {
                path: PathBuf::from("my docs/summary.txt")
            }
        );
    }

    #[test]
    fn test_execute_exit_and_help() {
        let mut h = handler();
        let mut session = h.new_session();
        let display = DisplayManager::with_flags(false, false);
        assert!(!h.execute(Command::Exit, &mut session, &display).unwrap());
        assert!(h.execute(Command::Help, &mut session, &display).unwrap());
    }

    #[test]
    fn test_execute_med_then_schedule() {
        let mut h = handler();
        let mut session = h.new_session();
        let display = DisplayManager::with_flags(false, false);
        h.execute(parse("/med Metoprolol 25 mg bid"), &mut session, &display)
            .unwrap();
        assert_eq!(session.medications.len(), 1);
        let med = &session.medications[0];
        assert_eq!(med.dose, "25 mg");
        assert_eq!(med.frequency(), Frequency::TwiceDaily);
        let start = med.start.unwrap();
        assert_eq!(med.stop, Some(start + chrono::Duration::days(14)));

        h.execute(Command::Schedule, &mut session, &display).unwrap();
        assert_eq!(session.today_schedule.len(), 2);
    }

    #[test]
    fn test_execute_risk_trains_on_demand() {
        let mut h = handler();
        let mut session = h.new_session();
        let display = DisplayManager::with_flags(false, false);
        h.execute(Command::Risk, &mut session, &display).unwrap();
        assert!(session.estimator().is_trained());
        assert_eq!(session.risk_history.len(), 1);
    }

    #[test]
    fn test_execute_stream_and_reset() {
        let mut h = handler();
        let mut session = h.new_session();
        let display = DisplayManager::with_flags(false, false);
        let first_id = session.id();
        h.execute(parse("/stream 4"), &mut session, &display).unwrap();
        assert_eq!(session.vitals.len(), 4);

        h.execute(Command::Reset, &mut session, &display).unwrap();
        assert!(session.vitals.is_empty());
        assert_ne!(session.id(), first_id);
    }

    #[test]
    fn test_execute_parse_missing_file_keeps_running() {
        let mut h = handler();
        let mut session = h.new_session();
        let display = DisplayManager::with_flags(false, false);
        let cont = h
            .execute(parse("/parse /definitely/not/here.txt"), &mut session, &display)
            .unwrap();
        assert!(cont);
        assert!(!session.discharge.raw_text_present);
    }

    #[test]
    fn test_pdf_detection() {
        assert!(is_pdf_path(Path::new("summary.PDF")));
        assert!(!is_pdf_path(Path::new("summary.txt")));
    }
}
