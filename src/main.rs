//! aftercare - command-line entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::Path;

use aftercare::{
    cli::{parse_override, Args, Commands, Verbosity},
    config::Config,
    document::DischargeParser,
    monitor::Activity,
    repl::{commands::is_pdf_path, DisplayManager, ReplSession},
    report::DailyReport,
    risk::{FeatureMap, FeatureVector, ReadmissionEstimator, RiskBand},
    schedule::{adherence, schedule, MedicationEntry},
    session::{RiskAssessment, SessionContext},
    telemetry,
};

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    telemetry::init(verbosity);

    let config = Config::load(args.config.as_deref())?;
    let display = DisplayManager::with_flags(verbosity.show_progress(), verbosity.show_samples());

    match args.command.unwrap_or(Commands::Start) {
        Commands::Start => run_repl(config, display)?,
        Commands::Train { seed, samples } => {
            let mut training = config.training();
            if let Some(seed) = seed {
                training.seed = seed;
            }
            if let Some(samples) = samples {
                training.samples = samples;
            }
            let mut estimator = ReadmissionEstimator::new();
            let summary = estimator.train_with(&training)?;
            display.show_training(&summary);
        }
        Commands::Predict { file, overrides } => {
            run_predict(&config, file.as_deref(), &overrides, &display)?
        }
        Commands::Parse { file, pdf } => {
            let bytes =
                fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let parsed = DischargeParser::new().parse(&bytes, pdf || is_pdf_path(&file));
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Commands::Schedule { meds, tz } => {
            let contents = fs::read_to_string(&meds)
                .with_context(|| format!("Failed to read {}", meds.display()))?;
            let medications: Vec<MedicationEntry> = serde_json::from_str(&contents)
                .with_context(|| format!("{} is not a JSON medication list", meds.display()))?;
            let tz = tz.unwrap_or_else(|| config.patient.timezone.clone());
            let events = schedule(&medications, &tz)?;
            display.show_schedule(&events);
            display.show_adherence(&adherence(&events));
        }
        Commands::Stream {
            samples,
            activity,
            interval_ms,
            seed,
        } => run_stream(&config, samples, activity, interval_ms, seed, &display),
        Commands::Report { out } => {
            let mut session = new_session(&config);
            session.train_model(&config.training())?;
            session.assess_risk()?;
            let report = DailyReport::from_session(&session)?;
            display.show_report(&report);
            let dir = out.unwrap_or_else(|| config.report_dir());
            let path = report.write_json(&dir)?;
            display.show_success(&format!("Saved {}", path.display()));
        }
        Commands::Config => show_config(&config, args.config.as_deref(), verbosity)?,
    }

    Ok(())
}

fn new_session(config: &Config) -> SessionContext {
    SessionContext::new(config.patient_profile(), config.session_ttl())
}

fn run_repl(config: Config, display: DisplayManager) -> Result<()> {
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".aftercare")
        .join("history");

    let mut repl = ReplSession::with_history(history_path, config, display)?;
    repl.show_welcome(env!("CARGO_PKG_VERSION"));
    repl.run()
}

/// Features come from the file when given, else the defaults of a fresh
/// session; `--set` overrides are applied last.
fn run_predict(
    config: &Config,
    file: Option<&Path>,
    overrides: &[String],
    display: &DisplayManager,
) -> Result<()> {
    let mut features: FeatureMap = match file {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("{} is not a JSON object of numbers", path.display()))?
        }
        None => new_session(config).risk_features(),
    };
    for raw in overrides {
        let (name, value) = parse_override(raw).map_err(anyhow::Error::msg)?;
        features.insert(name, value);
    }

    let mut estimator = ReadmissionEstimator::new();
    estimator.train_with(&config.training())?;
    let (probability, explanation) = estimator.predict(&features)?;

    display.show_assessment(&RiskAssessment {
        probability,
        band: RiskBand::from_probability(probability),
        features: FeatureVector::from_map(&features)?,
        explanation,
    });
    Ok(())
}

fn run_stream(
    config: &Config,
    samples: Option<usize>,
    activity: Activity,
    interval_ms: Option<u64>,
    seed: Option<u64>,
    display: &DisplayManager,
) {
    let mut stream = config.stream_config(activity);
    if let Some(n) = samples {
        stream.samples = n;
    }
    if let Some(ms) = interval_ms {
        stream.interval = std::time::Duration::from_millis(ms);
    }
    stream.seed = seed;

    let mut session = new_session(config);
    let pb = display.stream_bar(stream.samples);
    let outcome = session.run_stream(&stream, &config.alert_rules(), |sample, alerts| {
        display.stream_tick(&pb, sample, alerts)
    });
    pb.finish_and_clear();

    let summary = session.vitals.summary(stream.samples);
    println!(
        "{} samples | HR median {} | SpO₂ min {} | steps {}",
        outcome.samples,
        summary.hr_rest.map_or("n/a".to_string(), |x| format!("{:.0}", x)),
        summary.spo2_min.map_or("n/a".to_string(), |x| format!("{:.1}", x)),
        summary.steps_sum
    );
    display.show_alerts(&session.alerts.newest_first());
}

fn show_config(config: &Config, explicit: Option<&Path>, verbosity: Verbosity) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };

    println!("{}", "aftercare configuration".bold().cyan());
    println!("  File:      {}", path.display());
    println!("  Verbosity: {}", verbosity.as_str());
    println!();
    println!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
    Ok(())
}
