//! Heuristic discharge summary parser
//!
//! Keyword matching only. There is no negation handling ("no history of
//! COPD" still matches), no section awareness and no unit conversion. The
//! output is unsuitable wherever a false positive or false negative would
//! carry clinical consequence.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::extractor::{NoPdfBackend, PlainTextExtractor, TextExtractor};
use crate::schedule::medication::{Frequency, MedicationEntry};

/// Diagnoses recognised in free text, in reporting order
pub const DIAGNOSIS_VOCABULARY: [&str; 7] = [
    "heart failure",
    "copd",
    "pneumonia",
    "diabetes",
    "ckd",
    "hypertension",
    "asthma",
];

const DOSE_UNITS: [&str; 2] = ["mg", "mcg"];
const FREQUENCY_TOKENS: [&str; 5] = ["qd", "bid", "tid", "qid", "daily"];

/// Length of stay reported until stay dates are parsed
pub const DEFAULT_LENGTH_OF_STAY_DAYS: u32 = 4;

/// Prior admissions reported until history sections are parsed
pub const DEFAULT_PRIOR_ADMISSIONS_1Y: u32 = 1;

/// Structured view of a discharge document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDischarge {
    pub raw_text_present: bool,
    pub diagnoses: Vec<String>,
    pub medications: Vec<MedicationEntry>,
    pub length_of_stay_days: u32,
    pub prior_admissions_1y: u32,
}

impl ParsedDischarge {
    /// Record for a document that yielded no text
    pub fn empty() -> Self {
        Self {
            raw_text_present: false,
            diagnoses: Vec::new(),
            medications: Vec::new(),
            length_of_stay_days: DEFAULT_LENGTH_OF_STAY_DAYS,
            prior_admissions_1y: DEFAULT_PRIOR_ADMISSIONS_1Y,
        }
    }
}

impl Default for ParsedDischarge {
    fn default() -> Self {
        Self::empty()
    }
}

/// Parser with injected text extractors
pub struct DischargeParser {
    text: Box<dyn TextExtractor>,
    pdf: Box<dyn TextExtractor>,
}

impl Default for DischargeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DischargeParser {
    /// Plain text decoding, no PDF backend
    pub fn new() -> Self {
        Self {
            text: Box::new(PlainTextExtractor),
            pdf: Box::new(NoPdfBackend),
        }
    }

    pub fn with_pdf_extractor(mut self, pdf: Box<dyn TextExtractor>) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn with_text_extractor(mut self, text: Box<dyn TextExtractor>) -> Self {
        self.text = text;
        self
    }

    /// Parse an upload.
    ///
    /// Extraction failures are not surfaced: they degrade to an empty
    /// record with `raw_text_present == false`.
    pub fn parse(&self, bytes: &[u8], is_pdf: bool) -> ParsedDischarge {
        let extractor = if is_pdf { &self.pdf } else { &self.text };
        match extractor.extract(bytes) {
            Ok(text) => parse_text(&text),
            Err(e) => {
                warn!(error = %e, is_pdf, "document extraction failed, using empty record");
                ParsedDischarge::empty()
            }
        }
    }
}

/// Parse already-decoded text
pub fn parse_text(text: &str) -> ParsedDischarge {
    let diagnoses = extract_diagnoses(text);
    let medications: Vec<MedicationEntry> =
        text.lines().filter_map(parse_medication_line).collect();

    debug!(
        diagnoses = diagnoses.len(),
        medications = medications.len(),
        "discharge text parsed"
    );

    ParsedDischarge {
        raw_text_present: !text.is_empty(),
        diagnoses,
        medications,
        length_of_stay_days: DEFAULT_LENGTH_OF_STAY_DAYS,
        prior_admissions_1y: DEFAULT_PRIOR_ADMISSIONS_1Y,
    }
}

/// Vocabulary terms found anywhere in the text, each at most once
pub fn extract_diagnoses(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    DIAGNOSIS_VOCABULARY
        .iter()
        .filter(|term| lower.contains(*term))
        .map(|term| term.to_string())
        .collect()
}

/// Read one line as a medication, if it looks like one.
///
/// A line qualifies when it contains a dose unit and a frequency token,
/// both as plain substrings.
pub fn parse_medication_line(line: &str) -> Option<MedicationEntry> {
    let lower = line.to_lowercase();
    let has_dose = DOSE_UNITS.iter().any(|u| lower.contains(u));
    let has_freq = FREQUENCY_TOKENS.iter().any(|t| lower.contains(t));
    if !(has_dose && has_freq) {
        return None;
    }

    let name = line.split_whitespace().next()?.to_string();
    let dose = line
        .split_whitespace()
        .filter(|w| {
            let w = w.to_lowercase();
            DOSE_UNITS.iter().any(|u| w.contains(u))
        })
        .collect::<Vec<_>>()
        .join(" ");

    Some(MedicationEntry {
        name,
        dose,
        freq: Some(line_frequency(&lower).code().to_string()),
        start: None,
        stop: None,
    })
}

/// Frequency by first-match priority: daily/qd, bid, tid, qid.
fn line_frequency(lower: &str) -> Frequency {
    if lower.contains("daily") || lower.contains("qd") {
        Frequency::OnceDaily
    } else if lower.contains("bid") {
        Frequency::TwiceDaily
    } else if lower.contains("tid") {
        Frequency::ThreeTimesDaily
    } else if lower.contains("qid") {
        Frequency::FourTimesDaily
    } else {
        // Unreachable behind the line filter above. Kept until product
        // confirms what an unmarked medication line should default to.
        Frequency::OnceDaily
    }
}
