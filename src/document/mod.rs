//! Discharge document intake
//!
//! Heuristic keyword extraction over text produced by an injected
//! [`TextExtractor`].

pub mod extractor;
pub mod parser;

pub use extractor::{FnExtractor, NoPdfBackend, PlainTextExtractor, TextExtractor};
pub use parser::{parse_medication_line, parse_text, DischargeParser, ParsedDischarge};
