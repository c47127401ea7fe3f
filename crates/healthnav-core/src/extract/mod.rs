//! Field extraction from recognized text.
//!
//! Pipeline: [`normalize`] → [`FieldExtractor`] → [`ValueSanitizer`],
//! driven over a [`RuleTable`] by the [`ReportAssembler`].

mod assembler;
mod field;
mod normalize;
pub mod rules;
mod sanitize;

pub use assembler::ReportAssembler;
pub use field::{Candidate, FieldExtractor, Location, StopWords, DEFAULT_MAX_VALUE_GAP};
pub use normalize::normalize;
pub use rules::{FieldRule, RuleTable, ValueShape, BLOOD_REPORT_RULES, NUTRITION_LABEL_RULES};
pub use sanitize::{Sanitized, ValueSanitizer};

use crate::models::report::{DocumentKind, ExtractionReport};

/// Extract a document of `kind` from raw OCR text with default settings.
pub fn extract(kind: DocumentKind, text: &str) -> ExtractionReport {
    ReportAssembler::new().assemble(text, RuleTable::for_kind(kind))
}
