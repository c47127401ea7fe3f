//! Runs a rule table over a document and assembles the structured result.

use tracing::{debug, info};

use super::field::{FieldExtractor, Location, StopWords};
use super::normalize::normalize;
use super::rules::RuleTable;
use super::sanitize::{Sanitized, ValueSanitizer};
use crate::models::config::ExtractionConfig;
use crate::models::report::{ExtractionReport, ExtractionResult, FieldDiagnostic, FieldStatus};

/// Orchestrates normalizer, extractor and sanitizer across a rule table.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    extractor: FieldExtractor,
    sanitizer: ValueSanitizer,
}

impl ReportAssembler {
    /// Create an assembler with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an assembler from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            extractor: FieldExtractor::new().with_max_gap(config.max_value_gap),
            sanitizer: ValueSanitizer::new().with_prefix_recovery(config.recover_numeric_prefix),
        }
    }

    /// Extract every field of `table` from raw OCR text.
    ///
    /// Never fails: fields that cannot be located or validated are absent,
    /// and empty input yields an all-absent result.
    pub fn assemble(&self, text: &str, table: &RuleTable) -> ExtractionReport {
        let normalized = normalize(text);
        let stops = StopWords::from_table(table);

        let mut values = ExtractionResult::with_capacity(table.len());
        let mut diagnostics = Vec::with_capacity(table.len());

        for rule in &table.rules {
            let diagnostic = match self.extractor.locate_with_stops(&normalized, rule, &stops) {
                Location::Found(candidate) => {
                    let sanitized = self.sanitizer.sanitize(rule, &candidate.raw);
                    let status = match sanitized {
                        Sanitized::Clean(_) => FieldStatus::Extracted,
                        Sanitized::Recovered(_) => {
                            debug!(
                                "{}: kept numeric prefix of \"{}\"",
                                rule.name, candidate.raw
                            );
                            FieldStatus::Recovered
                        }
                        Sanitized::Rejected => {
                            debug!("{}: rejected \"{}\"", rule.name, candidate.raw);
                            FieldStatus::Rejected
                        }
                    };
                    values.push(rule.name.clone(), sanitized.into_value());
                    FieldDiagnostic {
                        field: rule.name.clone(),
                        status,
                        keyword: Some(candidate.keyword),
                        candidate: Some(candidate.raw),
                    }
                }
                Location::ValueNotFound { keyword } => {
                    debug!("{}: no value after \"{}\"", rule.name, keyword);
                    values.push(rule.name.clone(), None);
                    FieldDiagnostic {
                        field: rule.name.clone(),
                        status: FieldStatus::ValueNotFound,
                        keyword: Some(keyword),
                        candidate: None,
                    }
                }
                Location::KeywordNotFound => {
                    debug!("{}: keyword not found", rule.name);
                    values.push(rule.name.clone(), None);
                    FieldDiagnostic {
                        field: rule.name.clone(),
                        status: FieldStatus::KeywordNotFound,
                        keyword: None,
                        candidate: None,
                    }
                }
            };
            diagnostics.push(diagnostic);
        }

        info!(
            "Extracted {}/{} {} fields",
            values.present_count(),
            table.len(),
            table.kind
        );

        ExtractionReport {
            kind: table.kind,
            values,
            diagnostics,
        }
    }

    /// Result for a document that could not be read at all.
    pub fn empty(table: &RuleTable) -> ExtractionReport {
        let mut values = ExtractionResult::with_capacity(table.len());
        let mut diagnostics = Vec::with_capacity(table.len());
        for rule in &table.rules {
            values.push(rule.name.clone(), None);
            diagnostics.push(FieldDiagnostic {
                field: rule.name.clone(),
                status: FieldStatus::KeywordNotFound,
                keyword: None,
                candidate: None,
            });
        }
        ExtractionReport {
            kind: table.kind,
            values,
            diagnostics,
        }
    }
}
