//! Extraction results, diagnostics and stored report records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type of scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Laboratory blood report (complete blood count).
    BloodReport,
    /// Packaged food nutrition facts label.
    NutritionLabel,
}

impl DocumentKind {
    /// Human readable label, as stored with saved reports.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::BloodReport => "Blood Report",
            DocumentKind::NutritionLabel => "Nutrition Label",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    /// Parse a kind from a loose user string ("blood", "nutrition_label", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "blood" | "blood_report" | "report" => Ok(DocumentKind::BloodReport),
            "nutrition" | "nutrition_label" | "label" => Ok(DocumentKind::NutritionLabel),
            other => Err(format!("unknown document kind: {}", other)),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One field of an extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Field name (rule table key).
    pub field: String,

    /// Sanitized value, absent if the field could not be located.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FieldValue {
    /// Parse the value into an amount and optional unit.
    pub fn measurement(&self) -> Option<Measurement> {
        self.value.as_deref().and_then(Measurement::parse)
    }
}

/// Ordered mapping from field name to extracted value.
///
/// Insertion order follows the rule table. The mapping is built by the
/// assembler and cannot be changed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: Vec<FieldValue>,
}

impl ExtractionResult {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, value: Option<String>) {
        self.fields.push(FieldValue {
            field: field.into(),
            value,
        });
    }

    /// Value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .and_then(|f| f.value.as_deref())
    }

    /// Whether the result has an entry (present or absent) for `field`.
    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// All entries in rule-table order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter()
    }

    /// Present entries only, as `(field, value)` pairs.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.value.as_deref().map(|v| (f.field.as_str(), v)))
    }

    /// Names of fields that could not be extracted.
    pub fn absent(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.value.is_none())
            .map(|f| f.field.as_str())
    }

    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    pub fn absent_count(&self) -> usize {
        self.fields.len() - self.present_count()
    }

    /// Number of entries (present and absent).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if at least one field was extracted.
    pub fn has_values(&self) -> bool {
        self.fields.iter().any(|f| f.value.is_some())
    }
}

/// A numeric value with an optional unit, e.g. `0 g` or `13.5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Measurement {
    /// Parse a sanitized value string.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().splitn(2, ' ');
        let amount = Decimal::from_str(parts.next()?).ok()?;
        let unit = parts
            .next()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        Some(Self { amount, unit })
    }
}

/// Outcome of extracting a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// Value located and passed the shape check as-is.
    Extracted,
    /// Value located; only its leading numeric prefix passed the shape check.
    Recovered,
    /// None of the rule's keywords appear in the text.
    KeywordNotFound,
    /// A keyword was found but no value followed it.
    ValueNotFound,
    /// A value was found but failed the shape check.
    Rejected,
}

impl FieldStatus {
    /// Whether the field ended up with a value.
    pub fn is_present(&self) -> bool {
        matches!(self, FieldStatus::Extracted | FieldStatus::Recovered)
    }
}

/// Per-field diagnostic metadata returned alongside the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiagnostic {
    /// Field name.
    pub field: String,

    /// What happened.
    pub status: FieldStatus,

    /// Keyword anchor that matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    /// Raw candidate text before sanitizing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
}

/// Result of running a rule table over one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Document type of the rule table used.
    pub kind: DocumentKind,

    /// Extracted values.
    pub values: ExtractionResult,

    /// One diagnostic per rule, in table order.
    pub diagnostics: Vec<FieldDiagnostic>,
}

impl ExtractionReport {
    /// Diagnostics of fields that ended up absent.
    pub fn misses(&self) -> impl Iterator<Item = &FieldDiagnostic> {
        self.diagnostics.iter().filter(|d| !d.status.is_present())
    }
}

/// A processed document as persisted in the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    /// Store-assigned identifier.
    #[serde(default)]
    pub id: String,

    /// Name of the scanned file.
    pub file_name: String,

    /// Document type.
    pub kind: DocumentKind,

    /// When the document was processed.
    pub scanned_at: DateTime<Utc>,

    /// Text recognized by OCR.
    pub raw_text: String,

    /// Extracted values.
    pub values: ExtractionResult,

    /// Assistant reply, if one was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ExtractionResult {
        let mut result = ExtractionResult::with_capacity(3);
        result.push("Haemoglobin", Some("13.5".to_string()));
        result.push("MCV", None);
        result.push("Platelet", Some("2.5".to_string()));
        result
    }

    #[test]
    fn test_present_and_absent() {
        let result = sample();

        assert_eq!(result.len(), 3);
        assert_eq!(result.present_count(), 2);
        assert_eq!(result.absent_count(), 1);
        assert_eq!(result.get("Haemoglobin"), Some("13.5"));
        assert_eq!(result.get("MCV"), None);
        assert!(result.contains_field("MCV"));
        assert_eq!(result.absent().collect::<Vec<_>>(), vec!["MCV"]);
    }

    #[test]
    fn test_serializes_in_table_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"[{"field":"Haemoglobin","value":"13.5"},{"field":"MCV"},{"field":"Platelet","value":"2.5"}]"#
        );

        let back: ExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_measurement_parse() {
        let m = Measurement::parse("140 mg").unwrap();
        assert_eq!(m.amount, Decimal::from(140));
        assert_eq!(m.unit.as_deref(), Some("mg"));

        let m = Measurement::parse("13.5").unwrap();
        assert_eq!(m.amount, Decimal::from_str("13.5").unwrap());
        assert_eq!(m.unit, None);

        assert!(Measurement::parse("n/a").is_none());
    }

    #[test]
    fn test_document_kind_from_str() {
        assert_eq!("blood".parse::<DocumentKind>(), Ok(DocumentKind::BloodReport));
        assert_eq!("Nutrition Label".parse::<DocumentKind>(), Ok(DocumentKind::NutritionLabel));
        assert!("x-ray".parse::<DocumentKind>().is_err());
        assert_eq!(DocumentKind::BloodReport.to_string(), "Blood Report");
    }
}
