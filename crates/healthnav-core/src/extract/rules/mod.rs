//! Declarative field rules and the built-in rule tables.

mod blood;
mod nutrition;
pub mod patterns;

pub use blood::BLOOD_REPORT_RULES;
pub use nutrition::NUTRITION_LABEL_RULES;

use serde::{Deserialize, Serialize};

use crate::models::report::DocumentKind;

/// Expected shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Digits with an optional decimal point (or a colon misread as one).
    Numeric,
    /// Numeric with an optional `g`/`mg` suffix; accepts OCR zero-misreads like `Og`.
    Measured,
}

/// Detection rule for one extractable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Field key in the extraction result.
    pub name: String,

    /// Keyword anchors, tried in order. Later entries are fallbacks.
    pub keywords: Vec<String>,

    /// Value pattern.
    pub shape: ValueShape,

    /// Unit appended to purely numeric values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl FieldRule {
    /// Rule for a plain number, anchored on `keyword`.
    pub fn numeric(name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: vec![keyword.into()],
            shape: ValueShape::Numeric,
            unit: None,
        }
    }

    /// Rule for a quantity with a unit, anchored on `keyword`.
    pub fn measured(
        name: impl Into<String>,
        keyword: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            keywords: vec![keyword.into()],
            shape: ValueShape::Measured,
            unit: Some(unit.into()),
        }
    }

    /// Add a fallback keyword, consulted only if earlier ones yield nothing.
    pub fn or_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Set the declared unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Ordered, immutable set of rules for one document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    pub kind: DocumentKind,
    pub rules: Vec<FieldRule>,
}

impl RuleTable {
    pub fn new(kind: DocumentKind, rules: Vec<FieldRule>) -> Self {
        Self { kind, rules }
    }

    /// Built-in table for a document kind.
    pub fn for_kind(kind: DocumentKind) -> &'static RuleTable {
        match kind {
            DocumentKind::BloodReport => &BLOOD_REPORT_RULES,
            DocumentKind::NutritionLabel => &NUTRITION_LABEL_RULES,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Field names in table order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }
}
