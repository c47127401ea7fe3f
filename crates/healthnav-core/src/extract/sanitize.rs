//! Per-field cleanup and unit normalization of raw value tokens.

use super::rules::patterns::{DECIMAL_PREFIX, DECIMAL_SHAPE, NUMBER_AND_SUFFIX, ZERO_MISREAD};
use super::rules::FieldRule;

/// Outcome of sanitizing a raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// The whole token passed the shape check.
    Clean(String),
    /// Only a leading numeric prefix passed the shape check.
    Recovered(String),
    /// Nothing usable.
    Rejected,
}

impl Sanitized {
    /// The sanitized value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Sanitized::Clean(v) | Sanitized::Recovered(v) => Some(v),
            Sanitized::Rejected => None,
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            Sanitized::Clean(v) | Sanitized::Recovered(v) => Some(v),
            Sanitized::Rejected => None,
        }
    }
}

/// Deterministic string transforms turning a raw token into a field value.
#[derive(Debug, Clone)]
pub struct ValueSanitizer {
    recover_prefix: bool,
}

impl ValueSanitizer {
    pub fn new() -> Self {
        Self {
            recover_prefix: true,
        }
    }

    /// Set whether a malformed number may be cut back to its leading prefix.
    pub fn with_prefix_recovery(mut self, recover: bool) -> Self {
        self.recover_prefix = recover;
        self
    }

    /// Sanitize `raw` according to `rule`.
    pub fn sanitize(&self, rule: &FieldRule, raw: &str) -> Sanitized {
        let token = ZERO_MISREAD.replace(raw.trim(), "0$1");

        let Some(caps) = NUMBER_AND_SUFFIX.captures(&token) else {
            return Sanitized::Rejected;
        };
        let number = clean_number(&caps[1]);
        let suffix = caps.get(2).map_or("", |m| m.as_str());

        let (number, recovered) = if DECIMAL_SHAPE.is_match(&number) {
            (number, false)
        } else if self.recover_prefix {
            match DECIMAL_PREFIX.find(&number) {
                Some(m) => (m.as_str().to_string(), true),
                None => return Sanitized::Rejected,
            }
        } else {
            return Sanitized::Rejected;
        };

        let value = match resolve_unit(suffix, rule.unit.as_deref()) {
            Some(unit) => format!("{} {}", number, unit),
            None => number,
        };

        if recovered {
            Sanitized::Recovered(value)
        } else {
            Sanitized::Clean(value)
        }
    }
}

impl Default for ValueSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize decimal and thousands separators of a numeric string.
///
/// `:` is a misread decimal point. A `,` between a digit and exactly three
/// digits groups thousands and is dropped; any other `,` is a decimal comma.
/// Trailing separators are stripped.
fn clean_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    let mut out = String::with_capacity(number.len());

    for (i, &c) in chars.iter().enumerate() {
        match c {
            ':' => out.push('.'),
            ',' => {
                let group = chars[i + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
                let after_digit = i > 0 && chars[i - 1].is_ascii_digit();
                if !(after_digit && group == 3) {
                    out.push('.');
                }
            }
            c => out.push(c),
        }
    }

    out.trim_end_matches('.').to_string()
}

/// Pick the unit for a value from its captured suffix and the declared unit.
fn resolve_unit(suffix: &str, declared: Option<&str>) -> Option<String> {
    let suffix = suffix.trim().to_lowercase();
    match suffix.as_str() {
        "g" | "mg" => Some(suffix),
        // "p" is how OCR tends to read a "g" after a zero
        "p" => Some("g".to_string()),
        _ => declared.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fat() -> FieldRule {
        FieldRule::measured("totalFat", "Total Fat", "g")
    }

    fn sodium() -> FieldRule {
        FieldRule::measured("sodium", "Sodium", "mg")
    }

    fn haemoglobin() -> FieldRule {
        FieldRule::numeric("Haemoglobin", "Haemoglobin")
    }

    #[test]
    fn test_zero_misreads() {
        let s = ValueSanitizer::new();
        assert_eq!(s.sanitize(&fat(), "0g"), Sanitized::Clean("0 g".into()));
        assert_eq!(s.sanitize(&fat(), "Og"), Sanitized::Clean("0 g".into()));
        assert_eq!(s.sanitize(&fat(), "og"), Sanitized::Clean("0 g".into()));
        assert_eq!(s.sanitize(&fat(), "Op"), Sanitized::Clean("0 g".into()));
        assert_eq!(s.sanitize(&sodium(), "Omg"), Sanitized::Clean("0 mg".into()));
    }

    #[test]
    fn test_space_before_unit() {
        let s = ValueSanitizer::new();
        assert_eq!(s.sanitize(&sodium(), "140mg"), Sanitized::Clean("140 mg".into()));
        assert_eq!(s.sanitize(&sodium(), "140 mg"), Sanitized::Clean("140 mg".into()));
        assert_eq!(s.sanitize(&sodium(), "140MG"), Sanitized::Clean("140 mg".into()));
    }

    #[test]
    fn test_declared_unit_appended() {
        let s = ValueSanitizer::new();
        assert_eq!(s.sanitize(&sodium(), "140"), Sanitized::Clean("140 mg".into()));
        assert_eq!(s.sanitize(&sodium(), "140¢"), Sanitized::Clean("140 mg".into()));
        assert_eq!(s.sanitize(&haemoglobin(), "13.5"), Sanitized::Clean("13.5".into()));

        let rule = FieldRule::numeric("Cholesterol", "Cholesterol").with_unit("mg/dL");
        assert_eq!(s.sanitize(&rule, "190"), Sanitized::Clean("190 mg/dL".into()));
    }

    #[test]
    fn test_separators() {
        let s = ValueSanitizer::new();
        assert_eq!(s.sanitize(&haemoglobin(), "13:5"), Sanitized::Clean("13.5".into()));
        assert_eq!(s.sanitize(&haemoglobin(), "13.5."), Sanitized::Clean("13.5".into()));
        assert_eq!(s.sanitize(&haemoglobin(), "94:"), Sanitized::Clean("94".into()));
        assert_eq!(s.sanitize(&sodium(), "1,200mg"), Sanitized::Clean("1200 mg".into()));
        assert_eq!(s.sanitize(&fat(), "1,5g"), Sanitized::Clean("1.5 g".into()));
    }

    #[test]
    fn test_prefix_recovery() {
        let s = ValueSanitizer::new();
        assert_eq!(s.sanitize(&haemoglobin(), "13.5.2"), Sanitized::Recovered("13.5".into()));
        assert_eq!(s.sanitize(&haemoglobin(), "94..1"), Sanitized::Recovered("94".into()));

        let strict = ValueSanitizer::new().with_prefix_recovery(false);
        assert_eq!(strict.sanitize(&haemoglobin(), "13.5.2"), Sanitized::Rejected);
    }

    #[test]
    fn test_rejects_non_numeric() {
        let s = ValueSanitizer::new();
        assert_eq!(s.sanitize(&haemoglobin(), "abc"), Sanitized::Rejected);
        assert_eq!(s.sanitize(&haemoglobin(), ""), Sanitized::Rejected);
        assert_eq!(Sanitized::Rejected.value(), None);
    }
}
