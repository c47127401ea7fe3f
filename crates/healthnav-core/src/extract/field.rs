//! Keyword-anchored value location.

use regex::{Match, Regex};
use tracing::trace;

use super::rules::patterns::{MEASURED_TOKEN, NUMERIC_TOKEN};
use super::rules::{FieldRule, RuleTable, ValueShape};

/// Default maximum number of characters between a keyword and its value.
pub const DEFAULT_MAX_VALUE_GAP: usize = 16;

/// A value token found after a keyword anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Keyword that anchored the value.
    pub keyword: String,
    /// Raw token text, before sanitizing.
    pub raw: String,
    /// Byte range of the token in the searched text.
    pub position: (usize, usize),
}

/// Outcome of locating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A value token follows one of the keywords.
    Found(Candidate),
    /// A keyword is present but no value token follows it.
    ValueNotFound { keyword: String },
    /// None of the keywords occur in the text.
    KeywordNotFound,
}

/// Keywords of a rule table that end a keyword-to-value gap.
///
/// A value is never taken from behind another field's label, so a field
/// whose own value cell is missing cannot pick up its neighbour's.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    patterns: Vec<(String, Regex)>,
}

impl StopWords {
    /// No stop-words: only the gap length and digit checks apply.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every keyword of every rule in `table`.
    pub fn from_table(table: &RuleTable) -> Self {
        let mut patterns: Vec<(String, Regex)> = Vec::new();
        for keyword in table.rules.iter().flat_map(|r| &r.keywords) {
            if patterns.iter().any(|(k, _)| k.eq_ignore_ascii_case(keyword)) {
                continue;
            }
            if let Some(pattern) = keyword_pattern(keyword) {
                patterns.push((keyword.clone(), pattern));
            }
        }
        Self { patterns }
    }

    /// Whether `gap` holds a keyword of another rule than `rule`.
    fn interrupts(&self, gap: &str, rule: &FieldRule) -> bool {
        self.patterns
            .iter()
            .filter(|(keyword, _)| {
                !rule.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword))
            })
            .any(|(_, pattern)| {
                pattern
                    .find_iter(gap)
                    .any(|m| !gap[m.end()..].chars().next().is_some_and(char::is_alphabetic))
            })
    }
}

/// Locates field values by anchoring on their keywords and scanning forward.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    max_gap: usize,
}

impl FieldExtractor {
    /// Create an extractor with the default gap.
    pub fn new() -> Self {
        Self {
            max_gap: DEFAULT_MAX_VALUE_GAP,
        }
    }

    /// Set how many characters may separate a keyword from its value.
    pub fn with_max_gap(mut self, max_gap: usize) -> Self {
        self.max_gap = max_gap;
        self
    }

    /// Locate the value for `rule` in normalized text.
    ///
    /// Keywords are tried in order; for each keyword its occurrences are
    /// tried left to right and the first one followed by a value wins.
    pub fn locate(&self, text: &str, rule: &FieldRule) -> Location {
        self.locate_with_stops(text, rule, &StopWords::none())
    }

    /// Like [`FieldExtractor::locate`], but a gap holding one of `stops`
    /// (other than the rule's own keywords) yields no value.
    pub fn locate_with_stops(&self, text: &str, rule: &FieldRule, stops: &StopWords) -> Location {
        let token = token_pattern(rule.shape);
        let mut seen: Option<&str> = None;

        for keyword in &rule.keywords {
            let Some(anchor) = keyword_pattern(keyword) else {
                continue;
            };

            for m in anchor.find_iter(text) {
                // "MeH" must not anchor inside "MeHe"
                if text[m.end()..].chars().next().is_some_and(char::is_alphabetic) {
                    continue;
                }
                seen.get_or_insert(keyword.as_str());

                if let Some(value) = self.value_after(text, m.end(), token, rule, stops) {
                    trace!("{}: '{}' anchored '{}'", rule.name, keyword, value.as_str());
                    return Location::Found(Candidate {
                        keyword: keyword.clone(),
                        raw: value.as_str().to_string(),
                        position: (value.start(), value.end()),
                    });
                }
            }
        }

        match seen {
            Some(keyword) => Location::ValueNotFound {
                keyword: keyword.to_string(),
            },
            None => Location::KeywordNotFound,
        }
    }

    fn value_after<'t>(
        &self,
        text: &'t str,
        start: usize,
        token: &Regex,
        rule: &FieldRule,
        stops: &StopWords,
    ) -> Option<Match<'t>> {
        let m = token.find_at(text, start)?;
        let gap = &text[start..m.start()];
        if gap.chars().count() > self.max_gap || gap.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        if stops.interrupts(gap, rule) {
            trace!("{}: gap \"{}\" holds another field's label", rule.name, gap);
            return None;
        }
        Some(m)
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn token_pattern(shape: ValueShape) -> &'static Regex {
    match shape {
        ValueShape::Numeric => &NUMERIC_TOKEN,
        ValueShape::Measured => &MEASURED_TOKEN,
    }
}

/// Case-insensitive literal pattern for a keyword.
fn keyword_pattern(keyword: &str) -> Option<Regex> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(keyword))).ok()
}
