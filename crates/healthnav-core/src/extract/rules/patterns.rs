//! Common regex patterns for value tokens and shape checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Plain number; a colon is a common OCR misread of the decimal point
    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"\d[\d.:]*"
    ).unwrap();

    // Number with optional unit, or a zero misread as the letter O ("Og", "Omg", "Op")
    pub static ref MEASURED_TOKEN: Regex = Regex::new(
        r"(?i)\d[\d.,:]*(?:\s*(?:mg|g|p)\b|\s*¢)?|\bo\s?(?:mg|g|p)\b"
    ).unwrap();

    // Zero misread at the start of a measured token
    pub static ref ZERO_MISREAD: Regex = Regex::new(
        r"(?i)^o(\s?(?:mg|g|p))$"
    ).unwrap();

    // Numeric part and unit suffix of a measured token
    pub static ref NUMBER_AND_SUFFIX: Regex = Regex::new(
        r"^([\d.,:]+)\s*(.*)$"
    ).unwrap();

    // Final value shape
    pub static ref DECIMAL_SHAPE: Regex = Regex::new(
        r"^\d+(?:\.\d+)?$"
    ).unwrap();

    // Leading numeric prefix, used to recover values like "94.5.1"
    pub static ref DECIMAL_PREFIX: Regex = Regex::new(
        r"^\d+(?:\.\d+)?"
    ).unwrap();
}
