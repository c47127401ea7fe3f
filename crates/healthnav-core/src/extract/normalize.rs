//! Whitespace normalization of OCR text.

/// Collapse every whitespace run (newlines included) to one space and trim.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_lines_and_runs() {
        assert_eq!(
            normalize("  Haemoglobin\t\t13.5\r\n\nPlatelet   Count\n2.5  "),
            "Haemoglobin 13.5 Platelet Count 2.5"
        );
    }

    #[test]
    fn test_whitespace_variants_are_equal() {
        let variants = [
            "Total Fat 0g\nSodium 140mg",
            "Total  Fat\t0g  \r\n Sodium\n\n140mg",
            "\u{00a0}Total Fat 0g Sodium 140mg\u{00a0}",
        ];
        for v in variants {
            assert_eq!(normalize(v), "Total Fat 0g Sodium 140mg");
        }
    }

    #[test]
    fn test_idempotent() {
        let once = normalize(" a \n b\t\tc ");
        assert_eq!(normalize(&once), once);
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }
}
