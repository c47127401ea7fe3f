//! Renders extracted values into prompts for the conversational assistant.

use crate::models::profile::UserContext;
use crate::models::report::{DocumentKind, ExtractionResult};

const BLOOD_REPORT_INTRO: &str = "Analyze these blood report values:";
const BLOOD_REPORT_SUFFIX: &str = "Explain 1-2 key results simply. Give one general wellness tip. \
DO NOT diagnose or give medical advice. Start with \"Based on extracted values:\" End with disclaimer.";

const NUTRITION_LABEL_INTRO: &str = "Analyze the nutritional info:";
const NUTRITION_LABEL_SUFFIX: &str = "Is it suitable? Explain concerns (sodium, sugar etc.) \
related to profile simply (2-3 sentences). Add disclaimer. NO medical advice.";

const CHAT_CONTEXT_HEADER: &str =
    "User Context (for background info, do NOT diagnose based on this):";

/// Insert a space before every uppercase letter after the first character.
///
/// `TotalLeucocyteCount` becomes `Total Leucocyte Count`; acronyms are
/// spelled out letter by letter (`MCV` becomes `M C V`).
pub fn humanize_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Build the instruction prompt for an extraction result.
///
/// Returns `None` when no field has a value.
pub fn build_insight_prompt(
    kind: DocumentKind,
    result: &ExtractionResult,
    context: Option<&UserContext>,
) -> Option<String> {
    if !result.has_values() {
        return None;
    }

    let (intro, suffix) = match kind {
        DocumentKind::BloodReport => (BLOOD_REPORT_INTRO, BLOOD_REPORT_SUFFIX),
        DocumentKind::NutritionLabel => (NUTRITION_LABEL_INTRO, NUTRITION_LABEL_SUFFIX),
    };

    let mut lines = vec![intro.to_string()];
    lines.extend(
        result
            .present()
            .map(|(field, value)| format!("- {}: {}", humanize_field_name(field), value)),
    );

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        lines.push("User Context:".to_string());
        if !context.conditions.is_empty() {
            lines.push(format!("- Conditions: {}", context.conditions.join(", ")));
        }
        if !context.goals.is_empty() {
            lines.push(format!("- Goals: {}", context.goals.join(", ")));
        }
    }

    lines.push(suffix.to_string());
    Some(lines.join("\n"))
}

/// Build the prompt for a free-form question.
pub fn build_chat_prompt(question: &str, context: Option<&UserContext>) -> String {
    let mut prompt = format!("User question: \"{}\"", question.trim());

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(CHAT_CONTEXT_HEADER);
        prompt.push('\n');
        if !context.conditions.is_empty() {
            prompt.push_str(&format!("- Health Conditions: {}\n", context.conditions.join(", ")));
        }
        if !context.goals.is_empty() {
            prompt.push_str(&format!("- Health Goals: {}\n", context.goals.join(", ")));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FieldRule, ReportAssembler, RuleTable};
    use pretty_assertions::assert_eq;

    fn blood(text: &str) -> ExtractionResult {
        let table = RuleTable::new(
            DocumentKind::BloodReport,
            vec![
                FieldRule::numeric("Haemoglobin", "Haemoglobin"),
                FieldRule::numeric("TotalLeucocyteCount", "Total Leucocyte Count"),
                FieldRule::numeric("MCV", "MCV"),
            ],
        );
        ReportAssembler::new().assemble(text, &table).values
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize_field_name("TotalLeucocyteCount"), "Total Leucocyte Count");
        assert_eq!(humanize_field_name("totalFat"), "total Fat");
        assert_eq!(humanize_field_name("Haemoglobin"), "Haemoglobin");
        assert_eq!(humanize_field_name("RDWCv"), "R D W Cv");
        assert_eq!(humanize_field_name(""), "");
    }

    #[test]
    fn test_blood_prompt() {
        let result = blood("Haemoglobin 13.5 Total Leucocyte Count 7.8");
        let prompt = build_insight_prompt(DocumentKind::BloodReport, &result, None).unwrap();

        assert_eq!(
            prompt,
            "Analyze these blood report values:\n\
             - Haemoglobin: 13.5\n\
             - Total Leucocyte Count: 7.8\n\
             Explain 1-2 key results simply. Give one general wellness tip. DO NOT diagnose or \
             give medical advice. Start with \"Based on extracted values:\" End with disclaimer."
        );
    }

    #[test]
    fn test_context_block() {
        let result = blood("Haemoglobin 13.5");
        let context = UserContext::new(
            vec!["Diabetes".into(), "Hypertension".into()],
            vec!["Lose weight".into()],
        );
        let prompt =
            build_insight_prompt(DocumentKind::BloodReport, &result, Some(&context)).unwrap();

        assert!(prompt.contains(
            "- Haemoglobin: 13.5\nUser Context:\n- Conditions: Diabetes, Hypertension\n- Goals: Lose weight\n"
        ));

        let goals_only = UserContext::new(vec!["None".into()], vec!["Improve sleep".into()]);
        let prompt =
            build_insight_prompt(DocumentKind::BloodReport, &result, Some(&goals_only)).unwrap();
        assert!(prompt.contains("User Context:\n- Goals: Improve sleep\n"));
        assert!(!prompt.contains("Conditions"));

        let empty = UserContext::default();
        let prompt = build_insight_prompt(DocumentKind::BloodReport, &result, Some(&empty)).unwrap();
        assert!(!prompt.contains("User Context"));
    }

    #[test]
    fn test_nutrition_prompt() {
        let table = RuleTable::for_kind(DocumentKind::NutritionLabel);
        let result = ReportAssembler::new()
            .assemble("Sodium 160mg Protein 3g", table)
            .values;
        let prompt = build_insight_prompt(DocumentKind::NutritionLabel, &result, None).unwrap();

        assert!(prompt.starts_with("Analyze the nutritional info:\n- sodium: 160 mg\n- protein: 3 g\n"));
        assert!(prompt.ends_with("Add disclaimer. NO medical advice."));
    }

    #[test]
    fn test_no_values_no_prompt() {
        let result = blood("nothing readable");
        assert!(!result.is_empty());
        assert_eq!(build_insight_prompt(DocumentKind::BloodReport, &result, None), None);
    }

    #[test]
    fn test_chat_prompt() {
        assert_eq!(
            build_chat_prompt("  Is 13.5 haemoglobin normal? ", None),
            "User question: \"Is 13.5 haemoglobin normal?\""
        );

        let context = UserContext::new(vec!["Thyroid Disorder".into()], vec![]);
        assert_eq!(
            build_chat_prompt("What should I eat?", Some(&context)),
            "User question: \"What should I eat?\"\n\n\
             User Context (for background info, do NOT diagnose based on this):\n\
             - Health Conditions: Thyroid Disorder\n"
        );
    }
}
