//! WASM bindings for HealthNav.
//!
//! Recognition itself runs in the browser; these bindings take its text (or
//! its boxes) and return extracted values and assistant prompts.

use wasm_bindgen::prelude::*;

use healthnav_core::ocr::DEFAULT_ROW_TOLERANCE;
use healthnav_core::{
    DocumentKind, ExtractionResult, FieldRule, OcrOutput, ReportAssembler, RuleTable, TextBox,
    UserContext,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "healthnav-wasm {} loaded",
        env!("CARGO_PKG_VERSION")
    )));
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_kind(kind: &str) -> Result<DocumentKind, JsValue> {
    kind.parse::<DocumentKind>().map_err(to_js_error)
}

/// Extract a "blood" or "nutrition" document from OCR text.
///
/// Returns `{ kind, values: [{ field, value? }], diagnostics }`.
#[wasm_bindgen]
pub fn extract_from_text(kind: &str, text: &str) -> Result<JsValue, JsValue> {
    let report = healthnav_core::extract(parse_kind(kind)?, text);
    serde_wasm_bindgen::to_value(&report).map_err(to_js_error)
}

/// Field names of the built-in rule table, in table order.
#[wasm_bindgen]
pub fn field_names(kind: &str) -> Result<js_sys::Array, JsValue> {
    let table = RuleTable::for_kind(parse_kind(kind)?);
    Ok(table.field_names().map(JsValue::from_str).collect())
}

/// Extract with caller-supplied rules: `[{ name, keywords, shape, unit? }]`.
#[wasm_bindgen]
pub fn extract_with_rules(kind: &str, rules: JsValue, text: &str) -> Result<JsValue, JsValue> {
    let rules: Vec<FieldRule> = serde_wasm_bindgen::from_value(rules).map_err(to_js_error)?;
    let table = RuleTable::new(parse_kind(kind)?, rules);

    let report = ReportAssembler::new().assemble(text, &table);
    serde_wasm_bindgen::to_value(&report).map_err(to_js_error)
}

/// Insight prompt for extracted values, or `undefined` if none are present.
#[wasm_bindgen]
pub fn build_insight_prompt(
    kind: &str,
    values: JsValue,
    context: JsValue,
) -> Result<Option<String>, JsValue> {
    let kind = parse_kind(kind)?;
    let values: ExtractionResult = serde_wasm_bindgen::from_value(values).map_err(to_js_error)?;
    let context = parse_context(context)?;

    Ok(healthnav_core::build_insight_prompt(
        kind,
        &values,
        context.as_ref(),
    ))
}

/// Prompt for a free-form chat question.
#[wasm_bindgen]
pub fn build_chat_prompt(question: &str, context: JsValue) -> Result<String, JsValue> {
    let context = parse_context(context)?;
    Ok(healthnav_core::build_chat_prompt(question, context.as_ref()))
}

/// Collapse whitespace runs to single spaces.
#[wasm_bindgen]
pub fn normalize_text(text: &str) -> String {
    healthnav_core::extract::normalize(text)
}

/// "TotalLeucocyteCount" -> "Total Leucocyte Count".
#[wasm_bindgen]
pub fn humanize_field_name(name: &str) -> String {
    healthnav_core::humanize_field_name(name)
}

/// `{ conditions, goals }` from JS; `null`/`undefined` means no context.
fn parse_context(context: JsValue) -> Result<Option<UserContext>, JsValue> {
    if context.is_null() || context.is_undefined() {
        return Ok(None);
    }
    let raw: UserContext = serde_wasm_bindgen::from_value(context).map_err(to_js_error)?;
    let context = UserContext::new(raw.conditions, raw.goals);
    Ok((!context.is_empty()).then_some(context))
}

/// Text boxes collected from a browser-side recognizer.
#[wasm_bindgen]
pub struct OcrResultJs {
    boxes: Vec<TextBox>,
    row_tolerance: f32,
}

#[wasm_bindgen]
impl OcrResultJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            boxes: Vec::new(),
            row_tolerance: DEFAULT_ROW_TOLERANCE,
        }
    }

    /// Vertical distance within which boxes are read as one row.
    #[wasm_bindgen]
    pub fn set_row_tolerance(&mut self, tolerance: f32) {
        self.row_tolerance = tolerance;
    }

    /// Add a text box to the result.
    #[wasm_bindgen]
    #[allow(clippy::too_many_arguments)]
    pub fn add_box(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        self.boxes.push(TextBox {
            text: text.to_string(),
            bbox: [x1, y1, x2, y2, x3, y3, x4, y4],
            confidence,
        });
    }

    /// Full text in reading order.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        OcrOutput::from_boxes(self.boxes.clone(), self.row_tolerance, (0, 0), 0).text
    }

    /// Extract a document from the collected boxes.
    #[wasm_bindgen]
    pub fn extract(&self, kind: &str) -> Result<JsValue, JsValue> {
        extract_from_text(kind, &self.get_text())
    }
}

impl Default for OcrResultJs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(" Total  Fat\n0g "), "Total Fat 0g");
    }

    #[wasm_bindgen_test]
    fn test_humanize_field_name() {
        assert_eq!(humanize_field_name("AbsoluteNeutrophils"), "Absolute Neutrophils");
    }

    #[wasm_bindgen_test]
    fn test_boxes_read_in_rows() {
        let mut result = OcrResultJs::new();
        result.add_box("160mg", 120.0, 52.0, 170.0, 52.0, 170.0, 70.0, 120.0, 70.0, 0.9);
        result.add_box("Sodium", 10.0, 50.0, 80.0, 50.0, 80.0, 68.0, 10.0, 68.0, 0.9);
        result.add_box("Protein", 10.0, 90.0, 80.0, 90.0, 80.0, 108.0, 10.0, 108.0, 0.9);
        result.add_box("3g", 120.0, 91.0, 140.0, 91.0, 140.0, 108.0, 120.0, 108.0, 0.9);

        assert_eq!(result.get_text(), "Sodium 160mg\nProtein 3g");
    }

    #[wasm_bindgen_test]
    fn test_field_names() {
        let names = field_names("nutrition").unwrap();
        assert_eq!(names.length(), 10);
        assert_eq!(names.get(0).as_string().as_deref(), Some("calories"));
    }

    fn report(value: JsValue) -> healthnav_core::ExtractionReport {
        serde_wasm_bindgen::from_value(value).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_extract_from_text() {
        let report = report(extract_from_text("blood", "Haemoglobin 13.5").unwrap());
        assert_eq!(report.values.get("Haemoglobin"), Some("13.5"));
        assert_eq!(report.values.present_count(), 1);
    }

    #[wasm_bindgen_test]
    fn test_extract_from_boxes() {
        let mut result = OcrResultJs::new();
        result.add_box("Sodium", 10.0, 50.0, 80.0, 50.0, 80.0, 68.0, 10.0, 68.0, 0.9);
        result.add_box("160mg", 120.0, 52.0, 170.0, 52.0, 170.0, 70.0, 120.0, 70.0, 0.9);

        let report = report(result.extract("nutrition").unwrap());
        assert_eq!(report.values.get("sodium"), Some("160 mg"));
    }

    #[wasm_bindgen_test]
    fn test_extract_with_rules() {
        let rules = vec![FieldRule::numeric("Cholesterol", "Cholesterol").with_unit("mg/dL")];
        let rules = serde_wasm_bindgen::to_value(&rules).unwrap();

        let report = report(extract_with_rules("blood", rules, "Cholesterol 190").unwrap());
        assert_eq!(report.values.get("Cholesterol"), Some("190 mg/dL"));
    }

    #[wasm_bindgen_test]
    fn test_unknown_kind() {
        assert!(extract_from_text("receipt", "Total 12").is_err());
    }

    #[wasm_bindgen_test]
    fn test_chat_prompt_without_context() {
        let prompt = build_chat_prompt("  what is HDL? ", JsValue::NULL).unwrap();
        assert_eq!(prompt, "User question: \"what is HDL?\"");
    }
}
