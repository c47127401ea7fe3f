//! Core library for HealthNav.
//!
//! This crate provides:
//! - Field extraction from OCR text of blood reports and nutrition labels
//! - Insight and chat prompt building for a conversational assistant
//! - OCR engine contract, with a `pure-onnx-ocr` engine behind `native`
//! - Questionnaire profile model and a JSON file report store

pub mod assistant;
pub mod error;
pub mod extract;
pub mod insight;
pub mod models;
pub mod ocr;
pub mod scan;
pub mod store;

pub use assistant::{request_insight, Assistant};
pub use error::{AssistantError, HealthnavError, OcrError, ProfileError, Result, StoreError};
pub use extract::{extract, FieldRule, ReportAssembler, RuleTable, ValueShape};
pub use insight::{build_chat_prompt, build_insight_prompt, humanize_field_name};
pub use models::config::HealthnavConfig;
pub use models::profile::{UserContext, UserProfile};
pub use models::report::{
    DocumentKind, ExtractionReport, ExtractionResult, FieldDiagnostic, FieldStatus, Measurement,
    StoredReport,
};
pub use ocr::{OcrEngine, OcrOutput, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use scan::{ScanOutcome, Scanner};
pub use store::{JsonFileStore, ProfileStore};
