//! Image-to-report pipeline: OCR followed by field extraction.

use std::path::Path;

use chrono::{DateTime, Utc};
use image::DynamicImage;
use tracing::{info, warn};

use crate::error::{HealthnavError, Result};
use crate::extract::{ReportAssembler, RuleTable};
use crate::models::config::ExtractionConfig;
use crate::models::report::{DocumentKind, ExtractionReport, StoredReport};
use crate::ocr::OcrEngine;

/// Result of scanning one document.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Text handed to the extractor.
    pub raw_text: String,

    /// Extracted values and diagnostics.
    pub report: ExtractionReport,

    /// When the scan finished.
    pub scanned_at: DateTime<Utc>,
}

impl ScanOutcome {
    /// Extract from already recognized text.
    pub fn from_text(assembler: &ReportAssembler, text: &str, kind: DocumentKind) -> Self {
        Self {
            raw_text: text.to_string(),
            report: assembler.assemble(text, RuleTable::for_kind(kind)),
            scanned_at: Utc::now(),
        }
    }

    /// Turn the outcome into a record for the profile store.
    pub fn into_record(self, file_name: impl Into<String>) -> StoredReport {
        StoredReport {
            id: String::new(),
            file_name: file_name.into(),
            kind: self.report.kind,
            scanned_at: self.scanned_at,
            raw_text: self.raw_text,
            values: self.report.values,
            insight: None,
        }
    }
}

/// Runs an OCR engine and the report assembler over documents.
pub struct Scanner<E> {
    engine: E,
    assembler: ReportAssembler,
}

impl<E: OcrEngine> Scanner<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            assembler: ReportAssembler::new(),
        }
    }

    pub fn with_extraction(mut self, config: &ExtractionConfig) -> Self {
        self.assembler = ReportAssembler::from_config(config);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Recognize and extract a document image.
    ///
    /// OCR failures are errors. A readable image without any recognizable
    /// field is an `Ok` outcome whose values are all absent.
    pub fn scan_image(
        &self,
        image: &DynamicImage,
        kind: DocumentKind,
        progress: &mut dyn FnMut(f32),
    ) -> Result<ScanOutcome> {
        let output = self.engine.recognize(image, progress).map_err(|e| {
            warn!("OCR failed: {}", e);
            HealthnavError::Ocr(e)
        })?;

        info!(
            "Recognized {} text boxes in {}ms",
            output.boxes.len(),
            output.processing_time_ms
        );
        Ok(self.scan_text(&output.text, kind))
    }

    /// Load an image from disk and scan it.
    pub fn scan_file(
        &self,
        path: &Path,
        kind: DocumentKind,
        progress: &mut dyn FnMut(f32),
    ) -> Result<ScanOutcome> {
        let image = load_image(path)?;
        self.scan_image(&image, kind, progress)
    }

    /// Extract from already recognized text.
    pub fn scan_text(&self, text: &str, kind: DocumentKind) -> ScanOutcome {
        ScanOutcome::from_text(&self.assembler, text, kind)
    }
}

/// Decode an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path)?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::ocr::OcrOutput;
    use pretty_assertions::assert_eq;

    struct FixedText(&'static str);

    impl OcrEngine for FixedText {
        fn recognize(
            &self,
            image: &DynamicImage,
            progress: &mut dyn FnMut(f32),
        ) -> std::result::Result<OcrOutput, OcrError> {
            progress(0.5);
            progress(1.0);
            let mut output = OcrOutput::empty(image.width(), image.height());
            output.text = self.0.to_string();
            Ok(output)
        }
    }

    struct Broken;

    impl OcrEngine for Broken {
        fn recognize(
            &self,
            _image: &DynamicImage,
            _progress: &mut dyn FnMut(f32),
        ) -> std::result::Result<OcrOutput, OcrError> {
            Err(OcrError::InvalidImage("unsupported format".into()))
        }
    }

    fn blank() -> DynamicImage {
        DynamicImage::new_rgb8(4, 4)
    }

    #[test]
    fn test_scan_reports_progress_and_extracts() {
        let scanner = Scanner::new(FixedText("Sodium 160mg\nProtein 3g"));
        let mut seen = Vec::new();
        let outcome = scanner
            .scan_image(&blank(), DocumentKind::NutritionLabel, &mut |p| seen.push(p))
            .unwrap();

        assert_eq!(seen, vec![0.5, 1.0]);
        assert_eq!(outcome.report.values.get("sodium"), Some("160 mg"));
        assert_eq!(outcome.report.values.get("protein"), Some("3 g"));

        let record = outcome.into_record("label.jpg");
        assert_eq!(record.file_name, "label.jpg");
        assert_eq!(record.kind, DocumentKind::NutritionLabel);
        assert_eq!(record.raw_text, "Sodium 160mg\nProtein 3g");
    }

    #[test]
    fn test_nothing_extracted_is_not_an_error() {
        let scanner = Scanner::new(FixedText("a photo of a cat"));
        let outcome = scanner
            .scan_image(&blank(), DocumentKind::BloodReport, &mut |_| {})
            .unwrap();
        assert!(!outcome.report.values.has_values());
        assert_eq!(outcome.report.values.len(), 20);
    }

    #[test]
    fn test_ocr_failure_is_an_error() {
        let scanner = Scanner::new(Broken);
        let err = scanner
            .scan_image(&blank(), DocumentKind::BloodReport, &mut |_| {})
            .unwrap_err();
        assert!(matches!(err, HealthnavError::Ocr(OcrError::InvalidImage(_))));
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.png");
        std::fs::write(&path, b"not an image").unwrap();

        let scanner = Scanner::new(FixedText(""));
        let err = scanner
            .scan_file(&path, DocumentKind::BloodReport, &mut |_| {})
            .unwrap_err();
        assert!(matches!(err, HealthnavError::Image(_)));
    }
}
