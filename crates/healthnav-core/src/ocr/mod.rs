//! OCR engine contract and text layout.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Default vertical distance (pixels) within which boxes share a row.
pub const DEFAULT_ROW_TOLERANCE: f32 = 20.0;

/// Recognizes text in an image.
pub trait OcrEngine {
    /// Run recognition, reporting progress as a fraction in `0.0..=1.0`.
    fn recognize(
        &self,
        image: &DynamicImage,
        progress: &mut dyn FnMut(f32),
    ) -> Result<OcrOutput, OcrError>;
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Axis-aligned bounding rectangle as (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }

    fn top(&self) -> f32 {
        self.rect().1
    }

    fn left(&self) -> f32 {
        self.rect().0
    }
}

/// Result of OCR on one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrOutput {
    /// Text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Full text: boxes of a row joined by spaces, rows by newlines.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrOutput {
    /// Order `boxes` into rows and build the full text.
    pub fn from_boxes(
        boxes: Vec<TextBox>,
        row_tolerance: f32,
        image_size: (u32, u32),
        processing_time_ms: u64,
    ) -> Self {
        let rows = group_rows(boxes, row_tolerance);

        let text = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| b.text.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            boxes: rows.into_iter().flatten().collect(),
            text,
            processing_time_ms,
            image_size,
        }
    }

    /// Output for an image without any text.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            text: String::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }
}

/// Group boxes into rows top to bottom, each row sorted left to right.
///
/// A box joins the current row while its top edge is within `tolerance`
/// of the row's first box.
fn group_rows(mut boxes: Vec<TextBox>, tolerance: f32) -> Vec<Vec<TextBox>> {
    boxes.sort_by(|a, b| a.top().total_cmp(&b.top()));

    let mut rows: Vec<Vec<TextBox>> = Vec::new();
    let mut row_top = f32::NEG_INFINITY;
    for b in boxes {
        let top = b.top();
        match rows.last_mut() {
            Some(row) if top - row_top <= tolerance => row.push(b),
            _ => {
                row_top = top;
                rows.push(vec![b]);
            }
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.left().total_cmp(&b.left()));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        let (w, h) = (80.0, 18.0);
        TextBox {
            bbox: [x, y, x + w, y, x + w, y + h, x, y + h],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_rect() {
        let b = text_box(10.0, 20.0, "x");
        assert_eq!(b.rect(), (10.0, 20.0, 90.0, 38.0));
    }

    #[test]
    fn test_table_rows_join_on_one_line() {
        let boxes = vec![
            text_box(300.0, 62.0, "thou/mm3"),
            text_box(10.0, 60.0, "Total Leukocyte Count"),
            text_box(200.0, 58.0, "7.8"),
            text_box(200.0, 21.0, "13.5"),
            text_box(10.0, 20.0, "Haemoglobin"),
        ];
        let output = OcrOutput::from_boxes(boxes, DEFAULT_ROW_TOLERANCE, (640, 480), 5);

        assert_eq!(
            output.text,
            "Haemoglobin 13.5\nTotal Leukocyte Count 7.8 thou/mm3"
        );
        assert_eq!(output.boxes[0].text, "Haemoglobin");
        assert_eq!(output.boxes.len(), 5);
    }

    #[test]
    fn test_blank_boxes_skipped() {
        let boxes = vec![text_box(0.0, 0.0, "  "), text_box(0.0, 100.0, "Protein 3g")];
        let output = OcrOutput::from_boxes(boxes, DEFAULT_ROW_TOLERANCE, (100, 200), 0);
        assert_eq!(output.text, "Protein 3g");
    }

    #[test]
    fn test_empty() {
        let output = OcrOutput::from_boxes(Vec::new(), DEFAULT_ROW_TOLERANCE, (1, 1), 0);
        assert!(output.text.is_empty());
        assert!(OcrOutput::empty(3, 4).boxes.is_empty());
    }
}
