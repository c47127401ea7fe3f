//! OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{OcrEngine, OcrOutput, TextBox};

pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
    row_tolerance: f32,
}

impl PureOcrEngine {
    /// Load the detection/recognition models and dictionary named in `config`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let (det_path, rec_path, dict_path) = config.model_paths();

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded OCR models from {}", config.model_dir.display());

        Ok(Self {
            engine,
            keep_unk: config.keep_unk,
            row_tolerance: config.row_tolerance,
        })
    }
}

impl OcrEngine for PureOcrEngine {
    fn recognize(
        &self,
        image: &DynamicImage,
        progress: &mut dyn FnMut(f32),
    ) -> Result<OcrOutput, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        debug!("Recognizing image: {}x{}", width, height);
        progress(0.0);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;
        progress(0.9);

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        let elapsed = start.elapsed().as_millis() as u64;
        let output = OcrOutput::from_boxes(boxes, self.row_tolerance, (width, height), elapsed);
        progress(1.0);

        info!(
            "OCR complete: {} text boxes in {}ms",
            output.boxes.len(),
            elapsed
        );
        Ok(output)
    }
}

/// First four exterior points of the polygon as `[x1, y1, ..., x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_models_reported() {
        let config = OcrConfig {
            model_dir: PathBuf::from("/nonexistent/healthnav-models"),
            ..OcrConfig::default()
        };
        match PureOcrEngine::from_config(&config) {
            Err(OcrError::ModelLoad(msg)) => assert!(msg.contains("det.onnx")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("engine loaded without models"),
        }
    }
}
