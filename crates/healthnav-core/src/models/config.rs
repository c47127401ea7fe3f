//! Configuration structures for the HealthNav pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extract::DEFAULT_MAX_VALUE_GAP;

/// Main configuration for healthnav.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthnavConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Conversational assistant configuration.
    pub assistant: AssistantConfig,

    /// Profile/report storage configuration.
    pub store: StoreConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text.
    pub keep_unk: bool,

    /// Vertical distance (pixels) within which boxes count as one text row.
    pub row_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
            row_tolerance: 20.0,
        }
    }
}

impl OcrConfig {
    /// Full paths of the detection model, recognition model and dictionary.
    pub fn model_paths(&self) -> (PathBuf, PathBuf, PathBuf) {
        (
            self.model_dir.join(&self.detection_model),
            self.model_dir.join(&self.recognition_model),
            self.model_dir.join(&self.dictionary),
        )
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum characters between a keyword and its value.
    pub max_value_gap: usize,

    /// Cut malformed numbers back to their leading numeric prefix.
    pub recover_numeric_prefix: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_value_gap: DEFAULT_MAX_VALUE_GAP,
            recover_numeric_prefix: true,
        }
    }
}

/// Conversational assistant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Model identifier.
    pub model: String,

    /// API base URL.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Top-k sampling.
    pub top_k: u32,

    /// Nucleus sampling.
    pub top_p: f32,

    /// Maximum tokens in a reply.
    pub max_output_tokens: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-001".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.7,
            top_k: 1,
            top_p: 1.0,
            max_output_tokens: 2048,
            timeout_secs: 60,
        }
    }
}

impl AssistantConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

/// Profile/report storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of the store; the platform data dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// User id used when none is given.
    pub default_user: String,

    /// Keep recognized text with saved reports.
    pub save_raw_text: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_user: "local".to_string(),
            save_raw_text: true,
        }
    }
}

impl HealthnavConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: HealthnavConfig =
            serde_json::from_str(r#"{"extraction":{"max_value_gap":4}}"#).unwrap();

        assert_eq!(config.extraction.max_value_gap, 4);
        assert!(config.extraction.recover_numeric_prefix);
        assert_eq!(config.assistant.model, "gemini-2.0-flash-001");
        assert_eq!(config.store.default_user, "local");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = HealthnavConfig::default();
        config.assistant.temperature = 0.2;
        config.store.data_dir = Some(dir.path().to_path_buf());
        config.save(&path).unwrap();

        let loaded = HealthnavConfig::from_file(&path).unwrap();
        assert_eq!(loaded.assistant.temperature, 0.2);
        assert_eq!(loaded.store.data_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = HealthnavConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
