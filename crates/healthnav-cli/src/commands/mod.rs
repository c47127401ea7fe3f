//! Subcommands and the helpers they share.

pub mod ask;
pub mod batch;
pub mod config;
pub mod history;
pub mod profile;
pub mod scan;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use healthnav_core::models::config::HealthnavConfig;
use healthnav_core::models::report::ExtractionReport;
use healthnav_core::{humanize_field_name, JsonFileStore, ProfileStore, PureOcrEngine, UserContext};

/// Settings and locations resolved from global flags.
pub struct Context {
    pub config: HealthnavConfig,
    pub config_path: PathBuf,
    pub user: String,
    pub data_dir: PathBuf,
}

impl Context {
    /// Resolve the config file, user and data directory.
    pub fn load(
        config_path: Option<PathBuf>,
        user: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let explicit = config_path.is_some();
        let config_path = config_path.unwrap_or_else(default_config_path);

        let config = if config_path.exists() {
            debug!("Loading config from {}", config_path.display());
            HealthnavConfig::from_file(&config_path)
                .with_context(|| format!("Failed to read config {}", config_path.display()))?
        } else {
            if explicit {
                warn!("Config file {} not found, using defaults", config_path.display());
            }
            HealthnavConfig::default()
        };

        let user = user.unwrap_or_else(|| config.store.default_user.clone());
        let data_dir = data_dir
            .or_else(|| config.store.data_dir.clone())
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            config,
            config_path,
            user,
            data_dir,
        })
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_dir)
    }

    /// Prompt context from the user's saved profile, if any.
    pub fn user_context(&self) -> anyhow::Result<Option<UserContext>> {
        let profile = self.store().load_profile(&self.user)?;
        Ok(profile.map(|p| p.context()).filter(|c| !c.is_empty()))
    }

    /// Load the OCR engine, optionally from a different model directory.
    pub fn ocr_engine(&self, model_dir: Option<&Path>) -> anyhow::Result<PureOcrEngine> {
        let mut ocr = self.config.ocr.clone();
        if let Some(dir) = model_dir {
            ocr.model_dir = dir.to_path_buf();
        }
        PureOcrEngine::from_config(&ocr).with_context(|| {
            format!(
                "Failed to load OCR models from {}. Set ocr.model_dir or pass --model-dir.",
                ocr.model_dir.display()
            )
        })
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("healthnav")
        .join("config.json")
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("healthnav")
}

/// Output format for extracted values.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(serde::Serialize)]
struct ReportOutput<'a> {
    file: &'a str,
    kind: healthnav_core::DocumentKind,
    values: &'a healthnav_core::ExtractionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<&'a [healthnav_core::FieldDiagnostic]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insight: Option<&'a str>,
}

/// Render an extraction report.
pub fn format_report(
    file: &str,
    report: &ExtractionReport,
    insight: Option<&str>,
    format: OutputFormat,
    diagnostics: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let output = ReportOutput {
                file,
                kind: report.kind,
                values: &report.values,
                diagnostics: diagnostics.then_some(report.diagnostics.as_slice()),
                insight,
            };
            Ok(serde_json::to_string_pretty(&output)?)
        }
        OutputFormat::Csv => format_csv(report, diagnostics),
        OutputFormat::Text => Ok(format_text(file, report, insight, diagnostics)),
    }
}

fn format_csv(report: &ExtractionReport, diagnostics: bool) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if diagnostics {
        wtr.write_record(["field", "value", "status", "keyword", "candidate"])?;
    } else {
        wtr.write_record(["field", "value"])?;
    }

    for (i, entry) in report.values.iter().enumerate() {
        let value = entry.value.as_deref().unwrap_or("");
        if let Some(diag) = report.diagnostics.get(i).filter(|_| diagnostics) {
            let status = serde_json::to_value(diag.status)?;
            wtr.write_record([
                entry.field.as_str(),
                value,
                status.as_str().unwrap_or(""),
                diag.keyword.as_deref().unwrap_or(""),
                diag.candidate.as_deref().unwrap_or(""),
            ])?;
        } else {
            wtr.write_record([entry.field.as_str(), value])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(
    file: &str,
    report: &ExtractionReport,
    insight: Option<&str>,
    diagnostics: bool,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}: {}\n", report.kind, file));
    output.push_str(&format!(
        "Extracted {}/{} fields\n\n",
        report.values.present_count(),
        report.values.len()
    ));

    for entry in report.values.iter() {
        let value = entry.value.as_deref().unwrap_or("not found");
        output.push_str(&format!("  {}: {}\n", display_field(&entry.field), value));
    }

    if diagnostics {
        let misses: Vec<_> = report.misses().collect();
        if !misses.is_empty() {
            output.push_str("\nMissed fields:\n");
            for miss in misses {
                output.push_str(&format!("  {}: {:?}", miss.field, miss.status));
                if let Some(candidate) = &miss.candidate {
                    output.push_str(&format!(" (saw \"{}\")", candidate));
                }
                output.push('\n');
            }
        }
    }

    if let Some(insight) = insight {
        output.push_str("\nInsight:\n");
        output.push_str(insight);
        output.push('\n');
    }

    output
}

/// Humanized field name with a capital first letter, as shown to users.
fn display_field(field: &str) -> String {
    let name = humanize_field_name(field);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}

/// Progress bar fed with OCR progress fractions.
pub fn progress_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

/// Name shown for an input path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthnav_core::{extract, DocumentKind};

    fn label() -> ExtractionReport {
        extract(DocumentKind::NutritionLabel, "Sodium 160mg\nProtein 3g")
    }

    #[test]
    fn test_csv_lists_every_field() {
        let csv = format_report("label.jpg", &label(), None, OutputFormat::Csv, false).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "field,value");
        assert_eq!(lines.len(), 11);
        assert!(lines.contains(&"sodium,160 mg"));
        assert!(lines.contains(&"totalFat,"));
    }

    #[test]
    fn test_csv_diagnostics() {
        let csv = format_report("label.jpg", &label(), None, OutputFormat::Csv, true).unwrap();
        assert!(csv.starts_with("field,value,status,keyword,candidate"));
        assert!(csv.contains("sodium,160 mg,extracted,Sodium,"));
        assert!(csv.contains("totalFat,,keyword_not_found,,"));
    }

    #[test]
    fn test_text_summary() {
        let text = format_report(
            "label.jpg",
            &label(),
            Some("Looks fine."),
            OutputFormat::Text,
            true,
        )
        .unwrap();

        assert!(text.starts_with("Nutrition Label: label.jpg\nExtracted 2/10 fields"));
        assert!(text.contains("  Total Fat: not found\n"));
        assert!(text.contains("Missed fields:"));
        assert!(text.ends_with("Insight:\nLooks fine.\n"));
    }

    #[test]
    fn test_json_omits_empty_sections() {
        let json = format_report("label.jpg", &label(), None, OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["file"], "label.jpg");
        assert_eq!(value["kind"], "nutrition_label");
        assert!(value.get("diagnostics").is_none());
        assert!(value.get("insight").is_none());
    }
}
