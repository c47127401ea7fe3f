//! Batch command - scan many documents of one kind.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use healthnav_core::{DocumentKind, ProfileStore, PureOcrEngine, ScanOutcome, Scanner};

use super::{display_name, format_report, scan::scan_text, Context, OutputFormat};

const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "webp", "tiff", "tif", "bmp", "gif"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Document type: blood or nutrition
    #[arg(short, long)]
    kind: DocumentKind,

    /// Read .txt files as already recognized text instead of images
    #[arg(long)]
    text: bool,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Save every successful report to the user's history
    #[arg(long)]
    save: bool,
}

/// Result of scanning a single file.
struct BatchResult {
    path: PathBuf,
    outcome: Option<ScanOutcome>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| accepts(p, args.text))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to scan",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let scanner = if args.text {
        None
    } else {
        let engine = ctx.ocr_engine(args.model_dir.as_deref())?;
        Some(Scanner::new(engine).with_extraction(&ctx.config.extraction))
    };

    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let scanned = scan_one(&path, args.kind, scanner.as_ref(), ctx);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match scanned {
            Ok(outcome) => results.push(BatchResult {
                path,
                outcome: Some(outcome),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = format!("{:#}", e);
                if args.continue_on_error {
                    warn!("Failed to scan {}: {}", path.display(), error_msg);
                    results.push(BatchResult {
                        path,
                        outcome: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to scan {}: {}", path.display(), error_msg);
                    overall_pb.abandon();
                    anyhow::bail!("Scanning failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.outcome.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(outcome) = &result.outcome {
                write_output(output_dir, &result.path, outcome, args.format)?;
            }
        }
    }

    if args.save {
        let store = ctx.store();
        for result in &successful {
            if let Some(outcome) = &result.outcome {
                let mut record = outcome.clone().into_record(display_name(&result.path));
                if !ctx.config.store.save_raw_text {
                    record.raw_text.clear();
                }
                let id = store.save_report(&ctx.user, &record)?;
                debug!("Saved {} as {}", result.path.display(), id);
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Scanned {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn accepts(path: &Path, text_mode: bool) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if text_mode {
        ext == "txt"
    } else {
        IMAGE_EXTENSIONS.contains(&ext.as_str())
    }
}

fn scan_one(
    path: &Path,
    kind: DocumentKind,
    scanner: Option<&Scanner<PureOcrEngine>>,
    ctx: &Context,
) -> anyhow::Result<ScanOutcome> {
    match scanner {
        Some(scanner) => Ok(scanner.scan_file(path, kind, &mut |_| {})?),
        None => {
            let text = fs::read_to_string(path)?;
            Ok(scan_text(&text, kind, ctx))
        }
    }
}

fn write_output(
    output_dir: &Path,
    path: &Path,
    outcome: &ScanOutcome,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    let content = format_report(&display_name(path), &outcome.report, None, format, false)?;
    fs::write(&output_path, content)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "present",
        "absent",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = display_name(&result.path);
        let time = result.processing_time_ms.to_string();

        match &result.outcome {
            Some(outcome) => {
                let present = outcome.report.values.present_count();
                let absent = outcome.report.values.len() - present;
                wtr.write_record([
                    filename.as_str(),
                    "success",
                    &present.to_string(),
                    &absent.to_string(),
                    &time,
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    filename.as_str(),
                    "error",
                    "",
                    "",
                    &time,
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
