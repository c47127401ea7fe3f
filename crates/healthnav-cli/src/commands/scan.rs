//! Scan command - extract values from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use healthnav_core::{
    request_insight, DocumentKind, ProfileStore, ReportAssembler, ScanOutcome, Scanner,
};

use super::{display_name, format_report, progress_bar, Context, OutputFormat};
use crate::assistant::GeminiAssistant;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input image, or a text file with --text
    #[arg(required = true)]
    input: PathBuf,

    /// Document type: blood or nutrition
    #[arg(short, long)]
    kind: DocumentKind,

    /// Treat the input as already recognized text and skip OCR
    #[arg(long)]
    text: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Ask the assistant to explain the extracted values
    #[arg(long)]
    insight: bool,

    /// Save the report to the user's history
    #[arg(long)]
    save: bool,

    /// Show why fields were missed
    #[arg(long)]
    show_diagnostics: bool,
}

pub async fn run(args: ScanArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Scanning {} as {}", args.input.display(), args.kind);

    let outcome = if args.text {
        let text = fs::read_to_string(&args.input)?;
        scan_text(&text, args.kind, ctx)
    } else {
        scan_image(&args, ctx)?
    };

    let file_name = display_name(&args.input);
    if !outcome.report.values.has_values() {
        eprintln!(
            "{} No values could be extracted from {}",
            style("!").yellow(),
            file_name
        );
    }

    let insight = if args.insight {
        fetch_insight(&outcome, ctx).await?
    } else {
        None
    };

    let output = format_report(
        &file_name,
        &outcome.report,
        insight.as_deref(),
        args.format,
        args.show_diagnostics,
    )?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.save {
        let mut record = outcome.into_record(file_name);
        record.insight = insight;
        if !ctx.config.store.save_raw_text {
            record.raw_text.clear();
        }
        let id = ctx.store().save_report(&ctx.user, &record)?;
        eprintln!("{} Saved report {}", style("✓").green(), id);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub(crate) fn scan_text(text: &str, kind: DocumentKind, ctx: &Context) -> ScanOutcome {
    let assembler = ReportAssembler::from_config(&ctx.config.extraction);
    ScanOutcome::from_text(&assembler, text, kind)
}

fn scan_image(args: &ScanArgs, ctx: &Context) -> anyhow::Result<ScanOutcome> {
    let pb = progress_bar()?;
    pb.set_message("Loading OCR models...");

    let engine = ctx.ocr_engine(args.model_dir.as_deref())?;
    let scanner = Scanner::new(engine).with_extraction(&ctx.config.extraction);

    pb.set_message("Recognizing text...");
    let outcome = scanner.scan_file(&args.input, args.kind, &mut |fraction| {
        pb.set_position((fraction * 100.0) as u64);
    });

    match outcome {
        Ok(outcome) => {
            pb.finish_with_message("Done");
            Ok(outcome)
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            Err(e.into())
        }
    }
}

/// Request an insight; assistant failures are shown but do not fail the scan.
async fn fetch_insight(outcome: &ScanOutcome, ctx: &Context) -> anyhow::Result<Option<String>> {
    let assistant = match GeminiAssistant::from_config(&ctx.config.assistant) {
        Ok(assistant) => assistant,
        Err(e) => {
            eprintln!("{} {}", style("!").yellow(), e.user_message());
            return Ok(None);
        }
    };

    let context = ctx.user_context()?;
    match request_insight(
        &assistant,
        outcome.report.kind,
        &outcome.report.values,
        context.as_ref(),
    )
    .await
    {
        Ok(Some(insight)) => Ok(Some(insight)),
        Ok(None) => {
            eprintln!("{} Could not extract values for an insight.", style("!").yellow());
            Ok(None)
        }
        Err(e) => {
            warn!("Assistant failed: {}", e);
            eprintln!("{} {}", style("!").yellow(), e.user_message());
            Ok(None)
        }
    }
}

