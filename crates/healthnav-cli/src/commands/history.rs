//! History command - browse saved reports.

use clap::{Args, Subcommand};
use console::style;

use healthnav_core::{ExtractionReport, ProfileStore, StoredReport};

use super::{format_report, Context, OutputFormat};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    command: HistoryCommand,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List saved reports, newest first
    List {
        /// Show at most this many reports
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show one saved report
    Show {
        /// Report id as printed by `history list`
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Include the recognized text
        #[arg(long)]
        raw: bool,
    },
}

pub fn run(args: HistoryArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        HistoryCommand::List { limit } => list_reports(limit, ctx),
        HistoryCommand::Show { id, format, raw } => show_report(&id, format, raw, ctx),
    }
}

fn list_reports(limit: Option<usize>, ctx: &Context) -> anyhow::Result<()> {
    let reports = ctx.store().list_reports(&ctx.user)?;

    if reports.is_empty() {
        println!("{} No saved reports for {}.", style("ℹ").blue(), ctx.user);
        return Ok(());
    }

    let shown = limit.unwrap_or(reports.len());
    for report in reports.iter().take(shown) {
        println!("{}", summary_line(report));
    }
    if shown < reports.len() {
        println!("... {} more", reports.len() - shown);
    }

    Ok(())
}

fn summary_line(report: &StoredReport) -> String {
    format!(
        "{}  {}  {:<15}  {:>2}/{} fields  {}",
        report.id,
        report.scanned_at.format("%Y-%m-%d %H:%M"),
        report.kind.label(),
        report.values.present_count(),
        report.values.len(),
        report.file_name
    )
}

fn show_report(id: &str, format: OutputFormat, raw: bool, ctx: &Context) -> anyhow::Result<()> {
    let record = ctx.store().load_report(&ctx.user, id)?;
    let report = to_report(&record);

    println!(
        "{}",
        format_report(
            &record.file_name,
            &report,
            record.insight.as_deref(),
            format,
            false
        )?
    );

    if raw && !record.raw_text.is_empty() {
        println!("\nRecognized text:\n{}", record.raw_text);
    }

    Ok(())
}

/// Diagnostics are not persisted, so a stored record is shown without them.
fn to_report(record: &StoredReport) -> ExtractionReport {
    ExtractionReport {
        kind: record.kind,
        values: record.values.clone(),
        diagnostics: Vec::new(),
    }
}
