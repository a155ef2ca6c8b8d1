//! testtrack - QA test-tracking workbook tool
//!
//! Works a tracking workbook through the fix cycle: list the failed test
//! cases, show their details, record fixes (clear `Status`, write
//! `Fix Summary`), verify the result, and analyze the screenshots embedded
//! in the workbook.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use testtrack_core::{load_annotations, verify_rows, FailedRowFilter, RowRecord};
use testtrack_image::{analyze_directory, AnalysisReport, OcrEngine};
use testtrack_xlsx::{
    analyze_structure, apply_fixes_in_place, extract_images, read_sheet,
};

/// Fields shown per row in the `failed` listing, in order
const FAILED_FIELDS: &[&str] = &["Test Case No", "Test Cases", "Status", "Defect"];

/// Fields truncated to a preview in the `failed` listing
const PREVIEW_FIELDS: &[&str] = &["Expected Results", "Actual Result"];

/// Preview length for long cell values
const PREVIEW_LEN: usize = 80;

/// Output verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output
    Normal,
}

impl Verbosity {
    const fn from_flags(quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "testtrack",
    about = "Work a QA tracking workbook through the fix cycle",
    long_about = "Work a QA tracking workbook through the fix cycle.\n\
                  \n\
                  Lists failed test cases, records fixes (clears Status and writes\n\
                  Fix Summary), verifies the result, and analyzes the screenshots\n\
                  embedded in the workbook.",
    version
)]
struct Args {
    /// Tracking workbook path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        default_value = "JobFinder_TestCase.xlsx"
    )]
    workbook: PathBuf,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show workbook structure: sheets, headers, image counts, sample rows
    Inspect {
        /// Write the full structure report as Markdown
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List failed test cases that have no fix recorded yet
    Failed {
        /// Sheet to scan
        #[arg(short, long, default_value = "Registration.Login")]
        sheet: String,

        /// Stop after this many rows
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,

        /// Row numbers to skip (already being worked on)
        #[arg(long, value_name = "ROW", num_args = 1..)]
        skip: Vec<usize>,
    },

    /// Show the full record of specific rows
    Details {
        /// 1-based row numbers
        #[arg(value_name = "ROW", required = true)]
        rows: Vec<usize>,

        /// Sheet to read
        #[arg(short, long, default_value = "Registration.Login")]
        sheet: String,
    },

    /// Apply a batch of fixes: clear Status, write Fix Summary, save in place
    Apply {
        /// JSON file with the fix batch: [{"row": 14, "summary": "..."}]
        #[arg(short, long, value_name = "FILE")]
        fixes: PathBuf,

        /// Sheet to update
        #[arg(short, long, default_value = "Registration.Login")]
        sheet: String,
    },

    /// Show Status and Fix Summary of specific rows after an update
    Verify {
        /// 1-based row numbers
        #[arg(value_name = "ROW", required = true)]
        rows: Vec<usize>,

        /// Sheet to read
        #[arg(short, long, default_value = "Registration.Login")]
        sheet: String,
    },

    /// Extract embedded screenshots into a directory
    ExtractImages {
        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "extracted_images")]
        output: PathBuf,
    },

    /// Analyze extracted screenshots: metadata, optional OCR, JSON report
    AnalyzeImages {
        /// Directory of extracted screenshots
        #[arg(value_name = "DIR", default_value = "extracted_images")]
        dir: PathBuf,

        /// JSON report output path
        #[arg(short, long, value_name = "FILE", default_value = "image_analysis_detailed.json")]
        output: PathBuf,

        /// Also write a Markdown summary
        #[arg(long, value_name = "FILE")]
        markdown: Option<PathBuf>,

        /// Skip OCR even when tesseract is installed
        #[arg(long)]
        no_ocr: bool,
    },

    /// Build a Markdown fix checklist from a saved analysis report
    Checklist {
        /// JSON report produced by analyze-images
        #[arg(value_name = "REPORT", default_value = "image_analysis_detailed.json")]
        report: PathBuf,

        /// Checklist output path
        #[arg(short, long, value_name = "FILE", default_value = "FIX_CHECKLIST.md")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet);

    match args.command {
        Commands::Inspect { output } => inspect_command(&args.workbook, output, verbosity),
        Commands::Failed { sheet, limit, skip } => {
            failed_command(&args.workbook, &sheet, limit, &skip, verbosity)
        }
        Commands::Details { rows, sheet } => {
            details_command(&args.workbook, &sheet, &rows, verbosity)
        }
        Commands::Apply { fixes, sheet } => {
            apply_command(&args.workbook, &sheet, &fixes, verbosity)
        }
        Commands::Verify { rows, sheet } => {
            verify_command(&args.workbook, &sheet, &rows, verbosity)
        }
        Commands::ExtractImages { output } => {
            extract_images_command(&args.workbook, &output, verbosity)
        }
        Commands::AnalyzeImages {
            dir,
            output,
            markdown,
            no_ocr,
        } => analyze_images_command(&dir, &output, markdown, no_ocr, verbosity),
        Commands::Checklist { report, output } => checklist_command(&report, &output, verbosity),
    }
}

fn inspect_command(
    workbook: &PathBuf,
    output: Option<PathBuf>,
    verbosity: Verbosity,
) -> Result<()> {
    let structure = analyze_structure(workbook)
        .with_context(|| format!("failed to inspect {}", workbook.display()))?;

    if verbosity.should_show_output() {
        println!("{}", "Workbook Structure".bold());
        println!("  Sheets:    {}", structure.sheets.len());
        println!("  Images:    {}", structure.total_images());
        println!("  Data rows: {}", structure.total_data_rows());
        println!();
        for sheet in &structure.sheets {
            println!(
                "  {} {} rows x {} columns, {} images, {} data rows",
                sheet.name.cyan(),
                sheet.rows,
                sheet.columns,
                sheet.image_count,
                sheet.data_row_count
            );
        }
    }

    if let Some(path) = output {
        std::fs::write(&path, structure.to_markdown())
            .with_context(|| format!("failed to write {}", path.display()))?;
        if verbosity.should_show_output() {
            println!("\n{} Structure report saved: {}", "✓".green(), path.display());
        }
    }
    Ok(())
}

fn print_record(record: &RowRecord) {
    for field in FAILED_FIELDS {
        println!("   {field}: {}", record.display(field));
    }
    for field in PREVIEW_FIELDS {
        if let Some(value) = record.get(field) {
            let text = value.to_string();
            let preview: String = text.chars().take(PREVIEW_LEN).collect();
            let suffix = if text.chars().count() > PREVIEW_LEN { "..." } else { "" };
            println!("   {field}: {preview}{suffix}");
        }
    }
}

fn failed_command(
    workbook: &PathBuf,
    sheet_name: &str,
    limit: Option<usize>,
    skip: &[usize],
    verbosity: Verbosity,
) -> Result<()> {
    let sheet = read_sheet(workbook, sheet_name)
        .with_context(|| format!("failed to read {}", workbook.display()))?;

    let mut filter = FailedRowFilter::new(&sheet)
        .with_context(|| format!("sheet {sheet_name:?} is not a tracking sheet"))?
        .skip_rows(skip.iter().copied());
    if let Some(limit) = limit {
        filter = filter.limit(limit);
    }
    let failed: Vec<RowRecord> = filter.collect();

    if verbosity.should_show_output() {
        println!(
            "Found {} failed test cases in {}",
            failed.len().to_string().bold(),
            sheet_name.cyan()
        );
        println!("{}", "=".repeat(60));
        for (idx, record) in failed.iter().enumerate() {
            println!("\n{}. Row {}", idx + 1, record.row().to_string().bold());
            print_record(record);
        }
    }
    Ok(())
}

fn details_command(
    workbook: &PathBuf,
    sheet_name: &str,
    rows: &[usize],
    verbosity: Verbosity,
) -> Result<()> {
    let sheet = read_sheet(workbook, sheet_name)
        .with_context(|| format!("failed to read {}", workbook.display()))?;

    if verbosity.should_show_output() {
        for &row in rows {
            let record = sheet.row_record(row);
            println!("\n{} {}", "Row".bold(), row.to_string().bold());
            println!("{}", "-".repeat(60));
            if record.is_empty() {
                println!("   {}", "(empty row)".yellow());
                continue;
            }
            for (label, value) in record.fields() {
                println!("   {label}: {value}");
            }
        }
    }
    Ok(())
}

fn apply_command(
    workbook: &PathBuf,
    sheet_name: &str,
    fixes_path: &PathBuf,
    verbosity: Verbosity,
) -> Result<()> {
    let fixes = load_annotations(fixes_path)
        .with_context(|| format!("failed to load fixes from {}", fixes_path.display()))?;

    let outcome = apply_fixes_in_place(workbook, sheet_name, &fixes)
        .with_context(|| format!("failed to update {}", workbook.display()))?;

    if verbosity.should_show_output() {
        if outcome.created_column {
            println!(
                "{} Created Fix Summary column at index {}",
                "✓".green(),
                outcome.fix_summary_col
            );
        }
        println!(
            "{} Updated {} rows in sheet {}",
            "✓".green(),
            outcome.updated.to_string().bold(),
            sheet_name.cyan()
        );
    }
    Ok(())
}

fn verify_command(
    workbook: &PathBuf,
    sheet_name: &str,
    rows: &[usize],
    verbosity: Verbosity,
) -> Result<()> {
    let sheet = read_sheet(workbook, sheet_name)
        .with_context(|| format!("failed to read {}", workbook.display()))?;

    if verbosity.should_show_output() {
        println!("{}", "Verification".bold());
        println!("{}", "=".repeat(60));
        for verification in verify_rows(&sheet, rows) {
            println!(
                "\nRow {}: {} - {}",
                verification.row.to_string().bold(),
                verification.test_case,
                verification.test_name
            );
            match verification.status.as_deref() {
                None | Some("") => println!("   Status: {}", "(cleared)".green()),
                Some(status) => println!("   Status: {}", status.red()),
            }
            match verification.fix_summary.as_deref() {
                None | Some("") => println!("   Fix Summary: {}", "(none)".yellow()),
                Some(summary) => {
                    let preview: String = summary.chars().take(PREVIEW_LEN).collect();
                    println!("   Fix Summary: {preview}");
                }
            }
        }
    }
    Ok(())
}

fn extract_images_command(
    workbook: &PathBuf,
    out_dir: &PathBuf,
    verbosity: Verbosity,
) -> Result<()> {
    let extracted = extract_images(workbook, out_dir)
        .with_context(|| format!("failed to extract images from {}", workbook.display()))?;

    if verbosity.should_show_output() {
        println!(
            "{} Extracted {} images to {}",
            "✓".green(),
            extracted.len().to_string().bold(),
            out_dir.display()
        );
        let mut per_sheet: Vec<(&str, usize)> = Vec::new();
        for image in &extracted {
            match per_sheet.iter_mut().find(|(name, _)| *name == image.sheet) {
                Some((_, count)) => *count += 1,
                None => per_sheet.push((&image.sheet, 1)),
            }
        }
        for (sheet, count) in per_sheet {
            println!("  {} {count} images", sheet.cyan());
        }
    }
    Ok(())
}

fn analyze_images_command(
    dir: &PathBuf,
    output: &PathBuf,
    markdown: Option<PathBuf>,
    no_ocr: bool,
    verbosity: Verbosity,
) -> Result<()> {
    let ocr = if no_ocr {
        OcrEngine::disabled()
    } else {
        OcrEngine::detect()
    };
    if verbosity.should_show_output() && !ocr.is_available() && !no_ocr {
        println!(
            "{} tesseract not found - analyzing metadata only",
            "⚠".yellow()
        );
    }

    let spinner = if verbosity.should_show_output() {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("template is compile-time constant"),
        );
        s.set_message(format!("Analyzing images in {}...", dir.display()));
        s.enable_steady_tick(std::time::Duration::from_millis(100));
        s
    } else {
        ProgressBar::hidden()
    };

    let batch = analyze_directory(dir, ocr)
        .with_context(|| format!("failed to analyze {}", dir.display()))?;
    spinner.finish_and_clear();

    let report = AnalysisReport::build(&batch);
    report
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if let Some(path) = &markdown {
        std::fs::write(path, report.to_markdown())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if verbosity.should_show_output() {
        println!(
            "{} Analyzed {} images across {} sheets",
            "✓".green(),
            report.summary.total_images.to_string().bold(),
            report.summary.sheets.len()
        );
        for (sheet, count) in &report.summary.sheet_counts {
            println!("  {} {count} images", sheet.cyan());
        }
        println!("\n{} JSON report saved: {}", "✓".green(), output.display());
        if let Some(path) = &markdown {
            println!("{} Markdown summary saved: {}", "✓".green(), path.display());
        }
    }
    Ok(())
}

fn checklist_command(report_path: &PathBuf, output: &PathBuf, verbosity: Verbosity) -> Result<()> {
    let report = AnalysisReport::load(report_path)
        .with_context(|| format!("failed to load report {}", report_path.display()))?;

    std::fs::write(output, report.to_checklist())
        .with_context(|| format!("failed to write {}", output.display()))?;

    if verbosity.should_show_output() {
        println!("{} Checklist created: {}", "✓".green(), output.display());
        println!(
            "Total items to review: {}",
            report.summary.total_images.to_string().bold()
        );
    }
    Ok(())
}
