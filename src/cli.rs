//! Command-line interface
//!
//! [`run`] holds the whole command flow and takes the PDF engine and the
//! output stream as parameters. `main.rs` supplies PDFium and stdout.

use crate::inspect::Inspector;
use crate::pdf::{EngineConfig, PdfEngine};
use crate::remove::{RemoveOptions, Remover};
use crate::report::{render_info, render_removal, InfoSummary};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

/// Output path used when none is given
pub const DEFAULT_OUTPUT: &str = "output_cleaned.pdf";

/// The pdf-annot-remover command line
#[derive(Parser, Debug)]
#[command(name = "pdf-annot-remover")]
#[command(version, about = "Remove annotations from PDF files")]
#[command(after_help = "\
Examples:
  pdf-annot-remover document.pdf                # Remove annotations, save as output_cleaned.pdf
  pdf-annot-remover input.pdf output.pdf        # Remove annotations, save as output.pdf
  pdf-annot-remover document.pdf --info-only    # Show annotation info without removing
  pdf-annot-remover document.pdf --no-backup    # Remove annotations without backup")]
pub struct Cli {
    /// Input PDF file path
    pub input_file: PathBuf,

    /// Output PDF file path
    #[arg(default_value = DEFAULT_OUTPUT)]
    pub output_file: PathBuf,

    /// Display annotation information without removing them
    #[arg(long)]
    pub info_only: bool,

    /// Skip creating a backup of the original file
    #[arg(long)]
    pub no_backup: bool,

    /// Print the annotation information as JSON
    #[arg(long, requires = "info_only")]
    pub json: bool,

    /// Directory containing the PDFium shared library
    #[arg(long, env = "PDFIUM_LIB_DIR", value_name = "DIR")]
    pub pdfium_dir: Option<PathBuf>,
}

impl Cli {
    /// PDFium search locations, with `--pdfium-dir` first when given.
    pub fn engine_config(&self) -> EngineConfig {
        match &self.pdfium_dir {
            Some(dir) => EngineConfig::default().with_library_dir(dir),
            None => EngineConfig::default(),
        }
    }
}

/// Run the command against `engine`, writing reports to `out`.
///
/// Any error means the process should exit with status 1.
pub fn run<E: PdfEngine + ?Sized>(cli: &Cli, engine: &E, out: &mut dyn Write) -> Result<()> {
    if !cli.input_file.exists() {
        bail!("Input file '{}' not found", cli.input_file.display());
    }

    let mut inspector = Inspector::new(engine, &cli.input_file);
    inspector.validate().context("Validation failed")?;

    if cli.info_only {
        return show_info(&inspector, cli.json, out);
    }

    writeln!(out, "PDF file validated: {}", cli.input_file.display())?;
    writeln!(out, "Processing: {}", cli.input_file.display())?;

    match inspector.annotation_info() {
        Ok(report) if report.total_annotations == 0 => {
            writeln!(out, "No annotations found - nothing to remove")?;
            return Ok(());
        }
        Ok(report) => writeln!(
            out,
            "Found {} annotation(s) to remove",
            report.total_annotations
        )?,
        Err(e) => tracing::warn!(error = %e, "Could not analyze annotations"),
    }
    inspector.close();

    let options = RemoveOptions {
        backup: !cli.no_backup,
    };
    let outcome = Remover::new(engine)
        .remove_annotations(&cli.input_file, &cli.output_file, &options)
        .context("Failed to remove annotations")?;

    write!(out, "{}", render_removal(&outcome))?;
    Ok(())
}

fn show_info<E: PdfEngine + ?Sized>(
    inspector: &Inspector<'_, E>,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let report = inspector
        .annotation_info()
        .context("Error getting annotation information")?;
    let page_count = inspector.page_count()?;

    if json {
        let summary = InfoSummary {
            page_count,
            metadata: inspector.metadata()?,
            annotations: report,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        writeln!(out, "PDF file validated: {}", inspector.path().display())?;
        write!(out, "\n{}", render_info(page_count, &report))?;
    }

    Ok(())
}
