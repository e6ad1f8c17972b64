//! PDF Annotation Remover - Entry point
//!
//! Removes every annotation from a PDF, or with `--info-only` reports what
//! annotations it contains without modifying anything.

use anyhow::Result;
use clap::Parser;
use pdf_annot_remover::cli::{run, Cli};
use pdf_annot_remover::PdfiumEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_annot_remover=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let engine = PdfiumEngine::new(cli.engine_config());
    run(&cli, &engine, &mut std::io::stdout().lock())
}
