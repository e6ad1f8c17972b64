//! PDF Annotation Remover Library
//!
//! This crate removes annotation objects from PDF documents and reports
//! annotation metadata:
//! - [`Inspector`]: validate a file and summarize its annotations and metadata
//! - [`Remover`]: delete every annotation and save the cleaned document
//! - [`create_backup`]: copy the original to a non-colliding backup path
//!
//! PDF parsing and writing is delegated to PDFium through [`pdf::PdfEngine`].
//! The command-line flow lives in [`cli::run`].

pub mod backup;
pub mod cli;
pub mod error;
pub mod inspect;
pub mod pdf;
pub mod remove;
pub mod report;

pub use backup::{backup_path_for, create_backup, BACKUP_SUFFIX};
pub use error::{Error, Result};
pub use inspect::{
    check_pdf_path, AnnotationDetail, AnnotationInfoReport, DocumentMetadata, Inspector,
    PageAnnotations,
};
pub use pdf::{EngineConfig, PdfiumEngine};
pub use remove::{RemovalOutcome, RemovalStats, RemoveOptions, Remover, StatsSummary};
pub use report::{render_info, render_removal, InfoSummary};
