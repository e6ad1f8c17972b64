//! Annotation removal
//!
//! [`Remover::remove_annotations`] strips every annotation from every page and
//! writes the result to an output path, optionally keeping a backup of the
//! input first.

use crate::backup::create_backup;
use crate::error::{Error, Result};
use crate::inspect::absolute_path;
use crate::pdf::{AnnotationHandle, DocumentHandle, Field, PdfEngine, UNKNOWN_TYPE};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a removal run
#[derive(Debug, Clone)]
pub struct RemoveOptions {
    /// Copy the input to a backup path first (skipped when input and output
    /// are the same file)
    pub backup: bool,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        Self { backup: true }
    }
}

/// Counters for one removal run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalStats {
    total_removed: usize,
    /// Type tag of every removed annotation, in removal order
    removed_types: Vec<String>,
}

impl RemovalStats {
    pub(crate) fn record(&mut self, annotation_type: String) {
        self.total_removed += 1;
        self.removed_types.push(annotation_type);
    }

    pub fn total_removed(&self) -> usize {
        self.total_removed
    }

    pub fn removed_types(&self) -> &[String] {
        &self.removed_types
    }

    /// Distinct removed types, sorted
    pub fn unique_types(&self) -> BTreeSet<String> {
        self.removed_types.iter().cloned().collect()
    }

    pub fn type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for annotation_type in &self.removed_types {
            *counts.entry(annotation_type.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            total_removed: self.total_removed,
            unique_types: self.unique_types(),
            per_type_counts: self.type_counts(),
        }
    }
}

/// Read-only snapshot of [`RemovalStats`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_removed: usize,
    pub unique_types: BTreeSet<String>,
    pub per_type_counts: BTreeMap<String, usize>,
}

/// Result of a successful removal run
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub output: PathBuf,
    /// Backup of the input, if one was made
    pub backup: Option<PathBuf>,
    pub stats: RemovalStats,
}

/// Removes annotations from PDF files
pub struct Remover<'e, E: PdfEngine + ?Sized> {
    engine: &'e E,
    last_stats: RemovalStats,
}

impl<'e, E: PdfEngine + ?Sized> Remover<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            last_stats: RemovalStats::default(),
        }
    }

    /// Remove every markup annotation from `input` and save the result to
    /// `output`.
    ///
    /// A failed backup or a single annotation that cannot be deleted is
    /// logged and skipped. Any other failure ends the run with an error; the
    /// document is released either way.
    pub fn remove_annotations(
        &mut self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        options: &RemoveOptions,
    ) -> Result<RemovalOutcome> {
        self.last_stats = RemovalStats::default();
        let input = input.as_ref();
        let output = output.as_ref();

        if !input.exists() {
            tracing::error!(input = %input.display(), "Input file does not exist");
            return Err(Error::NotFound {
                path: input.display().to_string(),
            });
        }
        if !input.is_file() {
            tracing::error!(input = %input.display(), "Input path is not a file");
            return Err(Error::NotAFile {
                path: input.display().to_string(),
            });
        }

        let backup = if options.backup && absolute_path(input) != absolute_path(output) {
            match create_backup(input) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(error = %e, "Backup creation failed, continuing without a backup");
                    None
                }
            }
        } else {
            None
        };

        let mut stats = RemovalStats::default();
        let result = self.process(input, output, &mut stats);
        self.last_stats = stats.clone();

        match result {
            Ok(()) => {
                tracing::info!(removed = stats.total_removed(), "Removed annotation(s)");
                if !stats.removed_types().is_empty() {
                    let types: Vec<String> = stats.unique_types().into_iter().collect();
                    tracing::info!(types = %types.join(", "), "Annotation types removed");
                }
                tracing::info!(output = %output.display(), "Output saved");
                Ok(RemovalOutcome {
                    output: output.to_path_buf(),
                    backup,
                    stats,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to process PDF");
                Err(e)
            }
        }
    }

    /// Counters from the most recent run (partial if that run failed)
    pub fn removal_stats(&self) -> StatsSummary {
        self.last_stats.summary()
    }

    fn process(&self, input: &Path, output: &Path, stats: &mut RemovalStats) -> Result<()> {
        let mut document = self
            .engine
            .open(input)
            .map_err(|e| Error::processing(input, e))?;

        let result = strip_and_save(document.as_mut(), output, stats).map_err(|e| match e {
            Error::Save { .. } => e,
            other => Error::processing(input, other),
        });

        document.close();
        result
    }
}

/// Delete every markup annotation, then save to `output`.
///
/// Hyperlinks and form fields are kept. Pop-up windows are not counted, but
/// any left on a page once its markup is gone are deleted with it.
fn strip_and_save(
    document: &mut (dyn DocumentHandle + '_),
    output: &Path,
    stats: &mut RemovalStats,
) -> Result<()> {
    for page_index in 0..document.page_count() {
        let annotations = document.annotations(page_index)?;

        // Deleting shifts the positions of later annotations, so go back to front.
        for annotation in annotations.iter().rev().filter(|a| a.is_markup()) {
            let annotation_type = match &annotation.subtype {
                Field::Present(name) if !name.is_empty() => name.clone(),
                _ => UNKNOWN_TYPE.to_string(),
            };

            match document.delete_annotation(page_index, annotation) {
                Ok(()) => stats.record(annotation_type),
                Err(e) => {
                    tracing::warn!(page = page_index + 1, error = %e, "Failed to remove annotation");
                }
            }
        }

        if annotations.iter().any(AnnotationHandle::is_popup) {
            remove_popups(document, page_index)?;
        }
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    document.save(output)
}

fn remove_popups(document: &mut (dyn DocumentHandle + '_), page_index: usize) -> Result<()> {
    let annotations = document.annotations(page_index)?;
    for popup in annotations.iter().rev().filter(|a| a.is_popup()) {
        if let Err(e) = document.delete_annotation(page_index, popup) {
            tracing::debug!(page = page_index + 1, error = %e, "Failed to remove popup");
        }
    }
    Ok(())
}
