//! Console rendering of inspection and removal results

use crate::inspect::{AnnotationInfoReport, DocumentMetadata};
use crate::remove::RemovalOutcome;
use serde::Serialize;
use std::fmt;

const RULE_WIDTH: usize = 50;

/// Everything `--info-only --json` prints
#[derive(Debug, Clone, Serialize)]
pub struct InfoSummary {
    pub page_count: usize,
    pub metadata: DocumentMetadata,
    pub annotations: AnnotationInfoReport,
}

/// Render the annotation summary shown by `--info-only`.
pub fn render_info(page_count: usize, report: &AnnotationInfoReport) -> String {
    InfoView { page_count, report }.to_string()
}

/// Render the message printed after a successful removal.
pub fn render_removal(outcome: &RemovalOutcome) -> String {
    RemovalView(outcome).to_string()
}

struct InfoView<'a> {
    page_count: usize,
    report: &'a AnnotationInfoReport,
}

impl fmt::Display for InfoView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let report = self.report;

        writeln!(f, "{}", rule)?;
        writeln!(f, "PDF ANNOTATION SUMMARY")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total pages: {}", self.page_count)?;
        writeln!(f, "Total annotations: {}", report.total_annotations)?;

        if report.annotation_types.is_empty() {
            writeln!(f, "Annotation types: None")?;
        } else {
            let types: Vec<&str> = report.annotation_types.iter().map(String::as_str).collect();
            writeln!(f, "Annotation types: {}", types.join(", "))?;
        }

        if report.pages_with_annotations.is_empty() {
            writeln!(f, "\nNo annotations found in this PDF")?;
        } else {
            writeln!(f, "\nPages with annotations:")?;
            for entry in &report.pages_with_annotations {
                writeln!(f, "   Page {:3}: {:2} annotation(s)", entry.page, entry.count)?;
            }
        }

        writeln!(f, "{}", rule)
    }
}

struct RemovalView<'a>(&'a RemovalOutcome);

impl fmt::Display for RemovalView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        let stats = &outcome.stats;

        writeln!(f, "Annotations removed successfully!")?;
        if stats.total_removed() > 0 {
            writeln!(f, "Removed {} annotation(s)", stats.total_removed())?;
            let types: Vec<String> = stats
                .type_counts()
                .into_iter()
                .map(|(name, count)| format!("{} ({})", name, count))
                .collect();
            writeln!(f, "Types removed: {}", types.join(", "))?;
        }
        if let Some(backup) = &outcome.backup {
            writeln!(f, "Backup saved to: {}", backup.display())?;
        }
        writeln!(f, "Output saved to: {}", outcome.output.display())
    }
}
