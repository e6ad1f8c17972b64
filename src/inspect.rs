//! Read-only inspection of PDF files
//!
//! An [`Inspector`] checks that a path points at a usable, non-empty PDF and
//! then answers questions about its annotations and metadata. It never writes
//! to the file.

use crate::error::{Error, Result};
use crate::pdf::{AnnotationHandle, DocumentHandle, Field, PdfEngine, Rect, UNKNOWN_TYPE};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One annotation as reported by [`Inspector::annotation_info`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationDetail {
    /// Page number (1-indexed)
    pub page: usize,
    /// Annotation type (e.g., "Text", "Highlight", "Unknown")
    #[serde(rename = "type")]
    pub annotation_type: String,
    /// Text content, empty when absent
    pub content: String,
    /// Author, empty when absent
    pub author: String,
    pub rect: Option<Rect>,
}

/// Annotations found on a single page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageAnnotations {
    /// Page number (1-indexed)
    pub page: usize,
    pub count: usize,
    pub annotations: Vec<AnnotationDetail>,
}

/// Aggregate view of a document's annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationInfoReport {
    pub total_annotations: usize,
    pub annotation_types: BTreeSet<String>,
    /// Pages with at least one annotation, in ascending page order
    pub pages_with_annotations: Vec<PageAnnotations>,
}

impl AnnotationInfoReport {
    /// Every annotation in document order.
    pub fn details(&self) -> impl Iterator<Item = &AnnotationDetail> {
        self.pages_with_annotations
            .iter()
            .flat_map(|page| page.annotations.iter())
    }
}

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub producer: String,
    pub creation_date: String,
    pub modification_date: String,
    pub page_count: usize,
    /// File size in bytes
    pub file_size: u64,
    pub encrypted: bool,
    /// PDF version, "Unknown" when unavailable
    pub pdf_version: String,
}

/// Check that `path` names an existing, non-empty regular file with a `.pdf`
/// extension.
pub fn check_pdf_path(path: &Path) -> Result<u64> {
    let display = || path.display().to_string();

    if !path.exists() {
        return Err(Error::NotFound { path: display() });
    }
    if !path.is_file() {
        return Err(Error::NotAFile { path: display() });
    }

    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(Error::InvalidFormat { path: display() });
    }

    let size = fs::metadata(path)?.len();
    if size == 0 {
        return Err(Error::EmptyFile { path: display() });
    }

    Ok(size)
}

/// Resolve `path` against the current directory without touching the file.
pub(crate) fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Read-only view of a single PDF file
pub struct Inspector<'e, E: PdfEngine + ?Sized> {
    engine: &'e E,
    path: PathBuf,
    document: Option<Box<dyn DocumentHandle + 'e>>,
}

impl<'e, E: PdfEngine + ?Sized> Inspector<'e, E> {
    /// Create an inspector for `path`. Nothing is opened until [`validate`].
    ///
    /// [`validate`]: Inspector::validate
    pub fn new(engine: &'e E, path: impl AsRef<Path>) -> Self {
        Self {
            engine,
            path: absolute_path(path.as_ref()),
            document: None,
        }
    }

    /// Absolute path of the inspected file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Check the file and open it.
    ///
    /// On success the document stays open until [`close`](Inspector::close)
    /// or until the inspector is dropped.
    pub fn validate(&mut self) -> Result<()> {
        self.close();

        check_pdf_path(&self.path)?;

        let document = self.engine.open(&self.path)?;
        if document.page_count() == 0 {
            document.close();
            return Err(Error::CorruptDocument {
                reason: "PDF file contains no pages".to_string(),
            });
        }

        tracing::debug!(
            path = %self.path.display(),
            pages = document.page_count(),
            "PDF validated"
        );
        self.document = Some(document);
        Ok(())
    }

    fn document(&self) -> Result<&dyn DocumentHandle> {
        self.document.as_deref().ok_or(Error::NotLoaded)
    }

    /// Number of pages
    pub fn page_count(&self) -> Result<usize> {
        Ok(self.document()?.page_count())
    }

    pub fn is_encrypted(&self) -> Result<bool> {
        Ok(self.document()?.is_encrypted())
    }

    /// Summarize every annotation in the document.
    ///
    /// Only markup annotations are reported: hyperlinks, form fields and
    /// pop-up windows are left out. Attributes that cannot be read fall back
    /// to defaults ("Unknown" type, empty content and author, no rectangle);
    /// the annotation is still counted. A page whose annotation list cannot
    /// be read is skipped.
    pub fn annotation_info(&self) -> Result<AnnotationInfoReport> {
        let document = self.document()?;
        let mut report = AnnotationInfoReport::default();

        for page_index in 0..document.page_count() {
            let page = page_index + 1;
            let handles: Vec<AnnotationHandle> = match document.annotations(page_index) {
                Ok(handles) => handles.into_iter().filter(AnnotationHandle::is_markup).collect(),
                Err(e) => {
                    tracing::warn!(page, error = %e, "could not read annotations");
                    continue;
                }
            };
            if handles.is_empty() {
                continue;
            }

            let annotations: Vec<AnnotationDetail> = handles
                .into_iter()
                .map(|handle| {
                    let detail = AnnotationDetail {
                        page,
                        annotation_type: text_field(page, "type", handle.subtype)
                            .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
                        content: text_field(page, "content", handle.contents).unwrap_or_default(),
                        author: text_field(page, "author", handle.author).unwrap_or_default(),
                        rect: rect_field(page, handle.rect),
                    };
                    report
                        .annotation_types
                        .insert(detail.annotation_type.clone());
                    detail
                })
                .collect();

            report.total_annotations += annotations.len();
            report.pages_with_annotations.push(PageAnnotations {
                page,
                count: annotations.len(),
                annotations,
            });
        }

        Ok(report)
    }

    /// Document metadata. Missing info entries are reported as empty strings.
    pub fn metadata(&self) -> Result<DocumentMetadata> {
        let document = self.document()?;
        let info = document.info();

        Ok(DocumentMetadata {
            title: info.title.unwrap_or_default(),
            author: info.author.unwrap_or_default(),
            subject: info.subject.unwrap_or_default(),
            creator: info.creator.unwrap_or_default(),
            producer: info.producer.unwrap_or_default(),
            creation_date: info.creation_date.unwrap_or_default(),
            modification_date: info.modification_date.unwrap_or_default(),
            page_count: document.page_count(),
            file_size: fs::metadata(&self.path)?.len(),
            encrypted: document.is_encrypted(),
            pdf_version: document
                .pdf_version()
                .unwrap_or_else(|| "Unknown".to_string()),
        })
    }

    /// Release the document. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(document) = self.document.take() {
            document.close();
        }
    }
}

impl<E: PdfEngine + ?Sized> Drop for Inspector<'_, E> {
    fn drop(&mut self) {
        self.close();
    }
}

fn text_field(page: usize, name: &str, field: Field<String>) -> Option<String> {
    match field {
        Field::Present(value) if !value.is_empty() => Some(value),
        Field::Present(_) | Field::Absent => None,
        Field::Unreadable(reason) => {
            tracing::debug!(page, field = name, %reason, "annotation field unreadable");
            None
        }
    }
}

fn rect_field(page: usize, field: Field<Rect>) -> Option<Rect> {
    match field {
        Field::Present(rect) => Some(rect),
        Field::Absent => None,
        Field::Unreadable(reason) => {
            tracing::debug!(page, field = "rect", %reason, "annotation field unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_path_is_not_found() {
        let result = check_pdf_path(Path::new("/nonexistent/path/file.pdf"));
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("folder.pdf");
        fs::create_dir(&folder).unwrap();

        assert!(matches!(
            check_pdf_path(&folder),
            Err(Error::NotAFile { .. })
        ));
    }

    #[test]
    fn test_wrong_extension_is_invalid_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"%PDF-1.7").unwrap();

        assert!(matches!(
            check_pdf_path(&path),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_extension_check_ignores_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SCAN.PDF");
        fs::write(&path, b"%PDF-1.7").unwrap();

        assert_eq!(check_pdf_path(&path).unwrap(), 8);
    }

    #[test]
    fn test_zero_byte_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        fs::write(&path, b"").unwrap();

        assert!(matches!(
            check_pdf_path(&path),
            Err(Error::EmptyFile { .. })
        ));
    }

    #[test]
    fn test_absolute_path_resolution() {
        let resolved = absolute_path(Path::new("doc.pdf"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("doc.pdf"));

        let already = Path::new("/tmp/doc.pdf");
        assert_eq!(absolute_path(already), already);
    }

    #[test]
    fn test_text_field_defaults() {
        assert_eq!(
            text_field(1, "type", Field::Present("Ink".to_string())),
            Some("Ink".to_string())
        );
        assert_eq!(text_field(1, "type", Field::Present(String::new())), None);
        assert_eq!(
            text_field(1, "type", Field::Unreadable("boom".to_string())),
            None
        );
    }
}
