//! PDFium-backed document engine

use super::qpdf::{probe_header, HeaderInfo};
use super::{AnnotationHandle, DocumentHandle, DocumentInfo, Field, PdfEngine, Rect};
use crate::error::{Error, Result};
use pdfium_render::prelude::*;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Where to look for the PDFium shared library
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directories searched in order before falling back to the system library
    pub library_dirs: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            library_dirs: vec![PathBuf::from("./"), PathBuf::from("/opt/pdfium/lib")],
        }
    }
}

impl EngineConfig {
    /// Search `dir` before the default locations.
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dirs.insert(0, dir.into());
        self
    }
}

/// Document engine using PDFium
///
/// The library is bound on first use, so path checks that fail before a
/// document is opened never require PDFium to be installed.
pub struct PdfiumEngine {
    config: EngineConfig,
    pdfium: OnceCell<Pdfium>,
}

impl PdfiumEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            pdfium: OnceCell::new(),
        }
    }

    fn pdfium(&self) -> Result<&Pdfium> {
        if let Some(pdfium) = self.pdfium.get() {
            return Ok(pdfium);
        }
        let pdfium = create_pdfium(&self.config)?;
        Ok(self.pdfium.get_or_init(|| pdfium))
    }
}

impl Default for PdfiumEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Bind to the first PDFium library found in the configured directories,
/// then the system library.
fn create_pdfium(config: &EngineConfig) -> Result<Pdfium> {
    let mut last_error = None;
    for dir in &config.library_dirs {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)) {
            Ok(bindings) => return Ok(Pdfium::new(bindings)),
            Err(e) => last_error = Some(e),
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| Error::EngineUnavailable {
        reason: match last_error {
            Some(prev) => format!("{} (also tried configured directories: {})", e, prev),
            None => e.to_string(),
        },
    })?;

    Ok(Pdfium::new(bindings))
}

/// Map PDFium load errors to our error type
fn map_open_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::CorruptDocument {
                reason: "PDF is password protected".to_string(),
            }
        }
        _ => Error::CorruptDocument {
            reason: err.to_string(),
        },
    }
}

fn pdfium_error(context: &str, err: PdfiumError) -> Error {
    Error::Pdfium {
        reason: format!("{}: {}", context, err),
    }
}

impl PdfEngine for PdfiumEngine {
    fn open<'e>(&'e self, path: &Path) -> Result<Box<dyn DocumentHandle + 'e>> {
        let pdfium = self.pdfium()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(map_open_error)?;

        let header = probe_header(path).unwrap_or_else(|e| {
            tracing::debug!(error = %e, path = %path.display(), "header probe failed");
            HeaderInfo::default()
        });

        Ok(Box::new(PdfiumDocument { document, header }))
    }
}

/// An open PDFium document
struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    header: HeaderInfo,
}

impl<'a> PdfiumDocument<'a> {
    fn page(&self, index: usize) -> Result<PdfPage<'a>> {
        let page_index = PdfPageIndex::try_from(index).map_err(|_| Error::Pdfium {
            reason: format!("Page {} out of range", index + 1),
        })?;
        self.document
            .pages()
            .get(page_index)
            .map_err(|e| pdfium_error(&format!("Failed to get page {}", index + 1), e))
    }
}

impl DocumentHandle for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn annotations(&self, page: usize) -> Result<Vec<AnnotationHandle>> {
        let page = self.page(page)?;

        let handles = page
            .annotations()
            .iter()
            .enumerate()
            .map(|(index, annotation)| AnnotationHandle {
                index,
                subtype: Field::from_option(
                    subtype_name(annotation.annotation_type()).map(str::to_string),
                ),
                contents: Field::from_option(annotation.contents().filter(|s| !s.is_empty())),
                author: Field::from_option(annotation.creator().filter(|s| !s.is_empty())),
                rect: annotation
                    .bounds()
                    .map(|rect| Rect {
                        left: rect.left().value,
                        bottom: rect.bottom().value,
                        right: rect.right().value,
                        top: rect.top().value,
                    })
                    .into(),
            })
            .collect();

        Ok(handles)
    }

    fn delete_annotation(&mut self, page: usize, annotation: &AnnotationHandle) -> Result<()> {
        let mut pdf_page = self.page(page)?;
        let annotations = pdf_page.annotations_mut();

        let deletion_error = |reason: String| Error::AnnotationDeletion {
            page: page + 1,
            index: annotation.index,
            reason,
        };

        let target = annotations
            .get(annotation.index)
            .map_err(|e| deletion_error(e.to_string()))?;
        annotations
            .delete_annotation(target)
            .map_err(|e| deletion_error(e.to_string()))
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.document.save_to_file(path).map_err(|e| Error::Save {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn info(&self) -> DocumentInfo {
        let meta = self.document.metadata();
        let tag = |tag_type: PdfDocumentMetadataTagType| {
            meta.get(tag_type).map(|t| t.value().to_string())
        };
        DocumentInfo {
            title: tag(PdfDocumentMetadataTagType::Title),
            author: tag(PdfDocumentMetadataTagType::Author),
            subject: tag(PdfDocumentMetadataTagType::Subject),
            creator: tag(PdfDocumentMetadataTagType::Creator),
            producer: tag(PdfDocumentMetadataTagType::Producer),
            creation_date: tag(PdfDocumentMetadataTagType::CreationDate),
            modification_date: tag(PdfDocumentMetadataTagType::ModificationDate),
        }
    }

    fn is_encrypted(&self) -> bool {
        self.header.encrypted
    }

    fn pdf_version(&self) -> Option<String> {
        self.header.version.clone()
    }
}

/// PDF `/Subtype` name for a PDFium annotation type
fn subtype_name(ann_type: PdfPageAnnotationType) -> Option<&'static str> {
    let name = match ann_type {
        PdfPageAnnotationType::Text => "Text",
        PdfPageAnnotationType::Link => "Link",
        PdfPageAnnotationType::FreeText => "FreeText",
        PdfPageAnnotationType::Line => "Line",
        PdfPageAnnotationType::Square => "Square",
        PdfPageAnnotationType::Circle => "Circle",
        PdfPageAnnotationType::Polygon => "Polygon",
        PdfPageAnnotationType::Polyline => "PolyLine",
        PdfPageAnnotationType::Highlight => "Highlight",
        PdfPageAnnotationType::Underline => "Underline",
        PdfPageAnnotationType::Squiggly => "Squiggly",
        PdfPageAnnotationType::Strikeout => "StrikeOut",
        PdfPageAnnotationType::Stamp => "Stamp",
        PdfPageAnnotationType::Caret => "Caret",
        PdfPageAnnotationType::Ink => "Ink",
        PdfPageAnnotationType::Popup => "Popup",
        PdfPageAnnotationType::FileAttachment => "FileAttachment",
        PdfPageAnnotationType::Sound => "Sound",
        PdfPageAnnotationType::Movie => "Movie",
        PdfPageAnnotationType::Widget => "Widget",
        PdfPageAnnotationType::Screen => "Screen",
        PdfPageAnnotationType::PrinterMark => "PrinterMark",
        PdfPageAnnotationType::TrapNet => "TrapNet",
        PdfPageAnnotationType::Watermark => "Watermark",
        PdfPageAnnotationType::ThreeD => "3D",
        PdfPageAnnotationType::RichMedia => "RichMedia",
        PdfPageAnnotationType::XfaWidget => "XFAWidget",
        PdfPageAnnotationType::Redacted => "Redact",
        PdfPageAnnotationType::Unknown => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtype_names() {
        assert_eq!(subtype_name(PdfPageAnnotationType::Text), Some("Text"));
        assert_eq!(
            subtype_name(PdfPageAnnotationType::Highlight),
            Some("Highlight")
        );
        assert_eq!(
            subtype_name(PdfPageAnnotationType::Strikeout),
            Some("StrikeOut")
        );
        assert_eq!(subtype_name(PdfPageAnnotationType::Unknown), None);
    }

    #[test]
    fn test_link_form_and_popup_names_match_filters() {
        use crate::pdf::{POPUP_TYPE, STRUCTURAL_TYPES};

        assert_eq!(subtype_name(PdfPageAnnotationType::Popup), Some(POPUP_TYPE));
        for ann_type in [
            PdfPageAnnotationType::Link,
            PdfPageAnnotationType::Widget,
            PdfPageAnnotationType::XfaWidget,
        ] {
            let name = subtype_name(ann_type).unwrap();
            assert!(STRUCTURAL_TYPES.contains(&name));
        }
    }

    #[test]
    fn test_default_config_search_order() {
        let config = EngineConfig::default().with_library_dir("/custom/pdfium");
        assert_eq!(config.library_dirs[0], PathBuf::from("/custom/pdfium"));
        assert_eq!(config.library_dirs.len(), 3);
    }

    #[test]
    fn test_password_error_maps_to_corrupt_document() {
        let err = map_open_error(PdfiumError::PdfiumLibraryInternalError(
            PdfiumInternalError::PasswordError,
        ));
        assert!(matches!(err, Error::CorruptDocument { reason } if reason.contains("password")));
    }
}
