//! PDF processing layer
//!
//! The core only talks to a PDF library through [`PdfEngine`] and
//! [`DocumentHandle`]. The production engine is PDFium, with qpdf used to probe
//! header information that PDFium does not expose directly.

mod pdfium;
mod qpdf;

use crate::error::Result;
use serde::Serialize;
use std::path::Path;

pub use self::pdfium::{EngineConfig, PdfiumEngine};
pub use self::qpdf::{probe_header, HeaderInfo};

/// Type tag used when the library cannot classify an annotation.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Subtype of the pop-up windows attached to markup annotations.
pub const POPUP_TYPE: &str = "Popup";

/// Subtypes that belong to the page's structure (hyperlinks, form fields).
/// They are never reported or removed.
pub const STRUCTURAL_TYPES: &[&str] = &["Link", "Widget", "XFAWidget"];

/// An annotation attribute read from the library.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// The attribute was read successfully.
    Present(T),
    /// The annotation does not carry this attribute.
    Absent,
    /// The library failed to read the attribute.
    Unreadable(String),
}

impl<T> Field<T> {
    /// Build a field from an optional value, treating `None` as absent.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Absent,
        }
    }

    /// The value, if it was read.
    pub fn present(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent | Field::Unreadable(_) => None,
        }
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, Field::Unreadable(_))
    }
}

impl<T, E: std::fmt::Display> From<std::result::Result<T, E>> for Field<T> {
    fn from(value: std::result::Result<T, E>) -> Self {
        match value {
            Ok(v) => Field::Present(v),
            Err(e) => Field::Unreadable(e.to_string()),
        }
    }
}

/// Annotation bounding rectangle in PDF user space (`/Rect` order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Rect {
    pub fn to_array(self) -> [f32; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}

/// One annotation as enumerated on a page
///
/// `index` is the annotation's position in the page's annotation list at the
/// time of enumeration. Deleting an annotation may shift the positions of the
/// annotations after it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationHandle {
    pub index: usize,
    /// PDF subtype name, e.g. "Text" or "Highlight"
    pub subtype: Field<String>,
    /// `/Contents`
    pub contents: Field<String>,
    /// `/T`, conventionally the author
    pub author: Field<String>,
    pub rect: Field<Rect>,
}

impl AnnotationHandle {
    fn subtype_is(&self, names: &[&str]) -> bool {
        match &self.subtype {
            Field::Present(name) => names.contains(&name.as_str()),
            Field::Absent | Field::Unreadable(_) => false,
        }
    }

    /// Markup annotations are the ones that get reported, counted and removed.
    /// Pop-ups and structural annotations are not.
    pub fn is_markup(&self) -> bool {
        !self.is_popup() && !self.subtype_is(STRUCTURAL_TYPES)
    }

    pub fn is_popup(&self) -> bool {
        self.subtype_is(&[POPUP_TYPE])
    }
}

/// Document information dictionary entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
}

/// An open PDF document
pub trait DocumentHandle {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Annotations on a page (0-indexed) in enumeration order.
    fn annotations(&self, page: usize) -> Result<Vec<AnnotationHandle>>;

    /// Delete the annotation at `annotation.index` on a page (0-indexed).
    fn delete_annotation(&mut self, page: usize, annotation: &AnnotationHandle) -> Result<()>;

    /// Write the document to `path`.
    fn save(&mut self, path: &Path) -> Result<()>;

    fn info(&self) -> DocumentInfo;

    fn is_encrypted(&self) -> bool;

    /// PDF header version such as "1.7", if known.
    fn pdf_version(&self) -> Option<String>;

    /// Release the underlying library handle.
    fn close(self: Box<Self>) {}
}

/// Opens PDF documents
pub trait PdfEngine {
    fn open<'e>(&'e self, path: &Path) -> Result<Box<dyn DocumentHandle + 'e>>;
}
