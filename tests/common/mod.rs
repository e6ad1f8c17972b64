//! File-backed fake PDF engine for integration tests
//!
//! Documents are stored as JSON in files with a `.pdf` name. Deleting an
//! annotation removes it from the page's list in place, so the positions of
//! later annotations shift the way they do in a real PDF library.

#![allow(dead_code)]

use pdf_annot_remover::pdf::{
    AnnotationHandle, DocumentHandle, DocumentInfo, Field, PdfEngine, Rect,
};
use pdf_annot_remover::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FakeAnnotation {
    pub name: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub rect: Option<[f32; 4]>,
    /// Reading the rectangle fails
    #[serde(default)]
    pub broken_rect: bool,
    /// Deleting this annotation fails
    #[serde(default)]
    pub undeletable: bool,
}

impl FakeAnnotation {
    pub fn new(name: &str, subtype: &str) -> Self {
        Self {
            name: name.to_string(),
            subtype: Some(subtype.to_string()),
            ..Default::default()
        }
    }

    pub fn untyped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn contents(mut self, contents: &str) -> Self {
        self.contents = Some(contents.to_string());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn rect(mut self, rect: [f32; 4]) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn broken_rect(mut self) -> Self {
        self.broken_rect = true;
        self
    }

    pub fn undeletable(mut self) -> Self {
        self.undeletable = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FakeInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FakeDocument {
    pub pages: Vec<Vec<FakeAnnotation>>,
    #[serde(default)]
    pub info: FakeInfo,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub encrypted: bool,
}

impl FakeDocument {
    pub fn with_pages(pages: Vec<Vec<FakeAnnotation>>) -> Self {
        Self {
            pages,
            version: Some("1.7".to_string()),
            ..Default::default()
        }
    }

    pub fn blank(page_count: usize) -> Self {
        Self::with_pages(vec![Vec::new(); page_count])
    }

    pub fn annotation_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        fs::write(path, serde_json::to_vec_pretty(self).unwrap()).unwrap();
        path.to_path_buf()
    }

    pub fn read(path: &Path) -> Self {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }
}

/// The two-page document used throughout the tests: one "Text" note on
/// page 1 and two "Highlight" annotations on page 2.
pub fn sample_document() -> FakeDocument {
    FakeDocument::with_pages(vec![
        vec![FakeAnnotation::new("note", "Text")
            .contents("Check this")
            .author("Reviewer")
            .rect([10.0, 20.0, 30.0, 40.0])],
        vec![
            FakeAnnotation::new("hl-1", "Highlight").rect([50.0, 60.0, 150.0, 72.0]),
            FakeAnnotation::new("hl-2", "Highlight"),
        ],
    ])
}

#[derive(Default)]
pub struct FakeEngine {
    pub fail_save: bool,
    /// Reading annotations on this page (0-indexed) fails
    pub broken_page: Option<usize>,
    opened: Cell<usize>,
    closed: Cell<usize>,
    deleted: RefCell<Vec<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_save() -> Self {
        Self {
            fail_save: true,
            ..Default::default()
        }
    }

    pub fn with_broken_page(page: usize) -> Self {
        Self {
            broken_page: Some(page),
            ..Default::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn closed(&self) -> usize {
        self.closed.get()
    }

    /// Names of deleted annotations in deletion order
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.borrow().clone()
    }
}

impl PdfEngine for FakeEngine {
    fn open<'e>(&'e self, path: &Path) -> Result<Box<dyn DocumentHandle + 'e>> {
        let bytes = fs::read(path)?;
        let document: FakeDocument =
            serde_json::from_slice(&bytes).map_err(|e| Error::CorruptDocument {
                reason: e.to_string(),
            })?;

        self.opened.set(self.opened.get() + 1);
        Ok(Box::new(FakeHandle {
            engine: self,
            document,
        }))
    }
}

struct FakeHandle<'e> {
    engine: &'e FakeEngine,
    document: FakeDocument,
}

impl DocumentHandle for FakeHandle<'_> {
    fn page_count(&self) -> usize {
        self.document.pages.len()
    }

    fn annotations(&self, page: usize) -> Result<Vec<AnnotationHandle>> {
        if self.engine.broken_page == Some(page) {
            return Err(Error::Pdfium {
                reason: format!("cannot load annotations of page {}", page + 1),
            });
        }

        Ok(self.document.pages[page]
            .iter()
            .enumerate()
            .map(|(index, annotation)| AnnotationHandle {
                index,
                subtype: Field::from_option(annotation.subtype.clone()),
                contents: Field::from_option(annotation.contents.clone()),
                author: Field::from_option(annotation.author.clone()),
                rect: if annotation.broken_rect {
                    Field::Unreadable("malformed /Rect".to_string())
                } else {
                    Field::from_option(annotation.rect.map(|[left, bottom, right, top]| Rect {
                        left,
                        bottom,
                        right,
                        top,
                    }))
                },
            })
            .collect())
    }

    fn delete_annotation(&mut self, page: usize, annotation: &AnnotationHandle) -> Result<()> {
        let annotations = &mut self.document.pages[page];
        let failure = |reason: &str| Error::AnnotationDeletion {
            page: page + 1,
            index: annotation.index,
            reason: reason.to_string(),
        };

        let target = annotations
            .get(annotation.index)
            .ok_or_else(|| failure("index out of range"))?;
        if target.undeletable {
            return Err(failure("annotation is locked"));
        }

        let removed = annotations.remove(annotation.index);
        self.engine.deleted.borrow_mut().push(removed.name);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        if self.engine.fail_save {
            return Err(Error::Save {
                path: path.display().to_string(),
                reason: "disk full".to_string(),
            });
        }
        let bytes = serde_json::to_vec_pretty(&self.document).map_err(|e| Error::Save {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(path, bytes)?;
        Ok(())
    }

    fn info(&self) -> DocumentInfo {
        DocumentInfo {
            title: self.document.info.title.clone(),
            author: self.document.info.author.clone(),
            producer: self.document.info.producer.clone(),
            ..Default::default()
        }
    }

    fn is_encrypted(&self) -> bool {
        self.document.encrypted
    }

    fn pdf_version(&self) -> Option<String> {
        self.document.version.clone()
    }

    fn close(self: Box<Self>) {
        self.engine.closed.set(self.engine.closed.get() + 1);
    }
}
