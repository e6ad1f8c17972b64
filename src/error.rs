//! Error types for the annotation remover

use thiserror::Error;

/// Result type alias for the annotation remover
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the annotation remover
#[derive(Error, Debug)]
pub enum Error {
    /// Input path does not exist
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// Input path exists but is not a regular file
    #[error("Path is not a file: {path}")]
    NotAFile { path: String },

    /// Input path does not carry the `.pdf` extension
    #[error("File must have .pdf extension: {path}")]
    InvalidFormat { path: String },

    /// Input file is zero bytes long
    #[error("PDF file is empty: {path}")]
    EmptyFile { path: String },

    /// The PDF library could not parse the file, or it has no pages
    #[error("Invalid PDF file: {reason}")]
    CorruptDocument { reason: String },

    /// A query was made before a successful `validate`
    #[error("PDF not loaded. Call validate() first.")]
    NotLoaded,

    /// Backup copy could not be written
    #[error("Failed to create backup of {path}: {source}")]
    Backup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A single annotation could not be deleted
    #[error("Failed to remove annotation {index} on page {page}: {reason}")]
    AnnotationDeletion {
        page: usize,
        index: usize,
        reason: String,
    },

    /// The cleaned document could not be written
    #[error("Failed to save {path}: {reason}")]
    Save { path: String, reason: String },

    /// Any other failure while processing a document
    #[error("Error processing {path}: {source}")]
    Processing {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// The PDFium shared library could not be loaded
    #[error("PDFium unavailable: {reason}")]
    EngineUnavailable { reason: String },

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// qpdf error
    #[error("qpdf error: {reason}")]
    QpdfError { reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a pipeline failure with the document it happened on.
    pub fn processing(path: &std::path::Path, source: Error) -> Self {
        Error::Processing {
            path: path.display().to_string(),
            source: Box::new(source),
        }
    }
}
