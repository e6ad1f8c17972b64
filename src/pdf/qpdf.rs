//! qpdf header probe
//!
//! PDFium does not report the header version string or whether the file uses
//! a security handler, so both are read with qpdf (vendored FFI).

use crate::error::{Error, Result};
use qpdf::QPdf;
use std::path::Path;

/// Header information read with qpdf
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Header version such as "1.7"
    pub version: Option<String>,
    pub encrypted: bool,
}

/// Map qpdf crate errors to our error types
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    Error::QpdfError {
        reason: e.to_string(),
    }
}

/// Read the header version and encryption flag of a PDF file.
///
/// A document that needs a user password cannot be opened, but is reported
/// as encrypted with an unknown version rather than as an error.
pub fn probe_header(path: &Path) -> Result<HeaderInfo> {
    let data = std::fs::read(path)?;
    probe_header_bytes(&data)
}

fn probe_header_bytes(data: &[u8]) -> Result<HeaderInfo> {
    match QPdf::read_from_memory(data) {
        Ok(qpdf) => {
            let version = qpdf.get_pdf_version();
            Ok(HeaderInfo {
                version: Some(version).filter(|v| !v.is_empty()),
                encrypted: qpdf.is_encrypted(),
            })
        }
        Err(e) => match e.error_code() {
            qpdf::QPdfErrorCode::InvalidPassword => Ok(HeaderInfo {
                version: None,
                encrypted: true,
            }),
            _ => Err(map_qpdf_error(e)),
        },
    }
}
