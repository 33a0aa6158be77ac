//! # pdfattach
//!
//! List, extract, and add file attachments in PDF documents.
//!
//! ## What this crate does
//!
//! 1. **List attachments**: walks the `/Names/EmbeddedFiles` name tree and the
//!    `/FileAttachment` annotations of every page, in that order.
//! 2. **Get one attachment**: finds the first attachment with an exact name
//!    and returns its decoded bytes.
//! 3. **Add attachments**: embeds local files as document-level attachments
//!    and writes the result atomically (temporary file, then rename).
//!
//! Parsing and serialization are delegated to [`lopdf`].
//!
//! ## Quick example
//!
//! ```no_run
//! use pdfattach::{get_attachment, list_attachments};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! for attachment in list_attachments("report.pdf")? {
//!     println!("{} — {} bytes", attachment.name, attachment.size);
//! }
//!
//! if let Some(csv) = get_attachment("report.pdf", "data.csv")? {
//!     std::fs::write("data.csv", csv.data.unwrap_or_default())?;
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

mod analyzer;
mod embedded;
mod extraction_engine;
mod file_discovery;
mod file_parsing;
mod pdf_utils;
mod writer;

#[cfg(test)]
mod fixtures;

pub use analyzer::PdfAttachments;
pub use embedded::{Attachment, AttachmentLocation, AttachmentMetadata};
pub use writer::{AttachmentWriter, NewAttachment};

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for [`PdfAttachments`].
#[derive(Debug, Clone, Default)]
pub struct AttachmentConfig {
    /// When `true`, listing also loads each attachment's bytes into
    /// [`Attachment::data`]. Lookups always load bytes.
    pub include_data: bool,

    /// If set, [`PdfAttachments::find`] returns
    /// [`AttachmentError::SizeExceeded`] for a match larger than this many
    /// bytes, and listing with `include_data` leaves `data` empty for such
    /// attachments.
    pub max_attachment_size: Option<usize>,
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// The source path does not exist or is not a regular file.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The source document exists but could not be read or parsed.
    #[error("cannot open PDF '{}': {source}", .path.display())]
    DocumentOpen {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// The document structure is invalid (in-memory input, or a catalog that
    /// cannot be navigated while adding attachments).
    #[error("invalid PDF: {0}")]
    InvalidPdf(#[from] lopdf::Error),

    /// A single attachment entry could not be resolved. Scanners skip these.
    #[error("malformed attachment '{0}': {1}")]
    MalformedEntry(String, String),

    /// A local file to embed could not be read.
    #[error("cannot read '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A local file to embed has no usable base name.
    #[error("cannot determine a file name for '{}'", .0.display())]
    InvalidFileName(PathBuf),

    /// The output document could not be written.
    #[error("cannot write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// lopdf failed to serialize the modified document.
    #[error("cannot serialize PDF: {0}")]
    Serialize(String),

    /// A rename refers to a file name that is not among the inputs.
    #[error("rename key doesn't match any input file: {0}")]
    UnknownRename(String),

    /// An attachment is larger than [`AttachmentConfig::max_attachment_size`].
    #[error("attachment '{name}' is {size} bytes, exceeding the limit of {limit} bytes")]
    SizeExceeded {
        name: String,
        size: usize,
        limit: usize,
    },
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, AttachmentError>;

// ── Free functions ───────────────────────────────────────────────────────────

/// Return every attachment in the PDF at `path`: document-level attachments
/// first, then page-level attachments in page order.
///
/// Names and sizes are always populated; `data` is `None`.
pub fn list_attachments<P: AsRef<Path>>(path: P) -> Result<Vec<Attachment>> {
    Ok(PdfAttachments::from_path(path)?.attachments())
}

/// Return the first attachment named exactly `name`, with its bytes loaded.
///
/// `Ok(None)` means no attachment has that name.
pub fn get_attachment<P: AsRef<Path>>(path: P, name: &str) -> Result<Option<Attachment>> {
    PdfAttachments::from_path(path)?.find(name)
}

/// Embed each file in `files` as a document-level attachment named after its
/// base filename, then write the document to `output` (or back to `path`
/// when `output` is `None`).
///
/// Returns the number of files embedded. Nothing is written unless every
/// file was read successfully.
pub fn add_attachment<P, F>(path: P, files: &[F], output: Option<&Path>) -> Result<usize>
where
    P: AsRef<Path>,
    F: AsRef<Path>,
{
    let inputs: Vec<NewAttachment> = files
        .iter()
        .map(|f| NewAttachment::new(f.as_ref()))
        .collect();
    add_attachments(path, &inputs, output)
}

/// Like [`add_attachment`], but each input may carry its own stored name.
pub fn add_attachments<P: AsRef<Path>>(
    path: P,
    files: &[NewAttachment],
    output: Option<&Path>,
) -> Result<usize> {
    let path = path.as_ref();
    let mut writer = AttachmentWriter::open(path)?;
    for file in files {
        writer.add_file(file)?;
    }
    let count = writer.added();
    writer.save(output.unwrap_or(path))?;
    Ok(count)
}
