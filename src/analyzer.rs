use crate::extraction_engine::AttachmentScanner;
use crate::{Attachment, AttachmentConfig, AttachmentError, Result};
use lopdf::Document;
use std::path::Path;
use tracing::debug;

// ── PdfAttachments ────────────────────────────────────────────────────────────

/// A parsed PDF opened for reading its attachments.
///
/// # Creating a reader
///
/// ```no_run
/// use pdfattach::{AttachmentConfig, PdfAttachments};
///
/// // From a file path
/// let a = PdfAttachments::from_path("report.pdf").unwrap();
///
/// // From an in-memory buffer
/// let bytes = std::fs::read("report.pdf").unwrap();
/// let a = PdfAttachments::from_bytes(&bytes).unwrap();
///
/// // With custom configuration
/// let cfg = AttachmentConfig {
///     include_data: true,
///     max_attachment_size: Some(10 * 1024 * 1024),
/// };
/// let a = PdfAttachments::with_config("report.pdf", cfg).unwrap();
/// ```
pub struct PdfAttachments {
    document: Document,
    config: AttachmentConfig,
}

impl PdfAttachments {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Load a PDF from the file system.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_config(path, AttachmentConfig::default())
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            document: Document::load_mem(data)?,
            config: AttachmentConfig::default(),
        })
    }

    /// Load a PDF from the file system with a custom [`AttachmentConfig`].
    pub fn with_config<P: AsRef<Path>>(path: P, config: AttachmentConfig) -> Result<Self> {
        Ok(Self {
            document: load_document(path.as_ref())?,
            config,
        })
    }

    // ── Listing ───────────────────────────────────────────────────────────────

    /// Every attachment: document-level first, then page-level in page order.
    ///
    /// `data` is only loaded when [`AttachmentConfig::include_data`] is set.
    pub fn attachments(&self) -> Vec<Attachment> {
        self.scanner().list_all()
    }

    /// Attachments from the `/Names/EmbeddedFiles` name tree.
    pub fn document_attachments(&self) -> Vec<Attachment> {
        self.scanner().list_document_level()
    }

    /// Attachments from `/FileAttachment` annotations, in page order.
    pub fn page_attachments(&self) -> Vec<Attachment> {
        self.scanner().list_page_level()
    }

    /// Returns the number of readable attachments.
    pub fn count(&self) -> usize {
        self.scanner().count()
    }

    /// Returns `true` when the document has at least one readable attachment.
    pub fn has_attachments(&self) -> bool {
        self.count() > 0
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// The first attachment named exactly `name`, in listing order, with its
    /// bytes loaded. `Ok(None)` when there is no such attachment.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pdfattach::PdfAttachments;
    ///
    /// let pdf = PdfAttachments::from_path("report.pdf").unwrap();
    /// match pdf.find("data.csv").unwrap() {
    ///     Some(a) => a.save_to("data.csv").unwrap(),
    ///     None => eprintln!("no data.csv in report.pdf"),
    /// }
    /// ```
    pub fn find(&self, name: &str) -> Result<Option<Attachment>> {
        self.scanner().find(name)
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Returns a reference to the underlying [`lopdf::Document`].
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns a reference to the active [`AttachmentConfig`].
    pub fn config(&self) -> &AttachmentConfig {
        &self.config
    }

    fn scanner(&self) -> AttachmentScanner<'_> {
        AttachmentScanner::new(&self.document, &self.config)
    }
}

/// Load a document from disk, distinguishing a missing path from one that
/// lopdf cannot parse.
pub(crate) fn load_document(path: &Path) -> Result<Document> {
    if !path.is_file() {
        return Err(AttachmentError::NotFound(path.to_path_buf()));
    }
    debug!(path = %path.display(), "loading PDF");
    Document::load(path).map_err(|source| AttachmentError::DocumentOpen {
        path: path.to_path_buf(),
        source,
    })
}
