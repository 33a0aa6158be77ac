use std::fmt;
use std::path::Path;

// ── AttachmentLocation ───────────────────────────────────────────────────────

/// Where an attachment was found inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentLocation {
    /// The catalog's `/Names/EmbeddedFiles` name tree.
    Document,
    /// A `/FileAttachment` annotation on the given 1-based page.
    Page(u32),
}

impl AttachmentLocation {
    /// The 1-based page number for page-level attachments.
    pub fn page(&self) -> Option<u32> {
        match self {
            AttachmentLocation::Document => None,
            AttachmentLocation::Page(n) => Some(*n),
        }
    }
}

// ── Attachment ───────────────────────────────────────────────────────────────

/// A file attached to a PDF document.
///
/// Returned by [`crate::list_attachments`] and [`crate::get_attachment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The filename as stored in the PDF file specification (Unicode name
    /// preferred over ASCII name). Not unique within a document.
    pub name: String,

    /// Size in bytes. Listing reports the declared `/Params/Size` when
    /// present; when `data` is loaded this is always `data.len()`.
    pub size: usize,

    /// The decoded file content, present only when it was requested.
    pub data: Option<Vec<u8>>,

    /// Document-level or page-level origin.
    pub location: AttachmentLocation,

    /// Optional metadata read from the file specification and the stream's
    /// `/Params` dictionary.
    pub metadata: AttachmentMetadata,
}

impl Attachment {
    /// Write the loaded bytes to `dest`.
    ///
    /// Fails with [`std::io::ErrorKind::InvalidInput`] when the attachment
    /// was listed without data.
    pub fn save_to<P: AsRef<Path>>(&self, dest: P) -> std::io::Result<()> {
        let data = self.data.as_deref().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("attachment '{}' has no loaded data", self.name),
            )
        })?;
        std::fs::write(dest, data)
    }

    /// The stored name reduced to its final path component, safe to use as
    /// a file name in the current directory. Falls back to `"attachment"`.
    pub fn file_name(&self) -> &str {
        Path::new(&self.name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("attachment")
    }

    /// Returns `true` for attachments from the document name tree.
    pub fn is_document_level(&self) -> bool {
        self.location == AttachmentLocation::Document
    }
}

impl fmt::Display for Attachment {
    /// `  <name>[ (page N)]  —  <size> bytes`, plus an indented description
    /// line when one is present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}", self.name)?;
        if let Some(page) = self.location.page() {
            write!(f, " (page {page})")?;
        }
        write!(f, "  —  {} bytes", self.size)?;
        if let Some(ref description) = self.metadata.description {
            write!(f, "\n    {description}")?;
        }
        Ok(())
    }
}

// ── AttachmentMetadata ───────────────────────────────────────────────────────

/// Metadata associated with an [`Attachment`].
///
/// All fields are optional: a conforming PDF need not populate them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentMetadata {
    /// Human-readable description from the file specification's `/Desc`, or
    /// the annotation's `/Contents` for page-level attachments.
    pub description: Option<String>,

    /// MIME type from the embedded stream's `/Subtype` (e.g. `"text/csv"`).
    pub mime_type: Option<String>,

    /// Creation date from `/Params/CreationDate`, in PDF date format.
    pub creation_date: Option<String>,

    /// Modification date from `/Params/ModDate`.
    pub modification_date: Option<String>,

    /// MD5 checksum from `/Params/CheckSum` as a lowercase hex string.
    pub checksum: Option<String>,
}
