use crate::file_discovery::{FileSpecDiscovery, FileSpecEntry};
use crate::file_parsing::FileSpecParser;
use crate::{Attachment, AttachmentConfig, AttachmentError, Result};
use lopdf::Document;
use tracing::{debug, warn};

/// Central engine that turns discovered file specifications into
/// [`Attachment`] records.
pub struct AttachmentScanner<'a> {
    document: &'a Document,
    config: &'a AttachmentConfig,
}

impl<'a> AttachmentScanner<'a> {
    pub fn new(document: &'a Document, config: &'a AttachmentConfig) -> Self {
        Self { document, config }
    }

    /// All attachments: document-level first, then page-level in page order.
    pub fn list_all(&self) -> Vec<Attachment> {
        let specs = FileSpecDiscovery::new(self.document).collect_file_specs();
        self.parse_listed(specs)
    }

    /// Attachments from the document name tree only.
    pub fn list_document_level(&self) -> Vec<Attachment> {
        let specs = FileSpecDiscovery::new(self.document).collect_from_names_tree();
        self.parse_listed(specs)
    }

    /// Attachments from page annotations only.
    pub fn list_page_level(&self) -> Vec<Attachment> {
        let specs = FileSpecDiscovery::new(self.document).collect_from_annotations();
        self.parse_listed(specs)
    }

    /// Number of file specifications that resolve to an attachment.
    pub fn count(&self) -> usize {
        self.list_all().len()
    }

    /// The first attachment named exactly `name`, with data loaded.
    ///
    /// Names are compared in listing order and only a matching entry's
    /// stream is decoded. Malformed entries are skipped, so a malformed
    /// entry never shadows a later valid one.
    pub fn find(&self, name: &str) -> Result<Option<Attachment>> {
        let parser = FileSpecParser::new(self.document);

        for spec in FileSpecDiscovery::new(self.document).collect_file_specs() {
            if !parser.name(&spec).is_ok_and(|stored| stored == name) {
                continue;
            }
            let Some(attachment) = Self::parse_or_skip(&parser, &spec, true) else {
                continue;
            };
            debug!(name, size = attachment.size, location = ?attachment.location, "attachment found");
            self.check_size(&attachment)?;
            return Ok(Some(attachment));
        }

        debug!(name, "attachment not found");
        Ok(None)
    }

    /// Parse file specifications for a listing, honouring `include_data`.
    fn parse_listed(&self, specs: Vec<FileSpecEntry>) -> Vec<Attachment> {
        let parser = FileSpecParser::new(self.document);

        specs
            .iter()
            .filter_map(|spec| Self::parse_or_skip(&parser, spec, self.config.include_data))
            .map(|attachment| self.drop_oversize_data(attachment))
            .collect()
    }

    /// Parse one specification, logging and discarding malformed entries.
    fn parse_or_skip(
        parser: &FileSpecParser,
        spec: &FileSpecEntry,
        with_data: bool,
    ) -> Option<Attachment> {
        match parser.parse(spec, with_data) {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                warn!(entry = %spec.label, location = ?spec.location, "skipping attachment: {e}");
                None
            }
        }
    }

    /// Validate that the attachment doesn't exceed the configured maximum.
    fn check_size(&self, attachment: &Attachment) -> Result<()> {
        if let Some(limit) = self.config.max_attachment_size {
            if attachment.size > limit {
                return Err(AttachmentError::SizeExceeded {
                    name: attachment.name.clone(),
                    size: attachment.size,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Listing never fails on size; it leaves `data` empty instead.
    fn drop_oversize_data(&self, mut attachment: Attachment) -> Attachment {
        if attachment.data.is_some() {
            if let Err(e) = self.check_size(&attachment) {
                warn!("not loading data: {e}");
                attachment.data = None;
            }
        }
        attachment
    }
}
