use crate::pdf_utils;
use crate::AttachmentLocation;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

/// A file specification found in the document, not yet resolved.
#[derive(Debug, Clone)]
pub struct FileSpecEntry {
    /// The name-tree key, or a label derived from the annotation.
    pub label: String,
    /// The file specification as stored: an indirect reference or an inline
    /// dictionary.
    pub spec: Object,
    pub location: AttachmentLocation,
    /// The annotation's `/Contents`, for page-level entries.
    pub annotation_text: Option<String>,
}

/// Handles discovery of embedded file specifications from PDF documents.
///
/// File specifications come from two sources:
/// 1. The /Names/EmbeddedFiles name tree in the document catalog
/// 2. /FileAttachment annotations on pages
pub struct FileSpecDiscovery<'a> {
    document: &'a Document,
}

impl<'a> FileSpecDiscovery<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Every file specification, document-level first and then page-level
    /// in page order.
    pub fn collect_file_specs(&self) -> Vec<FileSpecEntry> {
        let mut specs = self.collect_from_names_tree();
        specs.extend(self.collect_from_annotations());
        specs
    }

    /// Collect file specifications from the document's names tree.
    ///
    /// A missing catalog, `/Names` or `/EmbeddedFiles` yields an empty list.
    pub fn collect_from_names_tree(&self) -> Vec<FileSpecEntry> {
        let Some(ef_root) = self.embedded_files_root() else {
            return Vec::new();
        };

        let specs: Vec<FileSpecEntry> = pdf_utils::name_tree_entries(self.document, ef_root)
            .into_iter()
            .map(|(key, spec)| FileSpecEntry {
                label: pdf_utils::decode_text_string(&key),
                spec,
                location: AttachmentLocation::Document,
                annotation_text: None,
            })
            .collect();
        debug!(count = specs.len(), "embedded files in name tree");
        specs
    }

    /// Collect file specifications from page FileAttachment annotations.
    pub fn collect_from_annotations(&self) -> Vec<FileSpecEntry> {
        let mut specs = Vec::new();

        // get_pages() is keyed by 1-based page number, in order.
        for (page_number, page_id) in self.document.get_pages() {
            specs.extend(self.process_page_annotations(page_number, page_id));
        }

        debug!(count = specs.len(), "file attachment annotations");
        specs
    }

    fn embedded_files_root(&self) -> Option<&'a Object> {
        let catalog = self.document.catalog().ok()?;
        let names_dict = pdf_utils::dict_entry(self.document, catalog, b"Names")?;
        names_dict.get(b"EmbeddedFiles").ok()
    }

    /// Process annotations on a single page.
    fn process_page_annotations(&self, page_number: u32, page_id: ObjectId) -> Vec<FileSpecEntry> {
        let Ok(page_dict) = self.document.get_object(page_id).and_then(|o| o.as_dict()) else {
            return Vec::new();
        };

        let Some(annots) = page_dict
            .get(b"Annots")
            .ok()
            .and_then(|v| pdf_utils::resolve_array(self.document, v))
        else {
            return Vec::new();
        };

        annots
            .iter()
            .filter_map(|annot| self.process_file_attachment_annotation(page_number, annot))
            .collect()
    }

    /// Process a single annotation, keeping it only if it is a FileAttachment.
    fn process_file_attachment_annotation(
        &self,
        page_number: u32,
        annot: &Object,
    ) -> Option<FileSpecEntry> {
        let dict = pdf_utils::resolve_dict(self.document, annot)?;

        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|v| pdf_utils::resolve(self.document, v))?
            .as_name()
            .ok()?;
        if subtype != b"FileAttachment" {
            return None;
        }

        let spec = dict.get(b"FS").ok()?.clone();

        Some(FileSpecEntry {
            label: Self::annotation_label(dict),
            spec,
            location: AttachmentLocation::Page(page_number),
            annotation_text: pdf_utils::extract_string_from_dict(dict, b"Contents"),
        })
    }

    /// A fallback name for an annotation whose file specification carries
    /// none. Uses `/T`, then `/NM`, then `"attachment"`.
    fn annotation_label(dict: &Dictionary) -> String {
        for key in [b"T" as &[u8], b"NM"] {
            if let Some(name) = pdf_utils::extract_string_from_dict(dict, key) {
                return name;
            }
        }
        "attachment".into()
    }
}
