// Fixture PDFs for the integration tests, built with lopdf and written to a
// temporary directory.

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

/// A blank document with optional document-level and page-level attachments.
pub struct FixturePdf {
    pages: u32,
    document_files: Vec<(String, Vec<u8>, Option<String>)>,
    page_files: Vec<(u32, String, Vec<u8>, Option<String>)>,
    pages_without_annots: Vec<u32>,
    indirect_annots: bool,
    inline_file_specs: bool,
}

impl FixturePdf {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            document_files: Vec::new(),
            page_files: Vec::new(),
            pages_without_annots: Vec::new(),
            indirect_annots: false,
            inline_file_specs: false,
        }
    }

    pub fn document_file(mut self, name: &str, data: &[u8]) -> Self {
        self.document_files.push((name.into(), data.to_vec(), None));
        self
    }

    /// A document-level file whose stream carries `/Filter filter` over
    /// `raw` and no declared size.
    pub fn filtered_document_file(mut self, name: &str, filter: &str, raw: &[u8]) -> Self {
        self.document_files
            .push((name.into(), raw.to_vec(), Some(filter.into())));
        self
    }

    /// Leave the `/Annots` key off the given 1-based page.
    pub fn without_annots(mut self, page: u32) -> Self {
        self.pages_without_annots.push(page);
        self
    }

    /// Store each page's `/Annots` array as an indirect object.
    pub fn indirect_annots(mut self) -> Self {
        self.indirect_annots = true;
        self
    }

    /// Put page-level file specifications inline in the annotation's `/FS`.
    pub fn inline_file_specs(mut self) -> Self {
        self.inline_file_specs = true;
        self
    }

    /// Attach a file to the given 1-based page via a FileAttachment annotation.
    pub fn page_file(mut self, page: u32, name: &str, data: &[u8]) -> Self {
        self.page_files.push((page, name.into(), data.to_vec(), None));
        self
    }

    /// Like [`page_file`](Self::page_file), with annotation `/Contents`.
    pub fn page_file_with_contents(mut self, page: u32, name: &str, data: &[u8], text: &str) -> Self {
        self.page_files
            .push((page, name.into(), data.to_vec(), Some(text.into())));
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id: ObjectId = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::new();
        for page in 1..=self.pages {
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            };
            if !self.pages_without_annots.contains(&page) {
                let annots = self.page_annotations(&mut doc, page);
                if self.indirect_annots {
                    page_dict.set("Annots", doc.add_object(annots));
                } else {
                    page_dict.set("Annots", annots);
                }
            }
            kids.push(doc.add_object(page_dict).into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.pages as i64,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if !self.document_files.is_empty() {
            let mut names: Vec<Object> = Vec::new();
            for (name, data, filter) in &self.document_files {
                let spec = file_spec(&mut doc, name, data, filter.as_deref());
                let spec_id = doc.add_object(spec);
                names.push(Object::string_literal(name.as_str()));
                names.push(spec_id.into());
            }
            catalog.set("Names", dictionary! { "EmbeddedFiles" => dictionary! { "Names" => names } });
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }

    pub fn write_to(&self, path: &Path) -> PathBuf {
        std::fs::write(path, self.to_bytes()).expect("failed to write test PDF");
        path.to_path_buf()
    }

    fn page_annotations(&self, doc: &mut Document, page: u32) -> Vec<Object> {
        let mut annots: Vec<Object> = Vec::new();
        for (_, name, data, text) in self.page_files.iter().filter(|f| f.0 == page) {
            let spec = file_spec(doc, name, data, None);
            let fs: Object = if self.inline_file_specs {
                Object::Dictionary(spec)
            } else {
                doc.add_object(spec).into()
            };
            let mut annot = dictionary! {
                "Type" => "Annot",
                "Subtype" => "FileAttachment",
                "Rect" => vec![0.into(), 0.into(), 16.into(), 16.into()],
                "FS" => fs,
            };
            if let Some(text) = text {
                annot.set("Contents", Object::string_literal(text.as_str()));
            }
            annots.push(doc.add_object(annot).into());
        }
        // A non-attachment annotation that must be ignored.
        annots.push(
            doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Text",
                "Rect" => vec![0.into(), 0.into(), 8.into(), 8.into()],
            })
            .into(),
        );
        annots
    }
}

fn file_spec(doc: &mut Document, name: &str, data: &[u8], filter: Option<&str>) -> Dictionary {
    let stream_dict = match filter {
        Some(filter) => dictionary! { "Type" => "EmbeddedFile", "Filter" => filter },
        None => dictionary! {
            "Type" => "EmbeddedFile",
            "Params" => dictionary! { "Size" => data.len() as i64 },
        },
    };
    let stream_id = doc.add_object(Stream::new(stream_dict, data.to_vec()));
    dictionary! {
        "Type" => "Filespec",
        "F" => Object::string_literal(name),
        "UF" => Object::string_literal(name),
        "EF" => dictionary! { "F" => stream_id },
    }
}
