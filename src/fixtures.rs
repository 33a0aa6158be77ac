//! In-memory PDF builder for unit tests.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Builds a small PDF with blank pages and document-level embedded files.
pub struct PdfFixture {
    pages: u32,
    document_files: Vec<(String, Vec<u8>)>,
}

impl PdfFixture {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            document_files: Vec::new(),
        }
    }

    pub fn document_file(mut self, name: &str, data: &[u8]) -> Self {
        self.document_files.push((name.into(), data.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id: ObjectId = doc.new_object_id();

        let kids: Vec<Object> = (0..self.pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 72.into(), 72.into()],
                })
                .into()
            })
            .collect();

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
            for (name, data) in &self.document_files {
                let stream_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "EmbeddedFile",
                        "Params" => dictionary! { "Size" => data.len() as i64 },
                    },
                    data.clone(),
                ));
                let spec_id = doc.add_object(dictionary! {
                    "Type" => "Filespec",
                    "F" => Object::string_literal(name.as_str()),
                    "EF" => dictionary! { "F" => stream_id },
                });
                names.push(Object::string_literal(name.as_str()));
                names.push(spec_id.into());
            }
            let tree_id = doc.add_object(dictionary! { "Names" => names });
            catalog.set("Names", dictionary! { "EmbeddedFiles" => tree_id });
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }
}
