use crate::analyzer::load_document;
use crate::{pdf_utils, AttachmentError, Result};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ── NewAttachment ─────────────────────────────────────────────────────────────

/// A local file to embed, with an optional stored name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    /// Path of the file on disk.
    pub path: PathBuf,
    /// Name to store in the PDF. Defaults to the file's base name.
    pub name: Option<String>,
}

impl NewAttachment {
    /// Embed `path` under its base name.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    /// Embed `path` under `name`.
    pub fn named<P: Into<PathBuf>>(path: P, name: &str) -> Self {
        Self {
            path: path.into(),
            name: Some(name.into()),
        }
    }

    /// Pair each file with a stored name from `renames`, a list of
    /// `(original base name, new name)` pairs. Files without a rename keep
    /// their base name.
    ///
    /// Fails with [`AttachmentError::UnknownRename`] when an original name
    /// does not match the base name of any input.
    pub fn with_renames<P: AsRef<Path>>(
        files: &[P],
        renames: &[(String, String)],
    ) -> Result<Vec<Self>> {
        let base_names = files
            .iter()
            .map(|f| base_name(f.as_ref()))
            .collect::<Result<Vec<String>>>()?;

        let mut lookup: HashMap<&str, &str> = HashMap::new();
        for (original, renamed) in renames {
            if !base_names.iter().any(|b| b == original) {
                return Err(AttachmentError::UnknownRename(original.clone()));
            }
            lookup.insert(original, renamed);
        }

        Ok(files
            .iter()
            .zip(&base_names)
            .map(|(file, base)| Self {
                path: file.as_ref().to_path_buf(),
                name: lookup.get(base.as_str()).map(|n| n.to_string()),
            })
            .collect())
    }

    /// The name the file will be stored under.
    pub fn stored_name(&self) -> Result<String> {
        match self.name {
            Some(ref name) => Ok(name.clone()),
            None => base_name(&self.path),
        }
    }
}

fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AttachmentError::InvalidFileName(path.to_path_buf()))
}

// ── AttachmentWriter ──────────────────────────────────────────────────────────

/// An in-memory copy of a document that new document-level attachments are
/// added to before it is written out once.
///
/// ```no_run
/// use pdfattach::{AttachmentWriter, NewAttachment};
/// use std::path::Path;
///
/// let mut writer = AttachmentWriter::open("report.pdf").unwrap();
/// writer.add_file(&NewAttachment::new("data.csv")).unwrap();
/// writer.add_bytes("notes.txt", b"checked by QA").unwrap();
/// writer.save(Path::new("report-with-data.pdf")).unwrap();
/// ```
pub struct AttachmentWriter {
    document: Document,
    added: usize,
}

impl AttachmentWriter {
    /// Load the document at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            document: load_document(path.as_ref())?,
            added: 0,
        })
    }

    /// Load a document from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            document: Document::load_mem(data)?,
            added: 0,
        })
    }

    /// Number of attachments added so far.
    pub fn added(&self) -> usize {
        self.added
    }

    /// Read a local file and embed it.
    pub fn add_file(&mut self, file: &NewAttachment) -> Result<()> {
        let name = file.stored_name()?;
        let data = std::fs::read(&file.path).map_err(|source| AttachmentError::FileRead {
            path: file.path.clone(),
            source,
        })?;
        self.add_bytes(&name, &data)
    }

    /// Embed `data` as a document-level attachment named `name`.
    ///
    /// Creates an `/EmbeddedFile` stream with `/Params/Size`, a `/Filespec`
    /// pointing at it, and an entry in the `/Names/EmbeddedFiles` name tree.
    /// Existing attachments with the same name are kept.
    pub fn add_bytes(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let stream_id = self.document.add_object(Stream::new(
            dictionary! {
                "Type" => "EmbeddedFile",
                "Params" => dictionary! { "Size" => data.len() as i64 },
            },
            data.to_vec(),
        ));

        let key = pdf_utils::encode_text_string(name);
        let spec_id = self.document.add_object(dictionary! {
            "Type" => "Filespec",
            "F" => Object::string_literal(key.clone()),
            "UF" => Object::string_literal(key.clone()),
            "EF" => dictionary! { "F" => stream_id, "UF" => stream_id },
        });

        self.insert_name_tree_entry(key, spec_id)?;
        self.added += 1;
        debug!(name, size = data.len(), "embedded file");
        Ok(())
    }

    /// Serialize the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.document
            .save_to(&mut buf)
            .map_err(|e| AttachmentError::Serialize(e.to_string()))?;
        Ok(buf)
    }

    /// Serialize the document and write it to `dest`, replacing any existing
    /// file only once the new content is fully on disk.
    pub fn save<P: AsRef<Path>>(mut self, dest: P) -> Result<()> {
        let dest = dest.as_ref();
        let bytes = self.to_bytes()?;
        write_atomically(dest, &bytes)?;
        info!(path = %dest.display(), added = self.added, bytes = bytes.len(), "wrote PDF");
        Ok(())
    }

    /// Add `(key, spec)` to the `/Names/EmbeddedFiles` tree, creating
    /// `/Names` and `/EmbeddedFiles` as needed.
    ///
    /// The tree is rebuilt as a single sorted leaf. Sorting is stable, so
    /// entries with equal keys stay in insertion order.
    fn insert_name_tree_entry(&mut self, key: Vec<u8>, spec_id: ObjectId) -> Result<()> {
        let root_id = self.document.trailer.get(b"Root")?.as_reference()?;

        let (names_value, ef_value) = {
            let catalog = self.document.get_object(root_id)?.as_dict()?;
            let names_value = catalog.get(b"Names").ok().cloned();
            let ef_value = names_value
                .as_ref()
                .and_then(|v| pdf_utils::resolve_dict(&self.document, v))
                .and_then(|d| d.get(b"EmbeddedFiles").ok())
                .cloned();
            (names_value, ef_value)
        };

        let had_kids = ef_value
            .as_ref()
            .and_then(|v| pdf_utils::resolve_dict(&self.document, v))
            .is_some_and(|root| root.has(b"Kids"));
        let mut entries = ef_value
            .as_ref()
            .map(|root| pdf_utils::name_tree_entries(&self.document, root))
            .unwrap_or_default();
        entries.push((key, Object::Reference(spec_id)));
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let names: Vec<Object> = entries
            .into_iter()
            .flat_map(|(k, v)| [Object::string_literal(k), v])
            .collect();
        let leaf = Object::Dictionary(dictionary! { "Names" => names });

        let ef_id = match ef_value {
            Some(Object::Reference(id)) => {
                self.document.objects.insert(id, leaf);
                id
            }
            _ => self.document.add_object(leaf),
        };

        match names_value {
            Some(Object::Reference(names_id)) => {
                self.document
                    .get_object_mut(names_id)?
                    .as_dict_mut()?
                    .set("EmbeddedFiles", ef_id);
            }
            Some(Object::Dictionary(_)) => {
                let catalog = self.document.get_object_mut(root_id)?.as_dict_mut()?;
                let mut names = catalog.get(b"Names")?.as_dict()?.clone();
                names.set("EmbeddedFiles", ef_id);
                catalog.set("Names", names);
            }
            _ => {
                self.document
                    .get_object_mut(root_id)?
                    .as_dict_mut()?
                    .set("Names", dictionary! { "EmbeddedFiles" => ef_id });
            }
        }

        // The old intermediate and leaf nodes are now unreachable.
        if had_kids {
            let pruned = self.document.prune_objects();
            debug!(count = pruned.len(), "pruned old name tree nodes");
        }
        Ok(())
    }
}

/// Write `bytes` to a temporary file next to `dest`, sync it, and rename it
/// over `dest`. An existing destination keeps its permissions.
fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |source: std::io::Error| AttachmentError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    if let Ok(meta) = std::fs::metadata(dest) {
        std::fs::set_permissions(tmp.path(), meta.permissions()).map_err(write_err)?;
    }
    tmp.persist(dest).map_err(|e| write_err(e.error))?;
    Ok(())
}
