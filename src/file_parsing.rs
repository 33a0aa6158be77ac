use crate::file_discovery::FileSpecEntry;
use crate::{pdf_utils, Attachment, AttachmentError, AttachmentMetadata, Result};
use lopdf::{Dictionary, Document, Stream};

/// Handles parsing of file specifications and extraction of embedded file data.
///
/// This module contains logic to:
/// - Resolve file specification objects
/// - Read the declared size and decode stream content
/// - Read metadata from file specifications
pub struct FileSpecParser<'a> {
    document: &'a Document,
}

impl<'a> FileSpecParser<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Create a malformed-entry error with consistent formatting.
    fn malformed(&self, name: &str, message: &str) -> AttachmentError {
        AttachmentError::MalformedEntry(name.into(), message.into())
    }

    /// Resolve a file-specification entry into an [`Attachment`].
    ///
    /// Layout of a file specification (PDF spec §7.11.3):
    ///
    /// ```text
    /// <<
    ///   /Type  /Filespec
    ///   /F     (ascii filename)
    ///   /UF    (unicode filename)          ← preferred
    ///   /Desc  (description)
    ///   /EF    <<
    ///              /F   <stream-ref>       ← the actual data stream
    ///              /UF  <stream-ref>       ← alternative key, same stream
    ///          >>
    /// >>
    /// ```
    ///
    /// With `with_data` the stream is decoded and `size` is the decoded
    /// length. Without it, `size` is `/Params/Size` when declared and the
    /// stream is only decoded when it is not.
    pub fn parse(&self, entry: &FileSpecEntry, with_data: bool) -> Result<Attachment> {
        let label = entry.label.as_str();
        let spec_dict = pdf_utils::resolve_dict(self.document, &entry.spec)
            .ok_or_else(|| self.malformed(label, "file spec is not a dictionary"))?;
        let ef_dict = pdf_utils::dict_entry(self.document, spec_dict, b"EF")
            .ok_or_else(|| self.malformed(label, "missing or invalid /EF entry"))?;
        let stream = self.embedded_stream(ef_dict, label)?;

        let (size, data) = if with_data {
            let data = self.decode(stream, label)?;
            (data.len(), Some(data))
        } else {
            let size = match self.declared_size(stream) {
                Some(size) => size,
                None => self.decode(stream, label)?.len(),
            };
            (size, None)
        };

        let mut metadata = self.read_metadata(spec_dict, stream);
        if metadata.description.is_none() {
            metadata.description = entry.annotation_text.clone();
        }

        Ok(Attachment {
            name: Self::best_filename(spec_dict, label),
            size,
            data,
            location: entry.location,
            metadata,
        })
    }

    /// Locate the embedded file stream in the /EF dictionary.
    fn embedded_stream<'d>(&'d self, ef_dict: &'d Dictionary, name: &str) -> Result<&'d Stream> {
        // /UF preferred over /F (unicode vs. ASCII path)
        let stream_ref = ef_dict
            .get(b"UF")
            .or_else(|_| ef_dict.get(b"F"))
            .map_err(|_| self.malformed(name, "/EF has neither /F nor /UF"))?;

        pdf_utils::resolve_stream(self.document, stream_ref)
            .ok_or_else(|| self.malformed(name, "embedded stream object is not a stream"))
    }

    /// The filename the entry resolves to, without touching its stream.
    pub fn name(&self, entry: &FileSpecEntry) -> Result<String> {
        let spec_dict = pdf_utils::resolve_dict(self.document, &entry.spec)
            .ok_or_else(|| self.malformed(&entry.label, "file spec is not a dictionary"))?;
        Ok(Self::best_filename(spec_dict, &entry.label))
    }

    /// Decoded stream content. Only an unfiltered stream is returned as is;
    /// a filter that fails, or that turns non-empty content into nothing,
    /// makes the entry malformed.
    fn decode(&self, stream: &Stream, name: &str) -> Result<Vec<u8>> {
        if stream.dict.get(b"Filter").is_err() {
            return Ok(stream.content.clone());
        }

        match stream.decompressed_content() {
            Ok(data) if data.is_empty() && !stream.content.is_empty() => {
                Err(self.malformed(name, "stream data does not decode"))
            }
            Ok(data) => Ok(data),
            Err(e) => Err(self.malformed(name, &format!("cannot decode stream: {e}"))),
        }
    }

    /// `/Params/Size` of the embedded stream, if declared and non-negative.
    fn declared_size(&self, stream: &Stream) -> Option<usize> {
        let params = pdf_utils::dict_entry(self.document, &stream.dict, b"Params")?;
        let size = params.get(b"Size").ok()?.as_i64().ok()?;
        usize::try_from(size).ok()
    }

    /// Return the best available filename: Unicode (/UF) > ASCII (/F) > fallback.
    fn best_filename(spec_dict: &Dictionary, fallback: &str) -> String {
        for key in [b"UF" as &[u8], b"F"] {
            if let Some(name) = pdf_utils::extract_string_from_dict(spec_dict, key) {
                return name;
            }
        }
        fallback.into()
    }

    /// Read optional metadata from the file specification dictionary and the
    /// embedded stream's dictionary and `/Params` sub-dictionary.
    fn read_metadata(&self, spec_dict: &Dictionary, stream: &Stream) -> AttachmentMetadata {
        let mut metadata = AttachmentMetadata {
            description: pdf_utils::extract_string_from_dict(spec_dict, b"Desc"),
            // /Subtype belongs on the stream; some producers put it on the spec.
            mime_type: pdf_utils::extract_name_from_dict(&stream.dict, b"Subtype")
                .or_else(|| pdf_utils::extract_name_from_dict(spec_dict, b"Subtype")),
            ..Default::default()
        };

        if let Some(params) = pdf_utils::dict_entry(self.document, &stream.dict, b"Params") {
            metadata.creation_date = pdf_utils::extract_string_from_dict(params, b"CreationDate");
            metadata.modification_date = pdf_utils::extract_string_from_dict(params, b"ModDate");
            metadata.checksum = params
                .get(b"CheckSum")
                .ok()
                .and_then(|v| v.as_str().ok())
                .map(pdf_utils::hex_encode);
        }

        metadata
    }
}
