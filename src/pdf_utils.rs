//! Shared PDF object-graph utilities used across multiple modules.
//!
//! Every structural access goes through one of the `resolve_*` helpers so
//! that indirect references are followed before a value is read.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Follow `value` through any chain of indirect references.
///
/// Returns `None` for dangling references or reference cycles.
pub fn resolve<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Object> {
    let mut current = value;
    let mut seen: HashSet<ObjectId> = HashSet::new();
    while let Ok(id) = current.as_reference() {
        if !seen.insert(id) {
            return None;
        }
        current = document.get_object(id).ok()?;
    }
    Some(current)
}

/// Resolve a value that might be inline or a reference to a dictionary.
pub fn resolve_dict<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Dictionary> {
    resolve(document, value)?.as_dict().ok()
}

/// Resolve a value that might be inline or a reference to an array.
pub fn resolve_array<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Vec<Object>> {
    resolve(document, value)?.as_array().ok()
}

/// Resolve a value that should be a reference to a stream.
pub fn resolve_stream<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Stream> {
    resolve(document, value)?.as_stream().ok()
}

/// Look up `key` in `dict` and resolve the result to a dictionary.
pub fn dict_entry<'a>(
    document: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    resolve_dict(document, dict.get(key).ok()?)
}

/// Decode a PDF text string.
///
/// Strings starting with a UTF-16BE byte-order mark are decoded as UTF-16;
/// anything else is treated as UTF-8 (which covers the ASCII subset of
/// PDFDocEncoding).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&UTF16BE_BOM) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    let bytes = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Encode `text` as a PDF text string: plain bytes for ASCII, UTF-16BE with
/// a byte-order mark otherwise.
pub fn encode_text_string(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        return text.as_bytes().to_vec();
    }
    let mut out = UTF16BE_BOM.to_vec();
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

/// Extract a text string from a PDF dictionary for a given key.
///
/// Returns `Some(String)` if the key exists and contains a non-empty string,
/// `None` otherwise.
pub fn extract_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_str().ok())
        .map(decode_text_string)
        .filter(|s| !s.is_empty())
}

/// Extract a name value (e.g. `/text#2Fcsv`) from a PDF dictionary.
pub fn extract_name_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).into_owned())
        .filter(|s| !s.is_empty())
}

/// Flatten a name tree rooted at `root` into its `(key, value)` pairs, in
/// document order.
///
/// Leaf nodes contribute their `/Names` array (`[key value key value …]`);
/// intermediate nodes are descended through `/Kids`. Values are returned as
/// stored (usually indirect references). Keys that are not strings are
/// skipped, and each node is visited at most once.
pub fn name_tree_entries(document: &Document, root: &Object) -> Vec<(Vec<u8>, Object)> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    collect_name_tree(document, root, &mut visited, &mut out);
    out
}

fn collect_name_tree(
    document: &Document,
    node: &Object,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<(Vec<u8>, Object)>,
) {
    if let Ok(id) = node.as_reference() {
        if !visited.insert(id) {
            return;
        }
    }
    let Some(node_dict) = resolve_dict(document, node) else {
        return;
    };

    // Leaf node: has a /Names array of [key, value, key, value, …]
    if let Some(names) = node_dict
        .get(b"Names")
        .ok()
        .and_then(|v| resolve_array(document, v))
    {
        for pair in names.chunks_exact(2) {
            if let Ok(key) = pair[0].as_str() {
                out.push((key.to_vec(), pair[1].clone()));
            }
        }
    }

    // Intermediate node: has a /Kids array of references
    if let Some(kids) = node_dict
        .get(b"Kids")
        .ok()
        .and_then(|v| resolve_array(document, v))
    {
        for kid in kids {
            collect_name_tree(document, kid, visited, out);
        }
    }
}

/// Encode raw bytes as a lowercase hex string (used for the MD5 checksum).
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
