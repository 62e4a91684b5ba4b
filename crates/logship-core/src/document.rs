//! DocumentBuilder — maps a [`ParsedRecord`] onto the wire [`Document`].
//!
//! Today this is a field-for-field copy. Enrichment (geo lookup, user agent
//! parsing) belongs here so neither the parser nor the sink has to change.

use uuid::Uuid;

use crate::types::{Document, ParsedRecord};

/// Build the index-ready document for a record. Pure and infallible.
pub fn build(record: ParsedRecord) -> Document {
    let ParsedRecord {
        client_ip,
        raw_timestamp,
        method,
        url,
        status,
        size,
        original_log,
    } = record;

    Document {
        client_ip,
        raw_timestamp,
        method,
        url,
        status,
        size,
        original_log,
    }
}

/// Deterministic id for a document: a UUIDv5 over the source path, the line
/// number and the original line. Indexing the same line of the same file
/// twice under this id overwrites instead of duplicating.
pub fn document_id(path: &str, ordinal: u64, document: &Document) -> String {
    let mut name = Vec::with_capacity(path.len() + document.original_log.len() + 24);
    name.extend_from_slice(path.as_bytes());
    name.push(0);
    name.extend_from_slice(ordinal.to_string().as_bytes());
    name.push(0);
    name.extend_from_slice(document.original_log.as_bytes());
    Uuid::new_v5(&Uuid::NAMESPACE_URL, &name).to_string()
}
