//! IRI helpers shared by the snapshot builder and the loader queries.

/// `rdf:type`.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Namespace used for session/interaction vocabulary.
pub const SCHEMA_NS: &str = "http://schema.org/";

/// Binds an interaction to an entity it produced.
pub const SCHEMA_RESULT: &str = "http://schema.org/result";

/// Binds an interaction to the session it belongs to.
pub const SCHEMA_AGENT: &str = "http://schema.org/agent";

/// Start time of a session or interaction.
pub const SCHEMA_START_TIME: &str = "http://schema.org/startTime";

/// Short form of a predicate that marks a type assertion.
pub const TYPE_SHORT: &str = "type";

/// Extract the trailing path or fragment segment of a URI.
///
/// Returns the substring after the last `/` or `#`. When there is no
/// separator, or the separator is the last character, the input is returned
/// unchanged. This is a lossy display transform: distinct URIs that share a
/// trailing segment collapse to the same id.
///
/// # Example
///
/// ```
/// use aleph_core::uri::shorten_identifier;
///
/// assert_eq!(shorten_identifier("http://example.org/people#alice"), "alice");
/// assert_eq!(shorten_identifier("http://example.org/concept/RDF"), "RDF");
/// assert_eq!(shorten_identifier("urn:isbn:0451450523"), "urn:isbn:0451450523");
/// ```
pub fn shorten_identifier(uri: &str) -> &str {
    match uri.rfind(|c| c == '/' || c == '#') {
        Some(pos) if pos + 1 < uri.len() => &uri[pos + 1..],
        _ => uri,
    }
}

/// Whether a predicate is treated as a type assertion.
///
/// Matches on the short form, so `rdf:type` and any other `.../type`
/// predicate are handled alike.
pub fn is_type_predicate(predicate: &str) -> bool {
    shorten_identifier(predicate) == TYPE_SHORT
}
