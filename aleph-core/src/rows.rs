//! Boundary between SPARQL JSON results and the builder's typed input.
//!
//! Rows are validated eagerly. A row missing a binding, carrying an unknown
//! term type, or holding an unparseable start time is skipped and recorded
//! in [`RowDiagnostics`]; decoding never fails as a whole.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::error::RowError;
use crate::types::{Object, Triple};

/// SPARQL 1.1 Query Results JSON document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub results: Bindings,
}

impl SparqlResults {
    /// Build a result set from rows, mainly for tests and fakes.
    pub fn from_rows(vars: &[&str], rows: Vec<Row>) -> Self {
        Self {
            head: Head {
                vars: vars.iter().map(|v| v.to_string()).collect(),
            },
            results: Bindings { bindings: rows },
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.results.bindings
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.results.bindings
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Bindings {
    #[serde(default)]
    pub bindings: Vec<Row>,
}

/// One solution: variable name to bound term.
pub type Row = HashMap<String, Term>;

/// An RDF term in SPARQL JSON form.
///
/// Every field is optional here so that a malformed term reaches row
/// validation instead of failing the whole document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Term {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: Some("uri".to_string()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: Some("literal".to_string()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// `xsd:dateTime` typed literal.
    pub fn date_time(value: impl Into<String>) -> Self {
        Self {
            datatype: Some("http://www.w3.org/2001/XMLSchema#dateTime".to_string()),
            ..Self::literal(value)
        }
    }
}

/// Count and reasons of rows skipped while decoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostics {
    pub skipped: usize,
    pub reasons: Vec<String>,
}

impl RowDiagnostics {
    pub fn record(&mut self, source: &str, err: RowError) {
        warn!("Skipping malformed {} row: {}", source, err);
        self.skipped += 1;
        self.reasons.push(format!("{}: {}", source, err));
    }

    pub fn merge(&mut self, other: RowDiagnostics) {
        self.skipped += other.skipped;
        self.reasons.extend(other.reasons);
    }

    pub fn is_clean(&self) -> bool {
        self.skipped == 0
    }
}

/// Items that passed validation plus what was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    pub diagnostics: RowDiagnostics,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: RowDiagnostics::default(),
        }
    }
}

/// A validated row of the session/interaction query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRow {
    pub session: String,
    pub session_start: DateTime<Utc>,
    pub interaction: Option<InteractionRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionRow {
    pub uri: String,
    pub start: DateTime<Utc>,
}

/// A validated row binding a produced entity to its interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub interaction: String,
    /// Session the interaction belongs to, when the query bound it.
    pub session: Option<String>,
    pub result: String,
}

impl ResultRow {
    pub fn new(interaction: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            interaction: interaction.into(),
            session: None,
            result: result.into(),
        }
    }
}

fn required<'a>(row: &'a Row, index: usize, field: &str) -> Result<&'a str, RowError> {
    row.get(field)
        .and_then(|term| term.value.as_deref())
        .ok_or_else(|| RowError::MissingField {
            row: index,
            field: field.to_string(),
        })
}

fn optional<'a>(row: &'a Row, field: &str) -> Option<&'a str> {
    row.get(field).and_then(|term| term.value.as_deref())
}

/// `xsd:dateTime` without a zone offset; read as UTC.
const LOCAL_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn timestamp(row: &Row, index: usize, field: &str) -> Result<DateTime<Utc>, RowError> {
    let raw = required(row, index, field)?;
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, LOCAL_DATE_TIME).map(|t| t.and_utc()))
        .map_err(|_| RowError::InvalidTimestamp {
            row: index,
            field: field.to_string(),
            value: raw.to_string(),
        })
}

fn decode_all<T>(
    rows: &[Row],
    source: &str,
    decode: impl Fn(usize, &Row) -> Result<T, RowError>,
) -> Decoded<T> {
    let mut decoded = Decoded {
        items: Vec::with_capacity(rows.len()),
        diagnostics: RowDiagnostics::default(),
    };
    for (index, row) in rows.iter().enumerate() {
        match decode(index, row) {
            Ok(item) => decoded.items.push(item),
            Err(err) => decoded.diagnostics.record(source, err),
        }
    }
    decoded
}

fn decode_triple(index: usize, row: &Row) -> Result<Triple, RowError> {
    let subject = required(row, index, "s")?;
    let predicate = required(row, index, "p")?;
    let object = row
        .get("o")
        .ok_or_else(|| RowError::MissingField {
            row: index,
            field: "o".to_string(),
        })
        .and_then(|term| decode_object(index, "o", term))?;

    Ok(Triple::new(subject, predicate, object))
}

/// Map a bound term to an [`Object`].
///
/// `uri` becomes [`Object::Uri`]; `literal` and `typed-literal` become
/// [`Object::Literal`]. Blank nodes, unknown tags and a missing tag are
/// rejected.
pub fn decode_object(index: usize, field: &str, term: &Term) -> Result<Object, RowError> {
    let value = term.value.as_deref().ok_or_else(|| RowError::MissingField {
        row: index,
        field: field.to_string(),
    })?;
    let kind = term.kind.as_deref().ok_or_else(|| RowError::MissingField {
        row: index,
        field: format!("{}.type", field),
    })?;

    match kind {
        "uri" => Ok(Object::Uri(value.to_string())),
        "literal" | "typed-literal" => Ok(Object::Literal(value.to_string())),
        other => Err(RowError::UnsupportedTermType {
            row: index,
            field: field.to_string(),
            kind: other.to_string(),
        }),
    }
}

/// Decode `?s ?p ?o` rows.
pub fn decode_triples(rows: &[Row]) -> Decoded<Triple> {
    decode_all(rows, "triple", decode_triple)
}

fn decode_session_row(index: usize, row: &Row) -> Result<SessionRow, RowError> {
    let session = required(row, index, "session")?;
    let session_start = timestamp(row, index, "sessionStart")?;

    let interaction = match optional(row, "interaction") {
        Some(uri) => Some(InteractionRow {
            uri: uri.to_string(),
            start: timestamp(row, index, "interactionStart")?,
        }),
        None => None,
    };

    Ok(SessionRow {
        session: session.to_string(),
        session_start,
        interaction,
    })
}

/// Decode `?session ?sessionStart ?interaction ?interactionStart` rows.
///
/// The interaction columns are optional (the query binds them in an
/// `OPTIONAL` block); when `interaction` is bound its start time is required.
pub fn decode_session_rows(rows: &[Row]) -> Decoded<SessionRow> {
    decode_all(rows, "session", decode_session_row)
}

fn decode_result_row(index: usize, row: &Row) -> Result<ResultRow, RowError> {
    Ok(ResultRow {
        interaction: required(row, index, "interaction")?.to_string(),
        session: optional(row, "session").map(str::to_string),
        result: required(row, index, "result")?.to_string(),
    })
}

/// Decode `?interaction ?session ?result` rows.
pub fn decode_result_rows(rows: &[Row]) -> Decoded<ResultRow> {
    decode_all(rows, "result", decode_result_row)
}
