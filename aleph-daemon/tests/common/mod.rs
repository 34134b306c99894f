//! In-memory query engine shared by the daemon integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aleph_core::rows::Row;
use aleph_core::uri::RDF_TYPE;
use aleph_core::{SparqlResults, Term};
use aleph_daemon::sparql::queries::{
    DELETE_ALL_UPDATE, INTERACTION_RESULTS_QUERY, SAMPLE_DATA_UPDATE, SESSIONS_QUERY,
    TRIPLES_QUERY,
};
use aleph_daemon::{QueryEngine, SparqlError};
use async_trait::async_trait;
use tokio::sync::Notify;

pub const SESSION: &str = "http://aleph-wiki.local/session/";
pub const INTERACTION: &str = "http://aleph-wiki.local/interaction/";
pub const CONCEPT: &str = "http://aleph-wiki.local/concept/";

/// Rows returned for each of the three load queries.
#[derive(Clone, Default)]
pub struct StoreData {
    pub sessions: Vec<Row>,
    pub results: Vec<Row>,
    pub triples: Vec<Row>,
}

fn row(pairs: &[(&str, Term)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn session_row(session: &str, start: &str, interaction: &str, interaction_start: &str) -> Row {
    row(&[
        ("session", Term::uri(format!("{}{}", SESSION, session))),
        ("sessionStart", Term::date_time(start)),
        ("interaction", Term::uri(format!("{}{}", INTERACTION, interaction))),
        ("interactionStart", Term::date_time(interaction_start)),
    ])
}

fn result_row(interaction: &str, concept: &str) -> Row {
    row(&[
        ("interaction", Term::uri(format!("{}{}", INTERACTION, interaction))),
        ("result", Term::uri(format!("{}{}", CONCEPT, concept))),
    ])
}

fn type_triple(concept: &str, class: &str) -> Row {
    row(&[
        ("s", Term::uri(format!("{}{}", CONCEPT, concept))),
        ("p", Term::uri(RDF_TYPE)),
        ("o", Term::uri(format!("{}{}", CONCEPT, class))),
    ])
}

fn related_triple(from: &str, to: &str) -> Row {
    row(&[
        ("s", Term::uri(format!("{}{}", CONCEPT, from))),
        ("p", Term::uri("http://schema.org/relatedTo")),
        ("o", Term::uri(format!("{}{}", CONCEPT, to))),
    ])
}

fn label_triple(concept: &str, label: &str) -> Row {
    row(&[
        ("s", Term::uri(format!("{}{}", CONCEPT, concept))),
        ("p", Term::uri("http://www.w3.org/2000/01/rdf-schema#label")),
        ("o", Term::literal(label)),
    ])
}

/// The demo store: two sessions, four interactions.
pub fn demo_data() -> StoreData {
    StoreData {
        sessions: vec![
            session_row("demo-session-1", "2026-01-10T12:00:00Z", "demo-1-1", "2026-01-10T12:00:00Z"),
            session_row("demo-session-1", "2026-01-10T12:00:00Z", "demo-1-2", "2026-01-10T12:01:00Z"),
            session_row("demo-session-2", "2026-01-10T13:00:00Z", "demo-2-1", "2026-01-10T13:00:00Z"),
            session_row("demo-session-2", "2026-01-10T13:00:00Z", "demo-2-2", "2026-01-10T13:05:00Z"),
        ],
        results: vec![
            result_row("demo-1-1", "GraphDB"),
            result_row("demo-1-2", "SPARQL"),
            result_row("demo-2-1", "Python"),
            result_row("demo-2-2", "React"),
        ],
        triples: vec![
            type_triple("GraphDB", "Technology"),
            label_triple("GraphDB", "Graph Database"),
            type_triple("SPARQL", "Language"),
            related_triple("SPARQL", "GraphDB"),
            type_triple("Python", "Language"),
            type_triple("React", "Framework"),
        ],
    }
}

/// Only the first session of the demo store.
pub fn first_session_data() -> StoreData {
    let demo = demo_data();
    StoreData {
        sessions: demo.sessions[..2].to_vec(),
        results: demo.results[..2].to_vec(),
        triples: demo.triples[..4].to_vec(),
    }
}

/// Query engine answering the loader's queries from memory.
#[derive(Default)]
pub struct FakeStore {
    data: Mutex<StoreData>,
    fail: AtomicBool,
    /// When set, the next triples query waits on `release`.
    gate_next: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
    pub updates: Mutex<Vec<String>>,
    pub selects: AtomicUsize,
}

impl FakeStore {
    pub fn new(data: StoreData) -> Arc<Self> {
        Arc::new(Self {
            data: Mutex::new(data),
            ..Default::default()
        })
    }

    pub fn set_data(&self, data: StoreData) {
        *self.data.lock().unwrap() = data;
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn gate_next_load(&self) {
        self.gate_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl QueryEngine for FakeStore {
    async fn select(&self, query: &str) -> Result<SparqlResults, SparqlError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SparqlError::Status {
                endpoint: self.endpoint().to_string(),
                status: 503,
                body: "store offline".to_string(),
            });
        }

        let data = self.data.lock().unwrap().clone();
        let (vars, rows): (Vec<&str>, Vec<Row>) = if query == SESSIONS_QUERY {
            (
                vec!["session", "sessionStart", "interaction", "interactionStart"],
                data.sessions,
            )
        } else if query == INTERACTION_RESULTS_QUERY {
            (vec!["interaction", "session", "result"], data.results)
        } else if query == TRIPLES_QUERY {
            if self.gate_next.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            (vec!["s", "p", "o"], data.triples)
        } else {
            (vec!["p", "o"], Vec::new())
        };

        Ok(SparqlResults::from_rows(&vars, rows))
    }

    async fn update(&self, update: &str) -> Result<(), SparqlError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SparqlError::Timeout {
                endpoint: self.endpoint().to_string(),
            });
        }
        if update == DELETE_ALL_UPDATE {
            self.set_data(StoreData::default());
        } else if update == SAMPLE_DATA_UPDATE {
            self.set_data(demo_data());
        }
        self.updates.lock().unwrap().push(update.to_string());
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "memory://fake/query"
    }
}
