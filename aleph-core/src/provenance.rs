//! Resolve which interaction owns each triple, and which session owns each
//! node for clustering.
//!
//! Ownership is keyed on the triple's subject:
//!
//! 1. an interaction URI is owned at its own start time;
//! 2. a session URI is owned at its earliest interaction's start time;
//! 3. anything else is owned at the earliest start time among the
//!    interactions that produced it as a `result`.
//!
//! Subjects matching none of these are unresolved. The builder excludes
//! their triples from partitioned timelines.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::rows::ResultRow;
use crate::types::{Session, ShortId, Triple};
use crate::uri::shorten_identifier;

/// Ownership index over one batch of sessions and result rows.
#[derive(Clone, Debug, Default)]
pub struct Provenance {
    owners: HashMap<String, DateTime<Utc>>,
    node_sessions: BTreeMap<ShortId, usize>,
}

impl Provenance {
    pub fn resolve(sessions: &[Session], results: &[ResultRow]) -> Self {
        // interaction uri -> (start, session index)
        let mut interactions: HashMap<&str, (DateTime<Utc>, usize)> = HashMap::new();
        let mut session_index: HashMap<&str, usize> = HashMap::new();

        for (idx, session) in sessions.iter().enumerate() {
            session_index.insert(session.uri.as_str(), idx);
            for interaction in &session.interactions {
                interactions.insert(interaction.uri.as_str(), (interaction.start_time, idx));
            }
        }

        // result uri -> earliest producing (start, session index)
        let mut produced: HashMap<&str, (DateTime<Utc>, usize)> = HashMap::new();
        // result short id -> session index when only the session is known
        let mut session_only: HashMap<ShortId, usize> = HashMap::new();

        for row in results {
            match interactions.get(row.interaction.as_str()) {
                Some(&claim) => {
                    produced
                        .entry(row.result.as_str())
                        .and_modify(|current| {
                            if claim < *current {
                                *current = claim;
                            }
                        })
                        .or_insert(claim);
                }
                None => {
                    let fallback = row
                        .session
                        .as_deref()
                        .and_then(|s| session_index.get(s).copied());
                    match fallback {
                        Some(idx) => {
                            session_only.insert(shorten_identifier(&row.result).to_string(), idx);
                        }
                        None => debug!(
                            "Result {} references unknown interaction {}",
                            row.result, row.interaction
                        ),
                    }
                }
            }
        }

        let mut owners: HashMap<String, DateTime<Utc>> = produced
            .iter()
            .map(|(uri, (time, _))| (uri.to_string(), *time))
            .collect();

        let mut node_sessions: BTreeMap<ShortId, usize> = BTreeMap::new();

        // Session and interaction entities cluster with their own session.
        for (idx, session) in sessions.iter().enumerate() {
            if let Some(first) = session.first_interaction() {
                owners.insert(session.uri.clone(), first.start_time);
            }
            node_sessions.insert(shorten_identifier(&session.uri).to_string(), idx);
            for interaction in &session.interactions {
                owners.insert(interaction.uri.clone(), interaction.start_time);
                node_sessions.insert(shorten_identifier(&interaction.uri).to_string(), idx);
            }
        }

        node_sessions.extend(session_only);

        // Short-id collisions between results resolve to the earliest claim.
        let mut result_claims: BTreeMap<&str, (DateTime<Utc>, usize)> = BTreeMap::new();
        for (uri, claim) in &produced {
            result_claims
                .entry(shorten_identifier(uri))
                .and_modify(|current| {
                    if *claim < *current {
                        *current = *claim;
                    }
                })
                .or_insert(*claim);
        }
        for (short, (_, idx)) in result_claims {
            node_sessions.insert(short.to_string(), idx);
        }

        debug!(
            "Resolved ownership for {} subjects, {} clustered nodes",
            owners.len(),
            node_sessions.len()
        );

        Self {
            owners,
            node_sessions,
        }
    }

    /// Owning interaction timestamp for a triple, if resolvable.
    pub fn owner_time(&self, triple: &Triple) -> Option<DateTime<Utc>> {
        self.owners.get(&triple.subject).copied()
    }

    /// Node short id to owning session index.
    pub fn node_session_index(&self) -> &BTreeMap<ShortId, usize> {
        &self.node_sessions
    }

    pub fn into_node_session_index(self) -> BTreeMap<ShortId, usize> {
        self.node_sessions
    }

    /// Number of subjects with a resolved owner.
    pub fn resolved_subjects(&self) -> usize {
        self.owners.len()
    }
}
