//! Partition a triple batch into the ordered sequence of graph states.
//!
//! [`GraphStateBuilder`] is the entry point: it takes a [`Dataset`] fetched
//! from the store and returns a [`BuildOutcome`]. The builder holds no state
//! between runs; every reload rebuilds the timeline from scratch.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::provenance::Provenance;
use crate::rows::{Decoded, ResultRow, RowDiagnostics, SessionRow};
use crate::sessions::{assemble_sessions, interaction_count};
use crate::snapshot::build_snapshot;
use crate::types::{BuilderConfig, Session, ShortId, Snapshot, SnapshotMeta, Triple};

/// Interaction URI carried by the single state of an aggregate timeline.
pub const AGGREGATE_INTERACTION_URI: &str = "aggregate";

/// Everything one load fetched from the store, already validated.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub triples: Vec<Triple>,
    pub sessions: Vec<Session>,
    pub results: Vec<ResultRow>,
    /// Rows skipped while decoding any of the three result sets.
    pub diagnostics: RowDiagnostics,
}

impl Dataset {
    pub fn new(triples: Vec<Triple>, sessions: Vec<Session>, results: Vec<ResultRow>) -> Self {
        Self {
            triples,
            sessions,
            results,
            diagnostics: RowDiagnostics::default(),
        }
    }

    /// Assemble sessions from decoded rows and merge all diagnostics.
    pub fn from_decoded(
        triples: Decoded<Triple>,
        session_rows: Decoded<SessionRow>,
        results: Decoded<ResultRow>,
    ) -> Self {
        let mut diagnostics = triples.diagnostics;
        diagnostics.merge(session_rows.diagnostics);
        diagnostics.merge(results.diagnostics);

        Self {
            triples: triples.items,
            sessions: assemble_sessions(&session_rows.items),
            results: results.items,
            diagnostics,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineMode {
    /// One state per interaction.
    Partitioned,
    /// One all-inclusive state, provenance ignored.
    Aggregate,
}

impl From<&BuilderConfig> for TimelineMode {
    fn from(config: &BuilderConfig) -> Self {
        if config.aggregate {
            TimelineMode::Aggregate
        } else {
            TimelineMode::Partitioned
        }
    }
}

impl fmt::Display for TimelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineMode::Partitioned => f.write_str("partitioned"),
            TimelineMode::Aggregate => f.write_str("aggregate"),
        }
    }
}

/// Ordered graph states plus what a renderer needs alongside them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub states: Vec<Snapshot>,
    pub sessions: Vec<Session>,
    /// Node short id to owning session index. Entries may be missing.
    pub node_session_index: BTreeMap<ShortId, usize>,
    pub diagnostics: RowDiagnostics,
    pub mode: TimelineMode,
    /// Triples excluded from every state because no interaction owns them.
    pub unresolved_triples: usize,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<&Snapshot> {
        self.states.get(index)
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.states.last()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn interaction_count(&self) -> usize {
        interaction_count(&self.sessions)
    }
}

/// Why a load produced no states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoTriples,
    NoInteractions,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoTriples => f.write_str("the store returned no triples"),
            EmptyReason::NoInteractions => {
                f.write_str("the store returned no sessions or interactions")
            }
        }
    }
}

/// Result of a build. `Empty` is a normal outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    Ready(Timeline),
    Empty {
        reason: EmptyReason,
        diagnostics: RowDiagnostics,
    },
}

impl BuildOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, BuildOutcome::Empty { .. })
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        match self {
            BuildOutcome::Ready(timeline) => Some(timeline),
            BuildOutcome::Empty { .. } => None,
        }
    }

    pub fn into_timeline(self) -> Option<Timeline> {
        match self {
            BuildOutcome::Ready(timeline) => Some(timeline),
            BuildOutcome::Empty { .. } => None,
        }
    }

    pub fn diagnostics(&self) -> &RowDiagnostics {
        match self {
            BuildOutcome::Ready(timeline) => &timeline.diagnostics,
            BuildOutcome::Empty { diagnostics, .. } => diagnostics,
        }
    }
}

/// Split triples into one accumulated state per interaction.
///
/// Sessions and their interactions are walked in start order. Each state
/// holds every triple whose owner time is at or before the effective cutoff,
/// which is the running maximum of the interaction start times seen so far.
/// With overlapping sessions this keeps states monotone; the state's
/// `timestamp` is still the interaction's own start time.
///
/// In aggregate mode the result is a single state over all triples.
pub fn partition_by_time(
    triples: &[Triple],
    sessions: &[Session],
    provenance: &Provenance,
    config: &BuilderConfig,
) -> Vec<Snapshot> {
    if config.aggregate {
        let graph = build_snapshot(triples, config);
        let meta = SnapshotMeta {
            session_index: 0,
            interaction_index: 0,
            session_uri: AGGREGATE_INTERACTION_URI.to_string(),
            interaction_uri: AGGREGATE_INTERACTION_URI.to_string(),
            timestamp: Utc::now(),
            triple_count: triples.len(),
        };
        debug!(
            "Aggregate state: {} triples, {} nodes, {} links",
            triples.len(),
            graph.nodes.len(),
            graph.links.len()
        );
        return vec![Snapshot::from_graph(graph, meta)];
    }

    let owner_times: Vec<Option<DateTime<Utc>>> =
        triples.iter().map(|t| provenance.owner_time(t)).collect();

    let mut states = Vec::with_capacity(interaction_count(sessions));
    let mut cutoff: Option<DateTime<Utc>> = None;

    for (session_index, session) in sessions.iter().enumerate() {
        for (interaction_index, interaction) in session.interactions.iter().enumerate() {
            let effective = match cutoff {
                Some(current) if current > interaction.start_time => current,
                _ => interaction.start_time,
            };
            cutoff = Some(effective);

            let visible: Vec<&Triple> = triples
                .iter()
                .zip(&owner_times)
                .filter(|(_, owner)| matches!(owner, Some(time) if *time <= effective))
                .map(|(triple, _)| triple)
                .collect();

            let graph = build_snapshot(&visible, config);
            debug!(
                "State {}: session {} interaction {} ({} triples, {} nodes, {} links)",
                states.len(),
                session_index,
                interaction_index,
                visible.len(),
                graph.nodes.len(),
                graph.links.len()
            );

            let meta = SnapshotMeta {
                session_index,
                interaction_index,
                session_uri: session.uri.clone(),
                interaction_uri: interaction.uri.clone(),
                timestamp: interaction.start_time,
                triple_count: visible.len(),
            };
            states.push(Snapshot::from_graph(graph, meta));
        }
    }

    states
}

/// Builds timelines with a fixed configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphStateBuilder {
    config: BuilderConfig,
}

impl GraphStateBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn build(&self, dataset: &Dataset) -> BuildOutcome {
        if dataset.triples.is_empty() {
            info!("No triples returned; timeline is empty");
            return BuildOutcome::Empty {
                reason: EmptyReason::NoTriples,
                diagnostics: dataset.diagnostics.clone(),
            };
        }

        if !self.config.aggregate && interaction_count(&dataset.sessions) == 0 {
            info!(
                "No sessions or interactions for {} triples; timeline is empty",
                dataset.triples.len()
            );
            return BuildOutcome::Empty {
                reason: EmptyReason::NoInteractions,
                diagnostics: dataset.diagnostics.clone(),
            };
        }

        let provenance = Provenance::resolve(&dataset.sessions, &dataset.results);
        let states = partition_by_time(
            &dataset.triples,
            &dataset.sessions,
            &provenance,
            &self.config,
        );

        let unresolved_triples = dataset
            .triples
            .iter()
            .filter(|t| provenance.owner_time(t).is_none())
            .count();
        if unresolved_triples > 0 && !self.config.aggregate {
            info!(
                "Excluded {} triples with no owning interaction",
                unresolved_triples
            );
        }

        info!(
            "Built {} graph states from {} triples across {} sessions ({} mode, types as {})",
            states.len(),
            dataset.triples.len(),
            dataset.sessions.len(),
            if self.config.aggregate { "aggregate" } else { "partitioned" },
            self.config.type_display
        );

        BuildOutcome::Ready(Timeline {
            states,
            sessions: dataset.sessions.clone(),
            node_session_index: provenance.into_node_session_index(),
            diagnostics: dataset.diagnostics.clone(),
            mode: TimelineMode::from(&self.config),
            unresolved_triples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Interaction, TypeDisplayMode};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn session(uri: &str, interactions: &[(&str, &str)]) -> Session {
        let interactions: Vec<Interaction> = interactions
            .iter()
            .map(|(i, t)| Interaction {
                uri: i.to_string(),
                start_time: ts(t),
                session_uri: uri.to_string(),
            })
            .collect();
        Session {
            uri: uri.to_string(),
            start_time: interactions[0].start_time,
            interactions,
        }
    }

    #[test]
    fn test_overlapping_sessions_stay_monotone() {
        // s2 starts before s1's second interaction.
        let sessions = vec![
            session(
                "http://x/session/s1",
                &[
                    ("http://x/interaction/a", "2026-01-10T12:00:00Z"),
                    ("http://x/interaction/b", "2026-01-10T12:30:00Z"),
                ],
            ),
            session(
                "http://x/session/s2",
                &[("http://x/interaction/c", "2026-01-10T12:10:00Z")],
            ),
        ];
        let results = vec![
            ResultRow::new("http://x/interaction/a", "http://x/concept/A"),
            ResultRow::new("http://x/interaction/b", "http://x/concept/B"),
            ResultRow::new("http://x/interaction/c", "http://x/concept/C"),
        ];
        let triples = vec![
            Triple::uri("http://x/concept/A", "http://x/rel", "http://x/concept/B"),
            Triple::uri("http://x/concept/B", "http://x/rel", "http://x/concept/C"),
            Triple::uri("http://x/concept/C", "http://x/rel", "http://x/concept/A"),
        ];

        let provenance = Provenance::resolve(&sessions, &results);
        let states = partition_by_time(&triples, &sessions, &provenance, &BuilderConfig::default());

        let counts: Vec<_> = states.iter().map(|s| s.triple_count).collect();
        assert_eq!(counts, vec![1, 3, 3]);
        // The third state keeps its own timestamp.
        assert_eq!(states[2].timestamp, ts("2026-01-10T12:10:00Z"));
        assert_eq!(states[2].session_index, 1);
        assert_eq!(states[2].interaction_index, 0);
    }

    #[test]
    fn test_aggregate_single_state() {
        let triples = vec![
            Triple::uri("http://x/a", "http://x/rel", "http://x/b"),
            Triple::literal("http://x/a", "http://x/name", "A"),
        ];
        let config = BuilderConfig::new(TypeDisplayMode::Tags, true);
        let states = partition_by_time(&triples, &[], &Provenance::default(), &config);

        assert_eq!(states.len(), 1);
        assert_eq!(states[0].interaction_uri, AGGREGATE_INTERACTION_URI);
        assert_eq!(states[0].triple_count, 2);
        assert_eq!(states[0].node_count(), 2);
    }

    #[test]
    fn test_empty_when_no_triples() {
        let outcome = GraphStateBuilder::default().build(&Dataset::default());
        assert_eq!(
            outcome,
            BuildOutcome::Empty {
                reason: EmptyReason::NoTriples,
                diagnostics: RowDiagnostics::default(),
            }
        );
        assert!(outcome.timeline().is_none());
    }

    #[test]
    fn test_aggregate_ignores_missing_sessions() {
        let dataset = Dataset::new(
            vec![Triple::uri("http://x/a", "http://x/rel", "http://x/b")],
            Vec::new(),
            Vec::new(),
        );
        let builder = GraphStateBuilder::new(BuilderConfig::new(TypeDisplayMode::Tags, true));
        let timeline = builder.build(&dataset).into_timeline().unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.mode, TimelineMode::Aggregate);
        assert_eq!(timeline.unresolved_triples, 1);
    }

    #[test]
    fn test_unresolved_triples_counted() {
        let sessions = vec![session(
            "http://x/session/s1",
            &[("http://x/interaction/a", "2026-01-10T12:00:00Z")],
        )];
        let dataset = Dataset::new(
            vec![
                Triple::uri("http://x/concept/A", "http://x/rel", "http://x/concept/B"),
                Triple::uri("http://x/concept/Orphan", "http://x/rel", "http://x/concept/B"),
            ],
            sessions,
            vec![ResultRow::new("http://x/interaction/a", "http://x/concept/A")],
        );
        let timeline = GraphStateBuilder::default()
            .build(&dataset)
            .into_timeline()
            .unwrap();

        assert_eq!(timeline.unresolved_triples, 1);
        assert_eq!(timeline.states[0].triple_count, 1);
        assert!(timeline.states[0].node("Orphan").is_none());
    }

    #[test]
    fn test_empty_reason_display() {
        assert!(EmptyReason::NoInteractions.to_string().contains("sessions"));
    }
}
