//! Assemble ordered sessions from session/interaction rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::rows::SessionRow;
use crate::types::{Interaction, Session};

/// Group rows into sessions.
///
/// - Duplicate session URIs collapse into one record; the last row's start
///   time wins and interactions are unioned.
/// - Interactions are de-duplicated by URI across all sessions. The last
///   row wins for both the start time and the owning session, so every
///   interaction belongs to exactly one session.
/// - Sessions and interactions are ordered by `(start_time, uri)`.
pub fn assemble_sessions(rows: &[SessionRow]) -> Vec<Session> {
    let mut session_starts: BTreeMap<&str, DateTime<Utc>> = BTreeMap::new();
    let mut owners: BTreeMap<&str, (DateTime<Utc>, &str)> = BTreeMap::new();

    for row in rows {
        session_starts.insert(row.session.as_str(), row.session_start);
        if let Some(interaction) = &row.interaction {
            owners.insert(
                interaction.uri.as_str(),
                (interaction.start, row.session.as_str()),
            );
        }
    }

    let mut grouped: BTreeMap<&str, Vec<Interaction>> = BTreeMap::new();
    for (interaction_uri, (start, session_uri)) in owners {
        grouped.entry(session_uri).or_default().push(Interaction {
            uri: interaction_uri.to_string(),
            start_time: start,
            session_uri: session_uri.to_string(),
        });
    }

    let mut sessions: Vec<Session> = session_starts
        .into_iter()
        .map(|(uri, start_time)| {
            let mut interactions = grouped.remove(uri).unwrap_or_default();
            interactions.sort_by(|a, b| (a.start_time, &a.uri).cmp(&(b.start_time, &b.uri)));

            Session {
                uri: uri.to_string(),
                start_time,
                interactions,
            }
        })
        .collect();

    sessions.sort_by(|a, b| (a.start_time, &a.uri).cmp(&(b.start_time, &b.uri)));

    debug!(
        "Assembled {} sessions with {} interactions from {} rows",
        sessions.len(),
        interaction_count(&sessions),
        rows.len()
    );

    sessions
}

/// Total interactions across all sessions.
pub fn interaction_count(sessions: &[Session]) -> usize {
    sessions.iter().map(|s| s.interactions.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::InteractionRow;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn session_row(session: &str, start: &str, interaction: Option<(&str, &str)>) -> SessionRow {
        SessionRow {
            session: session.to_string(),
            session_start: ts(start),
            interaction: interaction.map(|(uri, start)| InteractionRow {
                uri: uri.to_string(),
                start: ts(start),
            }),
        }
    }

    #[test]
    fn test_sessions_sorted_by_start() {
        let rows = vec![
            session_row("s:late", "2026-01-10T13:00:00Z", Some(("i:3", "2026-01-10T13:00:00Z"))),
            session_row("s:early", "2026-01-10T12:00:00Z", Some(("i:1", "2026-01-10T12:00:00Z"))),
        ];
        let sessions = assemble_sessions(&rows);
        assert_eq!(sessions[0].uri, "s:early");
        assert_eq!(sessions[1].uri, "s:late");
    }

    #[test]
    fn test_ties_broken_by_uri() {
        let rows = vec![
            session_row("s:b", "2026-01-10T12:00:00Z", None),
            session_row("s:a", "2026-01-10T12:00:00Z", None),
        ];
        let sessions = assemble_sessions(&rows);
        assert_eq!(sessions[0].uri, "s:a");
        assert_eq!(sessions[1].uri, "s:b");
    }

    #[test]
    fn test_interactions_sorted_and_owned() {
        let rows = vec![
            session_row("s:1", "2026-01-10T12:00:00Z", Some(("i:2", "2026-01-10T12:05:00Z"))),
            session_row("s:1", "2026-01-10T12:00:00Z", Some(("i:1", "2026-01-10T12:01:00Z"))),
        ];
        let sessions = assemble_sessions(&rows);
        assert_eq!(sessions.len(), 1);
        let uris: Vec<_> = sessions[0].interactions.iter().map(|i| i.uri.as_str()).collect();
        assert_eq!(uris, vec!["i:1", "i:2"]);
        assert!(sessions[0].interactions.iter().all(|i| i.session_uri == "s:1"));
    }

    #[test]
    fn test_duplicate_interaction_collapses() {
        let rows = vec![
            session_row("s:1", "2026-01-10T12:00:00Z", Some(("i:1", "2026-01-10T12:00:00Z"))),
            session_row("s:1", "2026-01-10T12:00:00Z", Some(("i:1", "2026-01-10T12:02:00Z"))),
            session_row("s:1", "2026-01-10T12:00:00Z", Some(("i:2", "2026-01-10T12:01:00Z"))),
        ];
        let sessions = assemble_sessions(&rows);
        assert_eq!(sessions[0].interactions.len(), 2);
        // Last row wins for the duplicate, which reorders it after i:2.
        assert_eq!(sessions[0].interactions[1].uri, "i:1");
        assert_eq!(sessions[0].interactions[1].start_time, ts("2026-01-10T12:02:00Z"));
        assert_eq!(interaction_count(&sessions), 2);
    }

    #[test]
    fn test_duplicate_session_last_write_wins() {
        let rows = vec![
            session_row("s:1", "2026-01-10T12:00:00Z", Some(("i:1", "2026-01-10T12:00:00Z"))),
            session_row("s:1", "2026-01-10T11:00:00Z", Some(("i:2", "2026-01-10T12:30:00Z"))),
        ];
        let sessions = assemble_sessions(&rows);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].start_time, ts("2026-01-10T11:00:00Z"));
        assert_eq!(sessions[0].interactions.len(), 2);
    }

    #[test]
    fn test_session_without_interactions() {
        let rows = vec![session_row("s:1", "2026-01-10T12:00:00Z", None)];
        let sessions = assemble_sessions(&rows);
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].first_interaction().is_none());
        assert_eq!(interaction_count(&sessions), 0);
    }

    #[test]
    fn test_interaction_moves_between_sessions() {
        let rows = vec![
            session_row("s:1", "2026-01-10T12:00:00Z", Some(("i:1", "2026-01-10T12:01:00Z"))),
            session_row("s:2", "2026-01-10T13:00:00Z", Some(("i:1", "2026-01-10T12:01:00Z"))),
        ];
        let sessions = assemble_sessions(&rows);
        assert_eq!(sessions.len(), 2);
        assert_eq!(interaction_count(&sessions), 1);
        assert_eq!(sessions[0].uri, "s:1");
        assert!(sessions[0].interactions.is_empty());
        assert_eq!(sessions[1].interactions[0].uri, "i:1");
        assert_eq!(sessions[1].interactions[0].session_uri, "s:2");
    }
}
