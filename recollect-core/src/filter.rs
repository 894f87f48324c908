//! Session filtering
//!
//! A small predicate set applied to the combined session list after both
//! sources have been read. Unset predicates impose no constraint; set ones
//! compose with logical AND.

use crate::types::{AgentKind, Session};
use chrono::{DateTime, Utc};

/// Predicates for narrowing the session list.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Keep only sessions from this agent.
    pub agent_kind: Option<AgentKind>,
    /// Keep only the session with this identifier.
    pub session_id: Option<String>,
    /// Keep only sessions created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Keep only sessions created at or before this instant.
    pub until: Option<DateTime<Utc>>,
}

impl FilterOptions {
    fn matches(&self, session: &Session) -> bool {
        if let Some(kind) = self.agent_kind {
            if session.agent_type != kind {
                return false;
            }
        }

        if let Some(id) = &self.session_id {
            if session.session_id != *id {
                return false;
            }
        }

        if let Some(since) = self.since {
            if session.created_at < since {
                return false;
            }
        }

        if let Some(until) = self.until {
            if session.created_at > until {
                return false;
            }
        }

        true
    }
}

/// Keep only sessions matching every set predicate.
///
/// Both time bounds are inclusive: a session created exactly on a bound
/// stays in.
pub fn apply(sessions: Vec<Session>, options: &FilterOptions) -> Vec<Session> {
    sessions
        .into_iter()
        .filter(|session| options.matches(session))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageMetadata, SessionMetadata};

    fn session(agent: AgentKind, id: &str, created_at: &str) -> Session {
        Session {
            agent_type: agent,
            session_id: id.to_string(),
            created_at: created_at.parse().unwrap(),
            updated_at: created_at.parse().unwrap(),
            metadata: SessionMetadata::default(),
            messages: Vec::new(),
            subagents: Vec::new(),
        }
    }

    fn sample() -> Vec<Session> {
        vec![
            session(AgentKind::Claude, "s1", "2025-01-01T00:00:00Z"),
            session(AgentKind::Goose, "s2", "2025-02-01T00:00:00Z"),
            session(AgentKind::Claude, "s3", "2025-03-01T00:00:00Z"),
        ]
    }

    #[test]
    fn test_no_predicates_keeps_everything() {
        let filtered = apply(sample(), &FilterOptions::default());
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_agent_kind_predicate() {
        let options = FilterOptions {
            agent_kind: Some(AgentKind::Claude),
            ..Default::default()
        };
        let filtered = apply(sample(), &options);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|s| s.agent_type == AgentKind::Claude));
    }

    #[test]
    fn test_session_id_predicate() {
        let options = FilterOptions {
            session_id: Some("s2".to_string()),
            ..Default::default()
        };
        let filtered = apply(sample(), &options);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].session_id, "s2");
    }

    #[test]
    fn test_time_bounds_are_inclusive() {
        let options = FilterOptions {
            since: Some("2025-02-01T00:00:00Z".parse().unwrap()),
            until: Some("2025-03-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        let filtered = apply(sample(), &options);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].session_id, "s2");
        assert_eq!(filtered[1].session_id, "s3");
    }

    #[test]
    fn test_outside_bounds_are_excluded() {
        let options = FilterOptions {
            since: Some("2025-01-02T00:00:00Z".parse().unwrap()),
            until: Some("2025-02-28T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        let filtered = apply(sample(), &options);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].session_id, "s2");
    }

    #[test]
    fn test_combined_predicates() {
        let options = FilterOptions {
            agent_kind: Some(AgentKind::Goose),
            since: Some("2025-01-15T00:00:00Z".parse().unwrap()),
            until: Some("2025-02-15T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        let filtered = apply(sample(), &options);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].session_id, "s2");
        assert_eq!(filtered[0].agent_type, AgentKind::Goose);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let options = FilterOptions {
            agent_kind: Some(AgentKind::Claude),
            until: Some("2025-02-15T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        let once = apply(sample(), &options);
        let twice = apply(once.clone(), &options);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_messages_survive_filtering_untouched() {
        let mut sessions = sample();
        sessions[0].messages.push(crate::types::Message {
            uuid: "u1".to_string(),
            parent_uuid: String::new(),
            timestamp: "2025-01-01T00:00:01Z".parse().unwrap(),
            role: "user".to_string(),
            content: Vec::new(),
            metadata: MessageMetadata::default(),
        });

        let options = FilterOptions {
            session_id: Some("s1".to_string()),
            ..Default::default()
        };
        let filtered = apply(sessions, &options);
        assert_eq!(filtered[0].messages.len(), 1);
        assert_eq!(filtered[0].messages[0].uuid, "u1");
    }
}
