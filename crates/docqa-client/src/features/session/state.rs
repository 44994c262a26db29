//! Session store: the signed-in user, their sessions and the active file.
//!
//! Invariants kept here:
//! - `sessions` never holds two entries with the same `session_id`.
//! - `active_file`, when set, points at exactly one entry of `sessions`.

use std::collections::HashSet;

use docqa_core::model::{ActiveFile, Session, User};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub sessions: Vec<Session>,
    pub active_file: Option<ActiveFile>,
}

/// What a call to [`SessionState::login`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Same user and same session list as before.
    pub unchanged: bool,
    /// The active file was cleared (user switched, or its session vanished).
    pub active_cleared: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn find(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_file.as_ref().map(|f| f.session_id.as_str())
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.active_session_id() == Some(session_id)
    }

    pub fn login(&mut self, user: User, sessions: Vec<Session>) -> LoginOutcome {
        let sessions = dedup_sessions(sessions);
        let same_user = self.user_id() == Some(user.id.as_str());
        let unchanged = self.user.as_ref() == Some(&user) && self.sessions == sessions;

        self.user = Some(user);
        self.sessions = sessions;

        let had_active = self.active_file.is_some();
        if !same_user {
            self.active_file = None;
        } else {
            self.drop_orphan_active_file();
        }

        LoginOutcome {
            unchanged,
            active_cleared: had_active && self.active_file.is_none(),
        }
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }

    /// Inserts at the front. Returns `false` when the id is already known.
    pub fn add_session(&mut self, session: Session) -> bool {
        if self.find(&session.session_id).is_some() {
            return false;
        }
        self.sessions.insert(0, session);
        true
    }

    /// Removes a session. Returns `None` for unknown ids, otherwise whether
    /// the removed session was the active one (the active file is cleared).
    pub fn remove_session(&mut self, session_id: &str) -> Option<bool> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.session_id == session_id)?;
        self.sessions.remove(index);

        let was_active = self.is_active(session_id);
        if was_active {
            self.active_file = None;
        }
        Some(was_active)
    }

    /// Points the active file at a known session, or clears it.
    ///
    /// Returns `false` (and changes nothing) for a file whose session is not
    /// in the list.
    pub fn set_active_file(&mut self, file: Option<ActiveFile>) -> bool {
        match file {
            None => {
                self.active_file = None;
                true
            }
            Some(file) if self.find(&file.session_id).is_some() => {
                self.active_file = Some(file);
                true
            }
            Some(_) => false,
        }
    }

    /// Replaces the state with restored data, enforcing both invariants.
    /// Returns `true` when a restored active file had to be dropped.
    pub fn restore(
        &mut self,
        user: Option<User>,
        sessions: Vec<Session>,
        active_file: Option<ActiveFile>,
    ) -> bool {
        self.user = user;
        self.sessions = dedup_sessions(sessions);
        self.active_file = active_file;
        let had_active = self.active_file.is_some();
        self.drop_orphan_active_file();
        had_active && self.active_file.is_none()
    }

    fn drop_orphan_active_file(&mut self) {
        let orphan = self
            .active_file
            .as_ref()
            .is_some_and(|f| self.find(&f.session_id).is_none());
        if orphan {
            self.active_file = None;
        }
    }
}

/// Removes later duplicates by `session_id`; the first occurrence wins.
pub fn dedup_sessions(sessions: Vec<Session>) -> Vec<Session> {
    let mut seen = HashSet::new();
    sessions
        .into_iter()
        .filter(|s| seen.insert(s.session_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use docqa_core::model::Document;

    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn session(id: &str) -> Session {
        Session {
            session_id: id.to_string(),
            created_at: "2024-01-01T00:00:00".to_string(),
            document: Document {
                document_id: format!("doc-{id}"),
                filename: "report.pdf".to_string(),
                file_url: String::new(),
                upload_time: None,
            },
        }
    }

    #[test]
    fn test_login_with_no_sessions() {
        let mut state = SessionState::default();
        let outcome = state.login(user("u1"), vec![]);
        assert!(!outcome.unchanged);
        assert!(state.sessions.is_empty());
        assert_eq!(state.active_file, None);
    }

    #[test]
    fn test_login_dedups_first_wins() {
        let mut state = SessionState::default();
        let mut dup = session("s1");
        dup.created_at = "later".to_string();
        state.login(user("u1"), vec![session("s1"), session("s2"), dup]);

        assert_eq!(state.sessions.len(), 2);
        assert_eq!(state.sessions[0].created_at, "2024-01-01T00:00:00");
    }

    #[test]
    fn test_login_is_idempotent() {
        let mut state = SessionState::default();
        state.login(user("u1"), vec![session("s1")]);
        state.set_active_file(Some(ActiveFile::from_session(&session("s1"))));
        let before = state.clone();

        let outcome = state.login(user("u1"), vec![session("s1")]);
        assert!(outcome.unchanged);
        assert!(!outcome.active_cleared);
        assert_eq!(state, before);
    }

    #[test]
    fn test_login_as_other_user_clears_active_file() {
        let mut state = SessionState::default();
        state.login(user("u1"), vec![session("s1")]);
        state.set_active_file(Some(ActiveFile::from_session(&session("s1"))));

        let outcome = state.login(user("u2"), vec![session("s1")]);
        assert!(outcome.active_cleared);
        assert_eq!(state.active_file, None);
    }

    #[test]
    fn test_add_session_twice_keeps_one() {
        let mut state = SessionState::default();
        assert!(state.add_session(session("s1")));
        assert!(!state.add_session(session("s1")));
        assert_eq!(state.sessions.len(), 1);
    }

    #[test]
    fn test_session_ids_stay_unique() {
        let mut state = SessionState::default();
        state.login(user("u1"), vec![session("s0"), session("s1")]);
        for step in 0..40usize {
            let id = format!("s{}", (step * 7) % 5);
            if step % 3 == 0 {
                state.login(user("u1"), vec![session(&id), session("s0"), session(&id)]);
            } else {
                state.add_session(session(&id));
            }
            let mut ids: Vec<_> = state.sessions.iter().map(|s| &s.session_id).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), total, "duplicate session id after step {step}");
        }
    }

    #[test]
    fn test_add_session_inserts_at_front() {
        let mut state = SessionState::default();
        state.add_session(session("s1"));
        state.add_session(session("s2"));
        assert_eq!(state.sessions[0].session_id, "s2");
    }

    #[test]
    fn test_remove_active_session_clears_active_file() {
        let mut state = SessionState::default();
        state.add_session(session("s1"));
        state.add_session(session("s2"));
        state.set_active_file(Some(ActiveFile::from_session(&session("s1"))));

        assert_eq!(state.remove_session("s2"), Some(false));
        assert!(state.active_file.is_some());
        assert_eq!(state.remove_session("s1"), Some(true));
        assert_eq!(state.active_file, None);
        assert_eq!(state.remove_session("s1"), None);
    }

    #[test]
    fn test_set_active_file_rejects_unknown_session() {
        let mut state = SessionState::default();
        state.add_session(session("s1"));
        assert!(!state.set_active_file(Some(ActiveFile::from_session(&session("nope")))));
        assert_eq!(state.active_file, None);
        assert!(state.set_active_file(Some(ActiveFile::from_session(&session("s1")))));
        assert!(state.set_active_file(None));
        assert_eq!(state.active_file, None);
    }

    #[test]
    fn test_restore_drops_orphan_active_file() {
        let mut state = SessionState::default();
        let dropped = state.restore(
            Some(user("u1")),
            vec![session("s1"), session("s1")],
            Some(ActiveFile::from_session(&session("gone"))),
        );
        assert!(dropped);
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(state.active_file, None);
    }

    #[test]
    fn test_active_file_always_matches_a_session() {
        // Interleaved selection and deletion over a small id space.
        let ids = ["a", "b", "c"];
        let mut state = SessionState::default();
        for id in ids {
            state.add_session(session(id));
        }
        for step in 0..30usize {
            let id = ids[step % ids.len()];
            if step % 4 == 3 {
                state.remove_session(id);
                state.add_session(session(id));
            } else {
                state.set_active_file(Some(ActiveFile::from_session(&session(id))));
            }
            if let Some(active) = &state.active_file {
                let matches = state
                    .sessions
                    .iter()
                    .filter(|s| s.session_id == active.session_id)
                    .count();
                assert_eq!(matches, 1);
            }
        }
    }
}
