use dashmap::DashMap;

use crate::adjust::AdjustmentDraft;
use crate::checkout::CheckoutRelay;
use crate::models::Instructor;
use crate::wizard::dates::DateSelector;
use crate::wizard::times::TimeSelector;
use crate::wizard::BookingDraft;

/// Where a user currently is. Each stage owns exactly the state it needs;
/// moving forward replaces the stage, so nothing leaks backwards.
#[derive(Debug, Clone)]
pub enum Stage {
    DateSelect {
        instructor: Instructor,
        selector: DateSelector,
    },
    TimeSelect {
        instructor: Instructor,
        selector: TimeSelector,
    },
    Review {
        draft: BookingDraft,
    },
    Checkout {
        relay: CheckoutRelay,
        draft: BookingDraft,
    },
    /// Rescheduling one confirmed lesson. The calendar only drives month
    /// navigation and past-day checks; the proposal itself is the draft.
    Adjust {
        draft: AdjustmentDraft,
        calendar: DateSelector,
    },
}

/// One user's in-flight flow. Held in memory only: ending the session (or
/// restarting the process) discards the draft, by design.
#[derive(Debug, Clone)]
pub struct Session {
    pub stage: Stage,
}

impl Session {
    pub fn new(stage: Stage) -> Self {
        Self { stage }
    }
}

/// In-memory session store keyed by chat id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: DashMap<i64, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Begin (or restart) a flow for a chat. Any previous draft is dropped.
    pub fn start(&self, chat_id: i64, session: Session) {
        self.inner.insert(chat_id, session);
    }

    /// Run `f` against the chat's session, if one exists.
    pub fn update<R>(&self, chat_id: i64, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.inner.get_mut(&chat_id).map(|mut entry| f(&mut entry))
    }

    /// Snapshot the chat's session.
    pub fn get(&self, chat_id: i64) -> Option<Session> {
        self.inner.get(&chat_id).map(|entry| entry.clone())
    }

    /// Discard the chat's session and draft.
    pub fn end(&self, chat_id: i64) -> Option<Session> {
        self.inner.remove(&chat_id).map(|(_, session)| session)
    }

    pub fn contains(&self, chat_id: i64) -> bool {
        self.inner.contains_key(&chat_id)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn instructor() -> Instructor {
        Instructor {
            id: "ins-1".into(),
            name: "Carlos".into(),
            hourly_rate: Some(80.0),
            city: None,
            vehicle: None,
        }
    }

    fn date_select_session() -> Session {
        Session::new(Stage::DateSelect {
            instructor: instructor(),
            selector: DateSelector::new(NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(), 2),
        })
    }

    #[test]
    fn test_start_and_get() {
        let registry = SessionRegistry::new();
        registry.start(1, date_select_session());
        assert!(registry.contains(1));
        assert!(registry.get(1).is_some());
    }

    #[test]
    fn test_start_replaces_previous_session() {
        let registry = SessionRegistry::new();
        registry.start(1, date_select_session());
        registry.update(1, |s| {
            if let Stage::DateSelect { selector, .. } = &mut s.stage {
                selector.select_date(20).unwrap();
            }
        });
        registry.start(1, date_select_session());
        let session = registry.get(1).unwrap();
        match session.stage {
            Stage::DateSelect { selector, .. } => assert!(selector.selected().is_empty()),
            _ => panic!("expected DateSelect"),
        }
    }

    #[test]
    fn test_end_discards_draft() {
        let registry = SessionRegistry::new();
        registry.start(1, date_select_session());
        assert!(registry.end(1).is_some());
        assert!(!registry.contains(1));
        assert!(registry.end(1).is_none());
    }

    #[test]
    fn test_update_missing_session_is_none() {
        let registry = SessionRegistry::new();
        assert!(registry.update(99, |_| ()).is_none());
    }

    #[test]
    fn test_sessions_are_independent_per_chat() {
        let registry = SessionRegistry::new();
        registry.start(1, date_select_session());
        registry.start(2, date_select_session());
        registry.end(1);
        assert!(registry.contains(2));
    }
}
