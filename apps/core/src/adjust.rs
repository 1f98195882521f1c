use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{Lesson, LessonAdjustmentRequest, LessonStatus};

/// A reschedule can only be proposed this far ahead of the lesson start.
pub const ADJUST_CUTOFF_HOURS: i64 = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdjustError {
    #[error("Escolha a nova data da aula")]
    MissingDate,
    #[error("Escolha o novo horário da aula")]
    MissingTime,
}

/// Combine the backend's separate date and time values into the lesson
/// start. Only the serialized calendar components are read — the date's
/// `YYYY-MM-DD` and the time's `HH:MM` — so a timezone shift applied by
/// either serializer cannot move the moment twice.
pub fn lesson_start(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = date.get(..10)?;
    let time = time_component(time)?;
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").ok()
}

/// Pull `HH:MM` out of a bare time or a full timestamp.
fn time_component(time: &str) -> Option<&str> {
    match time.find('T') {
        Some(pos) => time.get(pos + 1..pos + 6),
        None => time.get(..5),
    }
}

/// Whether the adjustment flow may be offered for a lesson: it must be
/// confirmed and start more than 24 hours from `now`.
pub fn adjustment_offerable(lesson: &Lesson, now: NaiveDateTime) -> bool {
    if lesson.status != LessonStatus::Confirmed {
        return false;
    }
    match lesson_start(&lesson.date, &lesson.time) {
        Some(start) => (start - now).num_hours() > ADJUST_CUTOFF_HOURS,
        None => false,
    }
}

/// Single date/time proposal for one confirmed lesson. Unlike the booking
/// wizard there is no multi-date batching.
#[derive(Debug, Clone)]
pub struct AdjustmentDraft {
    pub lesson_id: String,
    pub proposed_date: Option<String>,
    pub proposed_time: Option<String>,
}

impl AdjustmentDraft {
    pub fn new(lesson_id: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            proposed_date: None,
            proposed_time: None,
        }
    }

    pub fn select_date(&mut self, date: impl Into<String>) {
        self.proposed_date = Some(date.into());
    }

    pub fn select_time(&mut self, time: impl Into<String>) {
        self.proposed_time = Some(time.into());
    }

    /// Both fields are required before submission.
    pub fn build(&self) -> Result<LessonAdjustmentRequest, AdjustError> {
        let proposed_date = self
            .proposed_date
            .clone()
            .filter(|d| !d.is_empty())
            .ok_or(AdjustError::MissingDate)?;
        let proposed_time = self
            .proposed_time
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(AdjustError::MissingTime)?;
        Ok(LessonAdjustmentRequest {
            lesson_id: self.lesson_id.clone(),
            proposed_date,
            proposed_time,
        })
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn confirmed(date: &str, time: &str) -> Lesson {
        Lesson {
            id: "les-1".into(),
            date: date.into(),
            time: time.into(),
            status: LessonStatus::Confirmed,
            instructor_name: None,
            price: None,
        }
    }

    // ── lesson_start ──

    #[test]
    fn test_lesson_start_plain_fields() {
        let start = lesson_start("2026-09-16", "08:00").unwrap();
        assert_eq!(start.to_string(), "2026-09-16 08:00:00");
    }

    #[test]
    fn test_lesson_start_tolerates_full_timestamps() {
        // Backend serializers sometimes ship full timestamps; only the
        // calendar components may be read.
        let start = lesson_start("2026-09-16T00:00:00.000Z", "1970-01-01T08:00:00.000Z").unwrap();
        assert_eq!(start.to_string(), "2026-09-16 08:00:00");
    }

    #[test]
    fn test_lesson_start_garbage_is_none() {
        assert!(lesson_start("amanhã", "cedo").is_none());
    }

    // ── adjustment_offerable ──

    #[test]
    fn test_offerable_25_hours_ahead() {
        // now = 15th 10:00; lesson on the 16th at 11:00 → 25h away.
        assert!(adjustment_offerable(&confirmed("2026-09-16", "11:00"), now()));
    }

    #[test]
    fn test_not_offerable_23_hours_ahead() {
        assert!(!adjustment_offerable(&confirmed("2026-09-16", "09:00"), now()));
    }

    #[test]
    fn test_not_offerable_exactly_24_hours_ahead() {
        // Strictly more than 24 hours is required.
        assert!(!adjustment_offerable(&confirmed("2026-09-16", "10:00"), now()));
    }

    #[test]
    fn test_not_offerable_when_not_confirmed() {
        let mut lesson = confirmed("2026-09-20", "10:00");
        lesson.status = LessonStatus::WaitingApproval;
        assert!(!adjustment_offerable(&lesson, now()));
    }

    #[test]
    fn test_not_offerable_for_past_lesson() {
        assert!(!adjustment_offerable(&confirmed("2026-09-10", "10:00"), now()));
    }

    #[test]
    fn test_not_offerable_on_unparseable_fields() {
        assert!(!adjustment_offerable(&confirmed("???", "10:00"), now()));
    }

    // ── AdjustmentDraft ──

    #[test]
    fn test_build_requires_date() {
        let mut draft = AdjustmentDraft::new("les-1");
        draft.select_time("08:00");
        assert_eq!(draft.build(), Err(AdjustError::MissingDate));
    }

    #[test]
    fn test_build_requires_time() {
        let mut draft = AdjustmentDraft::new("les-1");
        draft.select_date("2026-09-20");
        assert_eq!(draft.build(), Err(AdjustError::MissingTime));
    }

    #[test]
    fn test_build_rejects_empty_strings() {
        let mut draft = AdjustmentDraft::new("les-1");
        draft.select_date("");
        draft.select_time("08:00");
        assert_eq!(draft.build(), Err(AdjustError::MissingDate));
    }

    #[test]
    fn test_build_complete_draft() {
        let mut draft = AdjustmentDraft::new("les-1");
        draft.select_date("2026-09-20");
        draft.select_time("08:00");
        let req = draft.build().unwrap();
        assert_eq!(req.lesson_id, "les-1");
        assert_eq!(req.proposed_date, "2026-09-20");
        assert_eq!(req.proposed_time, "08:00");
    }

    #[test]
    fn test_reselect_replaces_proposal() {
        let mut draft = AdjustmentDraft::new("les-1");
        draft.select_date("2026-09-20");
        draft.select_date("2026-09-21");
        assert_eq!(draft.proposed_date.as_deref(), Some("2026-09-21"));
    }
}
