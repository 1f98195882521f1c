use thiserror::Error;

use crate::wizard::TIME_SLOTS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeSelectError {
    #[error("Horário {0} não está disponível")]
    UnknownSlot(String),
    #[error("Data {0} não faz parte deste agendamento")]
    UnknownDate(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeProceedError {
    #[error("Escolha um horário para cada data: falta(m) {missing}")]
    Shortfall { missing: usize },
}

/// Per-date slot picker for the dates carried out of the calendar stage.
///
/// Selecting a second time on the same date keeps both pairs. Completeness
/// is validated by count (one-or-more per date overall), matching the
/// behavior the rest of the flow assumes.
#[derive(Debug, Clone)]
pub struct TimeSelector {
    dates: Vec<String>,
    active: usize,
    selected: Vec<(String, String)>,
}

impl TimeSelector {
    pub fn new(dates: Vec<String>) -> Self {
        Self {
            dates,
            active: 0,
            selected: Vec::new(),
        }
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// The date whose slot grid is currently displayed.
    pub fn active_date(&self) -> &str {
        &self.dates[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn selected(&self) -> &[(String, String)] {
        &self.selected
    }

    pub fn is_selected(&self, date: &str, time: &str) -> bool {
        self.selected
            .iter()
            .any(|(d, t)| d == date && t == time)
    }

    /// Change which date's grid is displayed. View state only; out-of-range
    /// indices are ignored.
    pub fn switch_active_date(&mut self, index: usize) {
        if index < self.dates.len() {
            self.active = index;
        }
    }

    /// Toggle the (date, time) pair.
    pub fn select_time(&mut self, date: &str, time: &str) -> Result<(), TimeSelectError> {
        if !self.dates.iter().any(|d| d == date) {
            return Err(TimeSelectError::UnknownDate(date.to_string()));
        }
        if !TIME_SLOTS.contains(&time) {
            return Err(TimeSelectError::UnknownSlot(time.to_string()));
        }
        if let Some(pos) = self
            .selected
            .iter()
            .position(|(d, t)| d == date && t == time)
        {
            self.selected.remove(pos);
        } else {
            self.selected.push((date.to_string(), time.to_string()));
        }
        Ok(())
    }

    /// Validate that at least one time exists per carried date and hand the
    /// pairs forward. Failure reports how many are still missing.
    pub fn proceed(self) -> Result<Vec<(String, String)>, TimeProceedError> {
        if self.selected.len() < self.dates.len() {
            return Err(TimeProceedError::Shortfall {
                missing: self.dates.len() - self.selected.len(),
            });
        }
        Ok(self.selected)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn two_dates() -> TimeSelector {
        TimeSelector::new(vec!["2026-09-20".into(), "2026-09-21".into()])
    }

    #[test]
    fn test_select_time_adds_pair() {
        let mut sel = two_dates();
        sel.select_time("2026-09-20", "08:00").unwrap();
        assert!(sel.is_selected("2026-09-20", "08:00"));
    }

    #[test]
    fn test_select_time_again_removes_pair() {
        let mut sel = two_dates();
        sel.select_time("2026-09-20", "08:00").unwrap();
        sel.select_time("2026-09-20", "08:00").unwrap();
        assert!(sel.selected().is_empty());
    }

    #[test]
    fn test_second_time_same_date_coexists() {
        // Deliberately preserved: a second slot on the same date does not
        // replace the first (see DESIGN.md).
        let mut sel = two_dates();
        sel.select_time("2026-09-20", "08:00").unwrap();
        sel.select_time("2026-09-20", "09:00").unwrap();
        assert_eq!(sel.selected().len(), 2);
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let mut sel = two_dates();
        assert_eq!(
            sel.select_time("2026-09-20", "12:00"),
            Err(TimeSelectError::UnknownSlot("12:00".into()))
        );
    }

    #[test]
    fn test_unknown_date_rejected() {
        let mut sel = two_dates();
        assert_eq!(
            sel.select_time("2026-09-25", "08:00"),
            Err(TimeSelectError::UnknownDate("2026-09-25".into()))
        );
    }

    #[test]
    fn test_switch_active_date() {
        let mut sel = two_dates();
        assert_eq!(sel.active_date(), "2026-09-20");
        sel.switch_active_date(1);
        assert_eq!(sel.active_date(), "2026-09-21");
    }

    #[test]
    fn test_switch_out_of_range_ignored() {
        let mut sel = two_dates();
        sel.switch_active_date(5);
        assert_eq!(sel.active_index(), 0);
    }

    #[test]
    fn test_switch_does_not_touch_selection() {
        let mut sel = two_dates();
        sel.select_time("2026-09-20", "08:00").unwrap();
        sel.switch_active_date(1);
        assert_eq!(sel.selected().len(), 1);
    }

    #[test]
    fn test_proceed_reports_shortfall() {
        let mut sel = two_dates();
        sel.select_time("2026-09-20", "08:00").unwrap();
        assert_eq!(
            sel.proceed(),
            Err(TimeProceedError::Shortfall { missing: 1 })
        );
    }

    #[test]
    fn test_proceed_with_one_time_per_date() {
        let mut sel = two_dates();
        sel.select_time("2026-09-20", "08:00").unwrap();
        sel.select_time("2026-09-21", "14:00").unwrap();
        let times = sel.proceed().unwrap();
        assert_eq!(times.len(), 2);
    }
}
